use std::collections::HashMap;
use std::fmt::Display;

use tracing::{field, Span};

use crate::config::Endpoint;
use crate::status::{FailureReason, StatusPayload};

lazy_static! {
    static ref CLIENT: reqwest::Client = reqwest::Client::new();
}

/// Something that can produce a status payload.
///
/// There is exactly one production implementation; the seam exists so the
/// checker can be exercised against canned payloads.
#[async_trait::async_trait]
pub trait StatusSource: Display {
    async fn fetch(&self) -> Result<StatusPayload, FailureReason>;
}

/// Fetches the status payload from the hosted endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    headers: HashMap<String, String>,
}

impl HttpSource {
    pub fn new(endpoint: &Endpoint) -> Self {
        Self {
            url: endpoint.url.clone(),
            headers: endpoint.headers.clone(),
        }
    }
}

#[async_trait::async_trait]
impl StatusSource for HttpSource {
    #[tracing::instrument(
        name = "source.http",
        skip(self),
        err(Display),
        fields(
            http.url = %self.url,
            http.method = "GET",
            http.status_code = field::Empty,
        )
    )]
    async fn fetch(&self) -> Result<StatusPayload, FailureReason> {
        let mut request = CLIENT
            .get(&self.url)
            .header("Content-Type", "application/json");

        for (key, value) in self.headers.iter() {
            request = request.header(key, value);
        }

        let response = request
            .send()
            .await
            .map_err(|err| FailureReason::Transport(err.to_string()))?;

        Span::current().record("http.status_code", response.status().as_u16() as u64);

        if !response.status().is_success() {
            return Err(FailureReason::Http(response.status().as_u16()));
        }

        response
            .json::<StatusPayload>()
            .await
            .map_err(|err| FailureReason::Malformed(err.to_string()))
    }
}

impl Display for HttpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP GET {}", self.url)
    }
}
