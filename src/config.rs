use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::Policy;

#[tracing::instrument(skip(path), err(Debug))]
pub async fn load_config<P: Into<PathBuf>>(path: P) -> Result<Config, Box<dyn std::error::Error>> {
    let path = path.into();
    let config = tokio::fs::read_to_string(path).await?;
    let config: Config = serde_yaml::from_str(&config)?;
    Ok(config)
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub endpoint: Endpoint,

    #[serde(default)]
    pub policy: Policy,

    #[serde(default)]
    pub storage: Storage,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::default(),
            policy: Policy::default(),
            storage: Storage::default(),
        }
    }
}

/// Where the database status endpoint lives and which extra headers to send.
/// `Content-Type: application/json` is always sent and need not be listed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Endpoint {
    #[serde(default = "default_endpoint_url")]
    pub url: String,

    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            url: default_endpoint_url(),
            headers: HashMap::new(),
        }
    }
}

/// Where the dismissal flag is persisted between sessions.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Storage {
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for Storage {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

fn default_endpoint_url() -> String {
    "http://127.0.0.1:54321/functions/v1/make-server-ab7fd8fd/database/status".into()
}

fn default_storage_path() -> String {
    "teal-state.json".into()
}
