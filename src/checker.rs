use std::time::Duration;

use tracing::{debug, field, warn, Span};

use crate::source::StatusSource;
use crate::state::StatusState;
use crate::status::{ConnectionStatus, FailureReason};

/// Runs status checks against a source and owns the shared status record.
///
/// `check` never fails: every transport, HTTP, decoding, or logical failure
/// is collapsed into the `error` status. `probe` exposes the underlying
/// reason for callers that want to inspect it.
pub struct StatusChecker<S: StatusSource> {
    source: S,
    timeout: Option<Duration>,
    state: StatusState,
}

impl<S: StatusSource> StatusChecker<S> {
    pub fn new(source: S, timeout: Option<Duration>, state: StatusState) -> Self {
        Self {
            source,
            timeout,
            state,
        }
    }

    /// A handle onto the shared status record for readers.
    pub fn state(&self) -> StatusState {
        self.state.clone()
    }

    /// Runs one check: flips the shared status to `checking`, resolves the
    /// endpoint, and writes exactly one terminal status back. The
    /// last-checked timestamp is stamped on every exit path.
    #[tracing::instrument(
        name = "status.check",
        skip(self),
        fields(source = %self.source, status = field::Empty)
    )]
    pub async fn check(&self) -> ConnectionStatus {
        self.state.begin_check();

        let status = match self.probe().await {
            Ok(status) => status,
            Err(reason) => {
                warn!("Status check failed: {}", reason);
                ConnectionStatus::Error
            }
        };

        self.state.complete(status);
        Span::current().record("status", field::display(status));
        status
    }

    /// The check without the state bookkeeping, with the failure reason
    /// intact.
    pub async fn probe(&self) -> Result<ConnectionStatus, FailureReason> {
        let payload = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.source.fetch())
                .await
                .map_err(|_| {
                    FailureReason::Transport(format!(
                        "request timed out after {}ms",
                        limit.as_millis()
                    ))
                })??,
            None => self.source.fetch().await?,
        };

        debug!(?payload, "Status payload received.");
        payload.classify()
    }
}
