use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::ConnectionStatus;

/// A point-in-time view of the poller's output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusSnapshot {
    pub status: ConnectionStatus,
    pub last_checked: Option<DateTime<Utc>>,
}

/// The shared status record observed by every consumer of the poller.
///
/// There is a single writer (the checker) and any number of readers. A new
/// check overwrites the status to `checking` before doing anything else, so
/// overlapping checks resolve last-write-wins.
#[derive(Clone)]
pub struct StatusState {
    inner: Arc<RwLock<StatusSnapshot>>,
}

impl Default for StatusState {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StatusSnapshot {
                status: ConnectionStatus::Checking,
                last_checked: None,
            })),
        }
    }

    /// Marks a check as in flight. The timestamp of the previous attempt is
    /// left in place until this one completes.
    pub fn begin_check(&self) {
        self.inner.write().unwrap().status = ConnectionStatus::Checking;
    }

    /// Records the terminal status of a completed check and stamps the
    /// attempt. The timestamp never moves backwards.
    pub fn complete(&self, status: ConnectionStatus) {
        let now = Utc::now();
        let mut snapshot = self.inner.write().unwrap();
        snapshot.status = status;
        snapshot.last_checked = Some(match snapshot.last_checked {
            Some(previous) if previous > now => previous,
            _ => now,
        });
    }

    pub fn status(&self) -> ConnectionStatus {
        self.inner.read().unwrap().status
    }

    pub fn last_checked(&self) -> Option<DateTime<Utc>> {
        self.inner.read().unwrap().last_checked
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        *self.inner.read().unwrap()
    }
}
