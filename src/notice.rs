use std::fmt::Display;

use crate::status::ConnectionStatus;
use crate::store::KeyValueStore;

/// Storage key for the persisted dismissal flag. Present with the literal
/// value `"true"` when dismissed, absent otherwise.
pub const DISMISSED_KEY: &str = "database-notice-dismissed";

/// What the setup notice should render as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeVisibility {
    /// Nothing is shown.
    Hidden,
    /// The full notice is shown.
    Banner,
    /// Only a small re-open affordance is shown.
    Collapsed,
}

/// Which wording a visible banner carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    SetupRequired,
    DemoMode,
}

impl BannerKind {
    pub fn for_status(status: ConnectionStatus) -> Self {
        match status {
            ConnectionStatus::SetupNeeded => BannerKind::SetupRequired,
            _ => BannerKind::DemoMode,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            BannerKind::SetupRequired => {
                "Database connected, but its tables are missing. Run the setup flow to create them."
            }
            BannerKind::DemoMode => {
                "Database is not reachable. The site is showing placeholder content."
            }
        }
    }
}

impl Display for BannerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BannerKind::SetupRequired => write!(f, "setup required"),
            BannerKind::DemoMode => write!(f, "demo mode"),
        }
    }
}

/// Derives the notice's render state from the connection status and the
/// persisted dismissal flag, and owns the dismiss/reopen actions.
pub struct NoticeController<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> NoticeController<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn dismissed(&self) -> bool {
        self.store.get(DISMISSED_KEY).as_deref() == Some("true")
    }

    /// The tri-state render decision, evaluated in order:
    /// a connected or in-flight check hides the notice outright, a persisted
    /// dismissal collapses it, and anything else shows the full banner.
    /// A successful connection also forces the dismissal flag, so the notice
    /// stays away once the database later degrades behind a dismissal.
    pub fn visibility(
        &mut self,
        status: ConnectionStatus,
    ) -> Result<NoticeVisibility, Box<dyn std::error::Error>> {
        match status {
            ConnectionStatus::Connected => {
                self.dismiss()?;
                Ok(NoticeVisibility::Hidden)
            }
            ConnectionStatus::Checking => Ok(NoticeVisibility::Hidden),
            _ if self.dismissed() => Ok(NoticeVisibility::Collapsed),
            _ => Ok(NoticeVisibility::Banner),
        }
    }

    /// Hides the notice until it is reopened. Idempotent.
    pub fn dismiss(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.store.set(DISMISSED_KEY, "true")
    }

    /// Shows the notice again. Idempotent.
    pub fn reopen(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.store.remove(DISMISSED_KEY)
    }
}
