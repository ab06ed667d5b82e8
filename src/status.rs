use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The externally observable connectivity state of the hosted database.
///
/// Exactly one value holds at any time. A session starts at `Checking`, and
/// every completed check resolves to one of the three terminal values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionStatus {
    Checking,
    Connected,
    SetupNeeded,
    Error,
}

impl Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Checking => write!(f, "checking"),
            ConnectionStatus::Connected => write!(f, "connected"),
            ConnectionStatus::SetupNeeded => write!(f, "setup-needed"),
            ConnectionStatus::Error => write!(f, "error"),
        }
    }
}

/// The JSON body reported by the status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusPayload {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<DatabaseReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseReport {
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub tables_exist: bool,
}

impl StatusPayload {
    /// Maps a well-formed payload onto a terminal status.
    ///
    /// `connected` and `setup-needed` both require a structurally successful
    /// response with the database reachable; they differ only on whether the
    /// schema is present. Everything else is a logical failure.
    pub fn classify(&self) -> Result<ConnectionStatus, FailureReason> {
        match &self.data {
            Some(report) if self.success && report.connected => {
                if report.tables_exist {
                    Ok(ConnectionStatus::Connected)
                } else {
                    Ok(ConnectionStatus::SetupNeeded)
                }
            }
            _ => Err(FailureReason::NotConnected),
        }
    }
}

/// Why a check failed. All four arms collapse to `ConnectionStatus::Error`
/// at the UI boundary, but tests and logs can tell them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The request never produced an HTTP response (DNS, TCP, TLS, timeout).
    Transport(String),
    /// The endpoint answered with a non-2xx status code.
    Http(u16),
    /// The body could not be decoded as the expected JSON shape.
    Malformed(String),
    /// Well-formed response, but `success` or `data.connected` was false.
    NotConnected,
}

impl Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::Transport(message) => write!(f, "transport failure: {}", message),
            FailureReason::Http(code) => write!(f, "unexpected HTTP status {}", code),
            FailureReason::Malformed(message) => write!(f, "malformed response: {}", message),
            FailureReason::NotConnected => {
                write!(f, "endpoint reports the database as not connected")
            }
        }
    }
}

impl std::error::Error for FailureReason {}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(success: bool, connected: bool, tables_exist: bool) -> StatusPayload {
        StatusPayload {
            success,
            data: Some(DatabaseReport {
                connected,
                tables_exist,
            }),
        }
    }

    #[test]
    fn classify_matches_branch_table() {
        let cases = [
            (true, true, true, Ok(ConnectionStatus::Connected)),
            (true, true, false, Ok(ConnectionStatus::SetupNeeded)),
            (true, false, true, Err(FailureReason::NotConnected)),
            (true, false, false, Err(FailureReason::NotConnected)),
            (false, true, true, Err(FailureReason::NotConnected)),
            (false, true, false, Err(FailureReason::NotConnected)),
            (false, false, true, Err(FailureReason::NotConnected)),
            (false, false, false, Err(FailureReason::NotConnected)),
        ];

        for (success, connected, tables_exist, expected) in cases {
            assert_eq!(
                payload(success, connected, tables_exist).classify(),
                expected,
                "success={} connected={} tables_exist={}",
                success,
                connected,
                tables_exist
            );
        }
    }

    #[test]
    fn classify_treats_missing_data_as_not_connected() {
        let payload = StatusPayload {
            success: true,
            data: None,
        };
        assert_eq!(payload.classify(), Err(FailureReason::NotConnected));
    }

    #[test]
    fn payload_decodes_the_wire_shape() {
        let payload: StatusPayload = serde_json::from_str(
            r#"{"success":true,"data":{"connected":true,"tablesExist":false}}"#,
        )
        .unwrap();
        assert_eq!(
            payload,
            StatusPayload {
                success: true,
                data: Some(DatabaseReport {
                    connected: true,
                    tables_exist: false,
                }),
            }
        );
        assert_eq!(payload.classify(), Ok(ConnectionStatus::SetupNeeded));
    }

    #[test]
    fn status_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&ConnectionStatus::SetupNeeded).unwrap(),
            "\"setup-needed\""
        );
        assert_eq!(ConnectionStatus::SetupNeeded.to_string(), "setup-needed");
    }
}
