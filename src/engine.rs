use std::sync::atomic::AtomicBool;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::checker::StatusChecker;
use crate::config::Config;
use crate::notice::{BannerKind, NoticeController, NoticeVisibility};
use crate::source::HttpSource;
use crate::state::StatusState;
use crate::status::ConnectionStatus;
use crate::store::KeyValueStore;
use crate::utils::random_start_offset;

/// Drives the checker and reports the derived notice, either once or on an
/// interval until cancelled.
pub struct Engine {
    config: Config,
    checker: StatusChecker<HttpSource>,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        let source = HttpSource::new(&config.endpoint);
        let checker = StatusChecker::new(source, config.policy.timeout, StatusState::new());

        Self { config, checker }
    }

    pub fn state(&self) -> StatusState {
        self.checker.state()
    }

    #[tracing::instrument(name = "engine.check", skip(self, controller), err(Debug))]
    pub async fn check_once<S: KeyValueStore>(
        &self,
        controller: &mut NoticeController<S>,
    ) -> Result<ConnectionStatus, Box<dyn std::error::Error>> {
        let status = self.checker.check().await;
        self.report(status, controller)?;
        Ok(status)
    }

    /// Re-checks the endpoint every `policy.interval` until the cancel flag
    /// is raised. Sleeps in one-second slices so cancellation is observed
    /// promptly, and steps the schedule by whole intervals so a slow check
    /// does not drift it.
    #[tracing::instrument(name = "engine.watch", skip(self, controller, cancel), err(Debug))]
    pub async fn watch<S: KeyValueStore>(
        &self,
        controller: &mut NoticeController<S>,
        cancel: &AtomicBool,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let interval = self.config.policy.interval;
        let mut next_run_time = Instant::now() + random_start_offset(interval);

        while !cancel.load(std::sync::atomic::Ordering::Relaxed) {
            let now = Instant::now();
            let sleep_time = next_run_time - now;
            if sleep_time > tokio::time::Duration::from_secs(1) {
                tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
                continue;
            } else if sleep_time > tokio::time::Duration::from_secs(0) {
                tokio::time::sleep(sleep_time).await;
            }

            next_run_time += interval;

            debug!("Starting next status check...");
            let status = self.checker.check().await;
            self.report(status, controller)?;
        }

        Ok(())
    }

    fn report<S: KeyValueStore>(
        &self,
        status: ConnectionStatus,
        controller: &mut NoticeController<S>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let snapshot = self.checker.state().snapshot();
        match snapshot.last_checked {
            Some(checked) => println!(
                "Database status: {} (checked {})",
                status,
                checked.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            None => println!("Database status: {}", status),
        }

        match controller.visibility(status)? {
            NoticeVisibility::Hidden => {
                info!("No notice to show.");
            }
            NoticeVisibility::Banner => {
                let kind = BannerKind::for_status(status);
                println!("[{}] {}", kind, kind.message());
            }
            NoticeVisibility::Collapsed => {
                println!("(setup notice dismissed; run `teal reopen` to show it again)");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Endpoint;
    use crate::notice::DISMISSED_KEY;
    use crate::store::MemoryStore;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn server_with(body: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        server
    }

    fn engine_for(url: String) -> Engine {
        Engine::new(Config {
            endpoint: Endpoint {
                url,
                ..Endpoint::default()
            },
            ..Config::default()
        })
    }

    #[tokio::test]
    async fn connected_backend_hides_the_notice_and_dismisses() {
        let server = server_with(serde_json::json!({
            "success": true,
            "data": { "connected": true, "tablesExist": true },
        }))
        .await;

        let engine = engine_for(server.uri());
        let mut controller = NoticeController::new(MemoryStore::new());

        let status = engine.check_once(&mut controller).await.unwrap();
        assert_eq!(status, ConnectionStatus::Connected);
        assert_eq!(engine.state().status(), ConnectionStatus::Connected);
        assert!(controller.dismissed());
    }

    #[tokio::test]
    async fn missing_schema_shows_the_setup_banner() {
        let server = server_with(serde_json::json!({
            "success": true,
            "data": { "connected": true, "tablesExist": false },
        }))
        .await;

        let engine = engine_for(server.uri());
        let mut controller = NoticeController::new(MemoryStore::new());

        let status = engine.check_once(&mut controller).await.unwrap();
        assert_eq!(status, ConnectionStatus::SetupNeeded);
        assert!(!controller.dismissed());
        assert_eq!(
            BannerKind::for_status(status),
            BannerKind::SetupRequired
        );
    }

    #[tokio::test]
    async fn dropped_network_shows_the_demo_mode_banner() {
        let engine = engine_for("http://127.0.0.1:1/database/status".to_string());
        let mut controller = NoticeController::new(MemoryStore::new());

        let status = engine.check_once(&mut controller).await.unwrap();
        assert_eq!(status, ConnectionStatus::Error);
        assert_eq!(BannerKind::for_status(status), BannerKind::DemoMode);
        assert!(engine.state().last_checked().is_some());
    }

    #[tokio::test]
    async fn persisted_dismissal_collapses_the_notice_on_a_new_session() {
        let server = server_with(serde_json::json!({
            "success": true,
            "data": { "connected": true, "tablesExist": false },
        }))
        .await;

        let mut store = MemoryStore::new();
        store.set(DISMISSED_KEY, "true").unwrap();

        let engine = engine_for(server.uri());
        let mut controller = NoticeController::new(store);

        let status = engine.check_once(&mut controller).await.unwrap();
        assert_eq!(status, ConnectionStatus::SetupNeeded);
        assert_eq!(
            controller.visibility(status).unwrap(),
            NoticeVisibility::Collapsed
        );
    }
}
