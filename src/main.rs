#[macro_use]
extern crate lazy_static;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Parser, Subcommand};

mod checker;
mod config;
mod engine;
mod notice;
mod policy;
mod source;
mod state;
mod status;
mod store;
mod utils;

pub use checker::StatusChecker;
pub use config::Config;
pub use engine::Engine;
pub use notice::{BannerKind, NoticeController, NoticeVisibility};
pub use policy::Policy;
pub use source::{HttpSource, StatusSource};
pub use state::{StatusSnapshot, StatusState};
pub use status::{ConnectionStatus, FailureReason, StatusPayload};
pub use store::{FileStore, KeyValueStore, MemoryStore};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "teal=info".into()),
        )
        .init();

    let config = match &args.config {
        Some(path) => config::load_config(path).await?,
        None => Config::default(),
    };

    let mut controller = NoticeController::new(FileStore::open(&config.storage.path)?);

    match args.command {
        Command::Check => {
            let engine = Engine::new(config);
            engine.check_once(&mut controller).await?;
        }
        Command::Watch => {
            println!(
                "Watching {} every {}ms...",
                config.endpoint.url,
                config.policy.interval.as_millis()
            );

            let cancel = Arc::new(AtomicBool::new(false));
            {
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        cancel.store(true, Ordering::Relaxed);
                    }
                });
            }

            let engine = Engine::new(config);
            engine.watch(&mut controller, &cancel).await?;
        }
        Command::Dismiss => {
            controller.dismiss()?;
            println!("Setup notice dismissed.");
        }
        Command::Reopen => {
            controller.reopen()?;
            println!("Setup notice will be shown again.");
        }
    }

    Ok(())
}

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// The path to the configuration file describing the status endpoint to watch.
    #[clap(short, long, value_parser)]
    config: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a single status check and print the derived notice.
    Check,
    /// Re-check the status endpoint on an interval until interrupted.
    Watch,
    /// Hide the setup notice until it is reopened or the database connects.
    Dismiss,
    /// Show the setup notice again.
    Reopen,
}
