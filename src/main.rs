//! Alebilet Watch
//!
//! Entry point for one scheduled price check:
//! load state, fetch the event page, extract the price, decide on the
//! latch, notify, log, persist state, exit.
//!
//! Site blocking and parse failures are recorded as ERROR rows and still
//! exit 0 so the scheduler keeps the job green; only configuration and
//! storage failures exit non-zero.

use alebilet_watch::config::AppConfig;
use alebilet_watch::error::AppError;
use alebilet_watch::models::PriceStatus;
use alebilet_watch::price::format_pln;
use std::process::ExitCode;
use tracing::{error, info, Instrument};
use uuid::Uuid;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load environment variables first
    dotenv::dotenv().ok();

    // Load configuration
    let config = match AppConfig::from_env().map_err(AppError::Config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    // Diagnostics go to stderr; stdout carries only the summary line
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("alebilet_watch={}", config.log_level).into()
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Watching {}", config.fetch.url);
    info!("Threshold: {} zł", format_pln(config.threshold));
    info!("State file: {:?}", config.state_path);
    info!("Event log: {:?}", config.log_path);

    let span = tracing::info_span!("run", run_id = %Uuid::new_v4());

    match run(&config).instrument(span).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("ERROR: {}", e);
            if e.is_fatal() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
    }
}

async fn run(config: &AppConfig) -> Result<(), AppError> {
    let monitor = alebilet_watch::build_monitor(config)?;
    let observation = monitor.run_once().await?;

    if observation.status == PriceStatus::Error {
        eprintln!("{}", observation.summary());
    } else {
        println!("{}", observation.summary());
    }
    Ok(())
}
