//! Alebilet Watch Library
//!
//! One scheduled run checks a ticket category's price, compares it with a
//! threshold and sends a single email alert per dip below it. This module
//! exposes the components for use by the binary and by tests.

pub mod config;
pub mod error;
pub mod models;
pub mod price;
pub mod services;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use services::{EventLog, Monitor, Notifier, PageFetcher, StateStore};

/// Monitor wired to the real network fetcher and SMTP notifier
pub type LiveMonitor = Monitor<PageFetcher, Notifier>;

/// Build the production monitor from configuration
pub fn build_monitor(config: &AppConfig) -> AppResult<LiveMonitor> {
    let fetcher = PageFetcher::new(config.fetch.clone())?;
    let notifier = Notifier::new(
        config.mail.clone(),
        config.threshold,
        config.fetch.url.clone(),
    );

    Ok(Monitor::new(
        fetcher,
        notifier,
        EventLog::new(&config.log_path),
        StateStore::new(&config.state_path),
        config.threshold,
        config.timezone,
    ))
}
