use crate::error::StoreError;
use crate::models::Observation;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const LOG_HEADER: [&str; 4] = ["timestamp", "price_pln", "status", "note"];

/// Append-only CSV log with one row per run
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    /// Create a new event log at `path`; nothing is touched until the first append
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one observation, writing the header first if the file is new
    pub fn append(&self, obs: &Observation) -> Result<(), StoreError> {
        // Ensure directory exists
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
            }
        }

        let write_header = !self.path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.io_error(source))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::CRLF)
            .from_writer(file);

        if write_header {
            info!("Creating event log: {:?}", self.path);
            writer.write_record(LOG_HEADER)?;
        }

        writer.write_record([
            obs.timestamp_field(),
            obs.price_field(),
            obs.status.as_str().to_string(),
            obs.note.clone(),
        ])?;

        writer.flush().map_err(|source| self.io_error(source))?;

        debug!("Logged {} to {:?}", obs.status, self.path);
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::LogIo {
            path: self.path.display().to_string(),
            source,
        }
    }
}
