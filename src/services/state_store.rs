use crate::error::StoreError;
use crate::models::MonitorState;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// JSON file holding the alert latch between runs
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the latch; a missing or unreadable file yields the default state
    pub fn load(&self) -> MonitorState {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No state file at {:?}, starting unlatched", self.path);
                return MonitorState::default();
            }
            Err(e) => {
                warn!("Could not read state file {:?}: {}", self.path, e);
                return MonitorState::default();
            }
        };

        match serde_json::from_str::<MonitorState>(&text) {
            Ok(state) => state,
            Err(e) => {
                warn!("Malformed state file {:?}: {}", self.path, e);
                MonitorState::default()
            }
        }
    }

    /// Write the latch back, pretty-printed
    pub fn save(&self, state: &MonitorState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
            }
        }

        let json = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, json).map_err(|source| self.io_error(source))?;

        debug!("Saved state last_below={} to {:?}", state.last_below, self.path);
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::StateIo {
            path: self.path.display().to_string(),
            source,
        }
    }
}
