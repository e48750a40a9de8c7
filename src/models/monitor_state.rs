use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Latch persisted between runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitorState {
    /// Set once an alert went out; cleared when the price climbs back
    #[serde(default)]
    pub last_below: bool,

    /// Keys written by other tools, kept as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MonitorState {
    pub fn new(last_below: bool) -> Self {
        Self {
            last_below,
            extra: Map::new(),
        }
    }
}
