//! Domain models for the price watcher.
//!
//! `Observation` is what a run appends to the event log; `MonitorState`
//! is the latch carried from one run to the next.

pub mod monitor_state;
pub mod observation;

pub use monitor_state::MonitorState;
pub use observation::{Observation, PriceStatus};
