pub mod event_log;
pub mod extractor;
pub mod fetcher;
pub mod monitor;
pub mod notifier;
pub mod state_store;

pub use event_log::EventLog;
pub use extractor::extract_price;
pub use fetcher::{PageFetcher, PageSource};
pub use monitor::{Action, Monitor};
pub use notifier::{AlertSender, Notifier};
pub use state_store::StateStore;
