use crate::error::AppResult;
use crate::models::{MonitorState, Observation, PriceStatus};
use crate::price::format_pln;
use crate::services::event_log::EventLog;
use crate::services::extractor::extract_price;
use crate::services::fetcher::PageSource;
use crate::services::notifier::AlertSender;
use crate::services::state_store::StateStore;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use tracing::{error, info, warn};

pub const NOTE_ALERT_SENT: &str = "Alert sent";
pub const NOTE_LATCH_RESET: &str = "Latch reset (price went above threshold)";
pub const NOTE_NO_MATCH: &str = "Nie znaleziono wiersza Płyta/ceny";

/// What a run must do given the latch and the price status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    SendAlert,
    ResetLatch,
}

/// Latch transition table; `SendAlert` latches only once delivery succeeds
pub fn transition(last_below: bool, status: PriceStatus) -> Action {
    match (last_below, status) {
        (false, PriceStatus::Below) => Action::SendAlert,
        (true, PriceStatus::Above) => Action::ResetLatch,
        _ => Action::None,
    }
}

/// Wires fetch, extract, decide, notify, log and persist into one run
pub struct Monitor<P, A> {
    source: P,
    alerts: A,
    event_log: EventLog,
    state_store: StateStore,
    threshold: Decimal,
    timezone: Tz,
}

impl<P: PageSource, A: AlertSender> Monitor<P, A> {
    pub fn new(
        source: P,
        alerts: A,
        event_log: EventLog,
        state_store: StateStore,
        threshold: Decimal,
        timezone: Tz,
    ) -> Self {
        Self {
            source,
            alerts,
            event_log,
            state_store,
            threshold,
            timezone,
        }
    }

    /// Run once at the current time
    pub async fn run_once(&self) -> AppResult<Observation> {
        self.run_at(Utc::now()).await
    }

    /// Run once with an explicit clock reading.
    ///
    /// Exactly one observation is appended and the state is saved exactly
    /// once, whatever the workflow outcome. Workflow failures become ERROR
    /// observations; only log or state write failures are returned.
    pub async fn run_at(&self, now: DateTime<Utc>) -> AppResult<Observation> {
        let timestamp = now.with_timezone(&self.timezone);
        let mut state = self.state_store.load();

        let (price, status, note) = match self.check(&mut state).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Run failed: {}", e);
                (None, PriceStatus::Error, e.to_string())
            }
        };

        let observation = Observation::new(timestamp, price, status, note);

        let logged = self.event_log.append(&observation);
        let saved = self.state_store.save(&state);
        logged?;
        saved?;

        Ok(observation)
    }

    async fn check(
        &self,
        state: &mut MonitorState,
    ) -> AppResult<(Option<Decimal>, PriceStatus, String)> {
        let html = self.source.fetch_page().await?;

        let Some(price) = extract_price(&html)? else {
            warn!("Watched row not found on page");
            return Ok((None, PriceStatus::NoMatch, NOTE_NO_MATCH.to_string()));
        };

        let status = PriceStatus::classify(price, self.threshold);
        info!(
            "Price {} zł is {} threshold {} zł",
            format_pln(price),
            status,
            format_pln(self.threshold)
        );

        let note = match transition(state.last_below, status) {
            Action::SendAlert => match self.alerts.send_alert(price).await {
                Ok(()) => {
                    state.last_below = true;
                    info!("Alert sent, latch set");
                    NOTE_ALERT_SENT.to_string()
                }
                Err(e) => {
                    state.last_below = false;
                    warn!("Alert not sent, latch left open: {}", e);
                    format!("Email error: {}", e)
                }
            },
            Action::ResetLatch => {
                state.last_below = false;
                info!("Price back above threshold, latch reset");
                NOTE_LATCH_RESET.to_string()
            }
            Action::None => String::new(),
        };

        Ok((Some(price), status, note))
    }
}
