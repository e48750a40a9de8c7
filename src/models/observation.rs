use chrono::DateTime;
use chrono_tz::Tz;
use crate::price::format_pln;
use rust_decimal::Decimal;

/// Outcome of one price check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceStatus {
    Below,
    Above,
    NoMatch,
    Error,
}

impl PriceStatus {
    /// Convert to log string
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceStatus::Below => "BELOW",
            PriceStatus::Above => "ABOVE",
            PriceStatus::NoMatch => "NO_MATCH",
            PriceStatus::Error => "ERROR",
        }
    }

    /// Classify a price against the alert threshold
    pub fn classify(price: Decimal, threshold: Decimal) -> Self {
        if price < threshold {
            PriceStatus::Below
        } else {
            PriceStatus::Above
        }
    }
}

impl std::fmt::Display for PriceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the event log, produced once per run
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub timestamp: DateTime<Tz>,
    pub price: Option<Decimal>,
    pub status: PriceStatus,
    pub note: String,
}

impl Observation {
    pub fn new(
        timestamp: DateTime<Tz>,
        price: Option<Decimal>,
        status: PriceStatus,
        note: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            price,
            status,
            note: note.into(),
        }
    }

    /// `YYYY-MM-DD HH:MM:SS` in the venue's local time
    pub fn timestamp_field(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Two-decimal price, empty when no price was read
    pub fn price_field(&self) -> String {
        self.price.map(format_pln).unwrap_or_default()
    }

    /// Single-line console summary
    pub fn summary(&self) -> String {
        match (self.status, self.price) {
            (PriceStatus::Error, _) => format!("ERROR: {}", self.note),
            (status, Some(price)) => format!("{}: {}", status, format_pln(price)),
            (status, None) => status.to_string(),
        }
    }
}
