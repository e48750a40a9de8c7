use thiserror::Error;

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Page fetch failures
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Price extraction failures
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Alert delivery failures
    #[error(transparent)]
    Notify(#[from] NotifyError),

    /// State file or event log failures
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Errors that end the process with a non-zero exit code
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AppError::Config(_) | AppError::Store(_) | AppError::Fetch(FetchError::Client(_))
        )
    }
}

/// Why a single fetch attempt failed
#[derive(Error, Debug)]
pub enum AttemptError {
    /// Transport-level failure (DNS, connect, TLS, timeout)
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// Blocked, throttled, server error, or an interstitial-sized body
    #[error("Bad HTTP {status} or tiny body")]
    Blocked { status: u16, body_len: usize },

    /// Any other non-success outcome
    #[error("Unexpected HTTP {status}")]
    UnexpectedStatus { status: u16 },
}

/// Page fetcher errors
#[derive(Error, Debug)]
pub enum FetchError {
    /// Every attempt failed; carries the last attempt's error
    #[error("Fetch failed after retries: {last}")]
    RetriesExhausted { attempts: u32, last: AttemptError },

    /// The monitored URL has no usable scheme or host
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(reqwest::Error),
}

/// Price extraction errors
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Price text inside the matched cell is not a number
    #[error("Invalid price text {text:?}: {source}")]
    InvalidPrice {
        text: String,
        #[source]
        source: rust_decimal::Error,
    },

    /// A CSS selector failed to compile
    #[error("Invalid selector {0}")]
    Selector(String),
}

/// Alert delivery errors
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Mail host, port, username or password is missing
    #[error("SMTP credentials missing. Set SMTP_USER and SMTP_PASS.")]
    MissingCredentials,

    /// SMTP transport-level failure (connection, TLS, authentication)
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The message could not be assembled
    #[error("Email build error: {0}")]
    Build(String),
}

/// Persisted artifact errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("State file {path}: {source}")]
    StateIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("State serialization error: {0}")]
    StateEncode(#[from] serde_json::Error),

    #[error("Event log {path}: {source}")]
    LogIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Event log write error: {0}")]
    LogCsv(#[from] csv::Error),
}

impl NotifyError {
    /// True when the failure happened before any network attempt
    pub fn is_configuration(&self) -> bool {
        matches!(self, NotifyError::MissingCredentials)
    }
}
