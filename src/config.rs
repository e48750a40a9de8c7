use crate::error::FetchError;
use chrono_tz::Tz;
use reqwest::Url;
use rust_decimal::Decimal;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_URL: &str =
    "https://www.alebilet.pl/bilety/coma/2025-10-17/20:00/re-start-gra-o-wszystko";
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_FROM_ADDRESS: &str = "no-reply@example.com";
pub const DEFAULT_EMAIL_TO: &str = "alerts@example.com";

/// Page fetch configuration
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub url: String,
    /// Page hit before the target to pick up session cookies; the site root of `url` when unset
    pub warmup_url: Option<String>,
    pub max_retries: u32,
    pub backoff_ms: u64,
    pub warmup_timeout_secs: u64,
    pub target_timeout_secs: u64,
}

/// Mail submission configuration
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub from_address: String,
    pub to_address: String,
    pub timeout_secs: u64,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub fetch: FetchConfig,
    pub mail: MailConfig,
    pub threshold: Decimal,
    pub state_path: PathBuf,
    pub log_path: PathBuf,
    pub timezone: Tz,
    pub log_level: String,
}

impl FetchConfig {
    fn from_lookup<F>(get: &F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = get("URL").unwrap_or_else(|| DEFAULT_URL.to_string());
        let max_retries = parse_or(get, "FETCH_MAX_RETRIES", 3)?;
        let backoff_ms = parse_or(get, "FETCH_BACKOFF_MS", 800)?;

        Ok(Self {
            url,
            warmup_url: get("WARMUP_URL"),
            max_retries,
            backoff_ms,
            ..Self::default()
        })
    }

    /// Get warm-up request timeout as Duration
    pub fn warmup_timeout(&self) -> Duration {
        Duration::from_secs(self.warmup_timeout_secs)
    }

    /// Get target request timeout as Duration
    pub fn target_timeout(&self) -> Duration {
        Duration::from_secs(self.target_timeout_secs)
    }

    /// Warm-up URL, falling back to the site root of `url`
    pub fn warmup_url(&self) -> Result<String, FetchError> {
        match &self.warmup_url {
            Some(w) => Ok(w.clone()),
            None => site_root(&self.url),
        }
    }

    /// Initial attempt plus `max_retries`
    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay after the failed attempt with 0-based index `attempt`
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_ms.saturating_mul(u64::from(attempt) + 1))
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            warmup_url: None,
            max_retries: 3,
            backoff_ms: 800,
            warmup_timeout_secs: 15,
            target_timeout_secs: 20,
        }
    }
}

impl MailConfig {
    fn from_lookup<F>(get: &F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let smtp_user = non_empty("SMTP_USER");
        let from_address = non_empty("FROM_ADDR")
            .or_else(|| smtp_user.clone())
            .unwrap_or_else(|| DEFAULT_FROM_ADDRESS.to_string());

        Ok(Self {
            smtp_host: get("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            smtp_port: parse_or(get, "SMTP_PORT", DEFAULT_SMTP_PORT)?,
            smtp_password: non_empty("SMTP_PASS"),
            smtp_user,
            from_address,
            to_address: get("EMAIL_TO").unwrap_or_else(|| DEFAULT_EMAIL_TO.to_string()),
            timeout_secs: 20,
        })
    }

    /// Host, port, user and password needed to submit mail
    pub fn credentials(&self) -> Option<(&str, &str)> {
        if self.smtp_host.is_empty() || self.smtp_port == 0 {
            return None;
        }
        match (self.smtp_user.as_deref(), self.smtp_password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            smtp_user: None,
            smtp_password: None,
            from_address: DEFAULT_FROM_ADDRESS.to_string(),
            to_address: DEFAULT_EMAIL_TO.to_string(),
            timeout_secs: 20,
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create application config from an arbitrary key lookup
    pub fn from_lookup<F>(get: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fetch = FetchConfig::from_lookup(&get)?;
        let mail = MailConfig::from_lookup(&get)?;

        let threshold = match get("THRESHOLD_PLN") {
            Some(raw) => Decimal::from_str(raw.trim())
                .map_err(|e| format!("Invalid THRESHOLD_PLN: {}: {}", raw, e))?,
            None => Decimal::new(2300, 1),
        };

        let timezone = match get("TIMEZONE") {
            Some(raw) => Tz::from_str(raw.trim())
                .map_err(|e| format!("Invalid TIMEZONE: {}: {}", raw, e))?,
            None => chrono_tz::Europe::Warsaw,
        };

        let log_level = get("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                log_level, valid_log_levels
            ));
        }

        Ok(Self {
            fetch,
            mail,
            threshold,
            state_path: PathBuf::from(
                get("STATE_PATH").unwrap_or_else(|| ".alebilet_state.json".to_string()),
            ),
            log_path: PathBuf::from(
                get("LOG_PATH").unwrap_or_else(|| "logs/alebilet_log.csv".to_string()),
            ),
            timezone,
            log_level: log_level.to_lowercase(),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            mail: MailConfig::default(),
            threshold: Decimal::new(2300, 1),
            state_path: PathBuf::from(".alebilet_state.json"),
            log_path: PathBuf::from("logs/alebilet_log.csv"),
            timezone: chrono_tz::Europe::Warsaw,
            log_level: "info".to_string(),
        }
    }
}

/// Parse an optional numeric variable; a present but malformed value is an error
fn parse_or<F, T>(get: &F, key: &str, default: T) -> Result<T, String>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("Invalid {}: {}: {}", key, raw, e)),
        None => Ok(default),
    }
}

/// `scheme://host[:port]/` of the monitored page
fn site_root(url: &str) -> Result<String, FetchError> {
    let invalid = |reason: String| FetchError::InvalidUrl {
        url: url.to_string(),
        reason,
    };
    let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| invalid("missing host".to_string()))?;
    Ok(match parsed.port() {
        Some(port) => format!("{}://{}:{}/", parsed.scheme(), host, port),
        None => format!("{}://{}/", parsed.scheme(), host),
    })
}
