use crate::config::FetchConfig;
use crate::error::{AttemptError, FetchError};
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, PRAGMA, REFERER, USER_AGENT,
};
use reqwest::{redirect, Client, StatusCode};
use tokio::time;
use tracing::{debug, info, warn};

/// Bodies at or below this many characters are treated as challenge pages
pub const MIN_BODY_CHARS: usize = 1000;

/// Anything that can hand the monitor a page body
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch_page(&self) -> Result<String, FetchError>;
}

/// Page fetcher with a cookie-bearing session, warm-up request and linear backoff
pub struct PageFetcher {
    client: Client,
    config: FetchConfig,
}

impl PageFetcher {
    /// Create a new fetcher; the cookie store lives as long as the fetcher
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::limited(10))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client, config })
    }

    /// Fetch `config.url`, retrying up to `config.max_retries` extra times
    pub async fn fetch(&self) -> Result<String, FetchError> {
        let warmup_url = self.config.warmup_url()?;
        let attempts = self.config.total_attempts();
        let mut attempt = 0;

        loop {
            match self.attempt(&warmup_url).await {
                Ok(body) => {
                    info!(
                        "Fetched {} ({} chars) on attempt {}/{}",
                        self.config.url,
                        body.chars().count(),
                        attempt + 1,
                        attempts
                    );
                    return Ok(body);
                }
                Err(e) if attempt < self.config.max_retries => {
                    let delay = self.config.backoff(attempt);
                    warn!(
                        "Fetch attempt {}/{} failed: {}; retrying in {:?}",
                        attempt + 1,
                        attempts,
                        e,
                        delay
                    );
                    time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!("Fetch attempt {}/{} failed: {}", attempt + 1, attempts, e);
                    return Err(FetchError::RetriesExhausted { attempts, last: e });
                }
            }
        }
    }

    /// Warm-up on the site root, then the target page with a Referer
    async fn attempt(&self, warmup_url: &str) -> Result<String, AttemptError> {
        // Some WAFs set cookies even when answering 403, so the outcome is ignored
        match self
            .client
            .get(warmup_url)
            .headers(base_headers())
            .timeout(self.config.warmup_timeout())
            .send()
            .await
        {
            Ok(response) => {
                let status = response.status();
                let _ = response.bytes().await;
                debug!("Warm-up {} -> {}", warmup_url, status);
            }
            Err(e) => debug!("Warm-up {} failed: {}", warmup_url, e),
        }

        let mut headers = base_headers();
        if let Ok(referer) = HeaderValue::from_str(warmup_url) {
            headers.insert(REFERER, referer);
        }

        let response = self
            .client
            .get(&self.config.url)
            .headers(headers)
            .timeout(self.config.target_timeout())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        check_response(status, body)
    }
}

impl PageSource for PageFetcher {
    async fn fetch_page(&self) -> Result<String, FetchError> {
        self.fetch().await
    }
}

/// Accept a 2xx body longer than [`MIN_BODY_CHARS`]
pub fn check_response(status: StatusCode, body: String) -> Result<String, AttemptError> {
    let body_len = body.chars().count();
    if status.is_success() && body_len > MIN_BODY_CHARS {
        return Ok(body);
    }

    let code = status.as_u16();
    if matches!(code, 403 | 429) || status.is_server_error() || body_len < MIN_BODY_CHARS {
        Err(AttemptError::Blocked {
            status: code,
            body_len,
        })
    } else {
        Err(AttemptError::UnexpectedStatus { status: code })
    }
}

/// Browser-like header set sent with every request
fn base_headers() -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36",
        ),
    );
    h.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    h.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("pl-PL,pl;q=0.9,en-US;q=0.8,en;q=0.7"),
    );
    h.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    h.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    h
}
