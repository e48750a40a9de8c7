#![allow(dead_code)]

use alebilet_watch::error::{AttemptError, FetchError, NotifyError};
use alebilet_watch::models::MonitorState;
use alebilet_watch::services::{AlertSender, EventLog, Monitor, PageSource, StateStore};
use rust_decimal::Decimal;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Threshold used by every test monitor (230 zł)
pub fn threshold() -> Decimal {
    Decimal::new(230, 0)
}

/// Event page with the watched row, padded past the challenge-page size
pub fn event_page(price_text: &str) -> String {
    format!(
        r#"<html><head><title>COMA - Re-start</title></head><body>
<table class="tickets"><tbody>
<tr data-area="trybuna" class="category"><td class="name">Trybuna</td><td class="price"><b>189,00 zł</b></td></tr>
<tr data-area="plyta" class="category available"><td class="name">Płyta</td><td class="price"><b>{}</b></td></tr>
</tbody></table>
<!-- {} -->
</body></html>"#,
        price_text,
        "padding ".repeat(150)
    )
}

/// Event page whose ticket table no longer has the watched row
pub fn page_without_row() -> String {
    format!(
        r#"<html><body><table><tr data-area="trybuna" class="category"><td class="price"><b>189,00 zł</b></td></tr></table><!-- {} --></body></html>"#,
        "padding ".repeat(150)
    )
}

/// Page source with a fixed outcome
pub enum FakePage {
    Html(String),
    Blocked,
}

impl PageSource for FakePage {
    async fn fetch_page(&self) -> Result<String, FetchError> {
        match self {
            FakePage::Html(html) => Ok(html.clone()),
            FakePage::Blocked => Err(FetchError::RetriesExhausted {
                attempts: 4,
                last: AttemptError::Blocked {
                    status: 403,
                    body_len: 120,
                },
            }),
        }
    }
}

/// Alert sender that counts attempts and optionally fails
#[derive(Clone, Default)]
pub struct FakeAlerts {
    pub attempts: Arc<AtomicUsize>,
    pub fail: bool,
}

impl FakeAlerts {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Same counter, different outcome
    pub fn with_failure(&self, fail: bool) -> Self {
        Self {
            attempts: self.attempts.clone(),
            fail,
        }
    }

    pub fn count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl AlertSender for FakeAlerts {
    async fn send_alert(&self, _price: Decimal) -> Result<(), NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(NotifyError::MissingCredentials)
        } else {
            Ok(())
        }
    }
}

/// Temporary directory holding one job's state and log files
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.path().join(".alebilet_state.json")
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.path().join("logs").join("alebilet_log.csv")
    }

    /// A fresh monitor, as a new scheduled process would build it
    pub fn monitor<P: PageSource, A: AlertSender>(&self, page: P, alerts: A) -> Monitor<P, A> {
        Monitor::new(
            page,
            alerts,
            EventLog::new(self.log_path()),
            StateStore::new(self.state_path()),
            threshold(),
            chrono_tz::Europe::Warsaw,
        )
    }

    pub fn set_latched(&self, last_below: bool) {
        StateStore::new(self.state_path())
            .save(&MonitorState::new(last_below))
            .expect("Failed to seed state");
    }

    pub fn last_below(&self) -> bool {
        StateStore::new(self.state_path()).load().last_below
    }

    /// Data rows of the event log (header excluded)
    pub fn log_rows(&self) -> Vec<Vec<String>> {
        let mut reader = csv::Reader::from_path(self.log_path()).expect("Failed to open log");
        reader
            .records()
            .map(|r| {
                r.expect("Malformed log row")
                    .iter()
                    .map(str::to_string)
                    .collect()
            })
            .collect()
    }
}

/// Canned reply from the stub HTTP server
pub struct StubResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl StubResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Minimal HTTP/1.1 server recording every request it receives
pub struct StubServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    /// Serve `handler(path, raw_request)` on an ephemeral local port
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&str, &str) -> StubResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub server");
        let addr = listener.local_addr().expect("No local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler = Arc::new(handler);

        let recorded = requests.clone();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let handler = handler.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    loop {
                        let n = stream.read(&mut chunk).await.unwrap_or(0);
                        if n == 0 {
                            break;
                        }
                        buf.extend_from_slice(&chunk[..n]);
                        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }

                    let raw = String::from_utf8_lossy(&buf).to_string();
                    let path = raw.split_whitespace().nth(1).unwrap_or("/").to_string();
                    recorded.lock().unwrap().push(raw.clone());

                    let reply = handler(&path, &raw);
                    let mut out = format!(
                        "HTTP/1.1 {} Stub\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n",
                        reply.status,
                        reply.body.len()
                    );
                    for (name, value) in &reply.headers {
                        out.push_str(&format!("{}: {}\r\n", name, value));
                    }
                    out.push_str("\r\n");
                    out.push_str(&reply.body);

                    let _ = stream.write_all(out.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Self { addr, requests }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Raw requests received so far, in arrival order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self, path: &str) -> usize {
        let prefix = format!("GET {} ", path);
        self.requests()
            .iter()
            .filter(|r| r.starts_with(&prefix))
            .count()
    }
}
