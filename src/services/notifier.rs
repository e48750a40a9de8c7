//! Alert email delivery via SMTP.
//!
//! [`Notifier`] submits one plain-text message per alert through lettre's
//! async STARTTLS transport. Nothing is retried here; a failed send leaves
//! the latch open so the next run tries again.

use crate::config::MailConfig;
use crate::error::NotifyError;
use crate::price::format_pln;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use rust_decimal::Decimal;
use tracing::info;

/// Anything that can deliver a below-threshold alert
#[allow(async_fn_in_trait)]
pub trait AlertSender {
    async fn send_alert(&self, price: Decimal) -> Result<(), NotifyError>;
}

/// Rendered subject and body of an alert
#[derive(Debug, Clone, PartialEq)]
pub struct AlertContent {
    pub subject: String,
    pub body: String,
}

/// Fill the alert template
pub fn render_alert(price: Decimal, threshold: Decimal, url: &str) -> AlertContent {
    let subject = format!(
        "ALERT: COMA „Płyta” < {} zł (alebilet)",
        threshold.normalize()
    );
    let body = [
        "Cena „Płyta” spadła poniżej progu.".to_string(),
        String::new(),
        format!("Aktualna cena: {} zł", format_pln(price)),
        format!("Próg: {} zł", format_pln(threshold)),
        String::new(),
        format!("Strona: {}", url),
        String::new(),
        "—".to_string(),
        "Automatyczny monitoring.".to_string(),
    ]
    .join("\n");

    AlertContent { subject, body }
}

/// Sends alert emails over authenticated SMTP
pub struct Notifier {
    config: MailConfig,
    threshold: Decimal,
    url: String,
}

impl Notifier {
    pub fn new(config: MailConfig, threshold: Decimal, url: impl Into<String>) -> Self {
        Self {
            config,
            threshold,
            url: url.into(),
        }
    }

    /// Build the message without touching the network
    pub fn compose(&self, price: Decimal) -> Result<Message, NotifyError> {
        let content = render_alert(price, self.threshold, &self.url);

        Message::builder()
            .from(self.config.from_address.parse()?)
            .to(self.config.to_address.parse()?)
            .subject(content.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(content.body)
            .map_err(|e| NotifyError::Build(e.to_string()))
    }

    /// Send the alert for `price`
    pub async fn send(&self, price: Decimal) -> Result<(), NotifyError> {
        let (user, pass) = self
            .config
            .credentials()
            .ok_or(NotifyError::MissingCredentials)?;

        let email = self.compose(price)?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
            .port(self.config.smtp_port)
            .timeout(Some(self.config.timeout()))
            .credentials(Credentials::new(user.to_string(), pass.to_string()))
            .build();

        mailer.send(email).await?;

        info!(
            to = %self.config.to_address,
            price = %price,
            "Alert email sent"
        );
        Ok(())
    }
}

impl AlertSender for Notifier {
    async fn send_alert(&self, price: Decimal) -> Result<(), NotifyError> {
        self.send(price).await
    }
}
