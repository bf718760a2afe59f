use crate::error::{EmailError, EmailResult};
use async_trait::async_trait;
use auth_flows::mailer::Mailer;
use mail_builder::MessageBuilder;
use mail_send::SmtpClientBuilder;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

/// SMTP relay settings. `secure` selects implicit TLS (port 465 style);
/// when false the client upgrades via STARTTLS.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub secure: bool,
    pub email: String,
    pub password: String,
    pub from_name: String,
}

impl SmtpConfig {
    /// Load SMTP configuration from environment variables. Host and
    /// credentials are mandatory; the rest falls back to implicit-TLS
    /// submission defaults.
    pub fn from_env() -> EmailResult<Self> {
        let host = require("SMTP_HOST")?;
        let email = require("SMTP_EMAIL")?;
        let password = require("SMTP_PASS")?;

        let port = match std::env::var("SMTP_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| EmailError::Config(format!("invalid SMTP_PORT {raw:?}")))?,
            Err(_) => 465,
        };
        let secure = match std::env::var("SMTP_SECURE") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| EmailError::Config(format!("invalid SMTP_SECURE {raw:?}")))?,
            Err(_) => true,
        };
        let from_name =
            std::env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Authline".to_string());

        Ok(Self {
            host,
            port,
            secure,
            email,
            password,
            from_name,
        })
    }
}

fn require(name: &'static str) -> EmailResult<String> {
    std::env::var(name).map_err(|_| EmailError::Config(format!("{name} is not set")))
}

/// Mailer backed by a single SMTP relay. A fresh connection per message:
/// delivery volume here is a handful of verification and reset codes,
/// not bulk mail.
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn client(&self) -> SmtpClientBuilder<String> {
        SmtpClientBuilder::new(self.config.host.clone(), self.config.port)
            .implicit_tls(self.config.secure)
            .credentials((self.config.email.clone(), self.config.password.clone()))
    }

    /// Connect to the relay without sending, to surface configuration
    /// problems at startup instead of on the first registration.
    pub async fn verify_connection(&self) -> EmailResult<()> {
        info!(host = %self.config.host, port = self.config.port, "verifying SMTP connection");
        let _client = self
            .client()
            .connect()
            .await
            .map_err(|e| EmailError::SendFailed(format!("SMTP connection failed: {e}")))?;
        Ok(())
    }

    /// Send an HTML message and return its delivery id.
    pub async fn deliver(&self, to: &str, subject: &str, html: &str) -> EmailResult<String> {
        let message = MessageBuilder::new()
            .from((self.config.from_name.as_str(), self.config.email.as_str()))
            .to(to)
            .subject(subject)
            .html_body(html);

        let mut client = self
            .client()
            .connect()
            .await
            .map_err(|e| EmailError::SendFailed(format!("SMTP connection failed: {e}")))?;

        let message_id = Uuid::new_v4().to_string();
        client
            .send(message)
            .await
            .map_err(|e| EmailError::SendFailed(format!("SMTP delivery failed: {e}")))?;

        debug!(message_id = %message_id, "email sent");
        Ok(message_id)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
        self.deliver(to, subject, html).await?;
        Ok(())
    }
}
