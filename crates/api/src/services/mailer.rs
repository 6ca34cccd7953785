//! Invitation email delivery.
//!
//! Delivery is best-effort but its failure must be visible: the
//! invitation service runs the send inside the invitation's insert
//! transaction, so a rejected message rolls the whole invitation back.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

/// Timeout on the delivery API call.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("Email API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Email API is not configured")]
    NotConfigured,
}

/// An outbound email message.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivery of a single message through some transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError>;
}

/// HTTP delivery-API client (JSON POST with a bearer key).
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    from_address: String,
}

impl HttpMailer {
    pub fn new(api_url: String, api_key: Option<String>, from_address: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .expect("reqwest client construction cannot fail with static config");
        Self {
            client,
            api_url,
            api_key,
            from_address,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        let payload = json!({
            "from": self.from_address,
            "to": message.to,
            "subject": message.subject,
            "text": message.body,
        });

        let mut request = self.client.post(&self.api_url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        request.send().await?.error_for_status()?;
        Ok(())
    }
}

/// Development mailer: logs the message instead of delivering it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "EMAIL_API_URL not configured; logging invitation email instead of sending"
        );
        Ok(())
    }
}
