use crate::config::SmsConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsMessage {
    pub from: String,
    pub to: String,
    pub text: String,
}

impl SmsMessage {
    pub fn new(from: &str, to: &str, text: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            text: text.to_string(),
        }
    }
}

impl From<&SmsConfig> for SmsMessage {
    fn from(config: &SmsConfig) -> Self {
        Self::new(&config.from, &config.to, &config.text)
    }
}

/// Outbound notification channel. `send` reports success as a bool and never
/// retries.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &SmsMessage) -> bool;
}

pub type NotifierRef = Arc<dyn Notifier>;

#[derive(Debug, Deserialize)]
struct VonageMessageStatus {
    #[serde(default)]
    to: Option<String>,

    #[serde(rename = "message-id", default)]
    message_id: Option<String>,

    status: String,

    #[serde(rename = "error-text", default)]
    error_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VonageResponse {
    #[serde(default)]
    messages: Vec<VonageMessageStatus>,
}

/// Vonage (formerly Nexmo) SMS API client. Credentials are taken from the
/// config at construction and never read from the environment here.
pub struct VonageSmsClient {
    api_url: String,
    api_key: String,
    api_secret: String,
    client: Client,
}

impl VonageSmsClient {
    pub fn new(config: &SmsConfig) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                let msg = format!("Failed to build HTTP client: {}", e);
                error!("{}", msg);
                msg
            })?;

        Ok(Self {
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            client,
        })
    }

    /// Returns the provider message ids on success.
    pub async fn send_message(&self, message: &SmsMessage) -> Result<Vec<String>, String> {
        if self.api_key.is_empty() || self.api_secret.is_empty() {
            let msg = "SMS api key or secret is not configured".to_string();
            error!("{}", msg);
            return Err(msg);
        }

        let params = [
            ("api_key", self.api_key.as_str()),
            ("api_secret", self.api_secret.as_str()),
            ("from", message.from.as_str()),
            ("to", message.to.as_str()),
            ("text", message.text.as_str()),
        ];

        let resp: VonageResponse = self
            .client
            .post(&self.api_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Failed to send SMS request: {}", e);
                error!("{}", msg);
                msg
            })?
            .error_for_status()
            .map_err(|e| {
                let msg = format!("SMS request rejected: {}", e);
                error!("{}", msg);
                msg
            })?
            .json()
            .await
            .map_err(|e| {
                let msg = format!("Failed to parse SMS response: {}", e);
                error!("{}", msg);
                msg
            })?;

        if resp.messages.is_empty() {
            let msg = "SMS response contained no messages".to_string();
            error!("{}", msg);
            return Err(msg);
        }

        let mut ids = Vec::with_capacity(resp.messages.len());
        for status in resp.messages {
            // Status "0" is the only success code
            if status.status != "0" {
                let msg = format!(
                    "SMS to {} failed with status {}: {}",
                    status.to.as_deref().unwrap_or(&message.to),
                    status.status,
                    status.error_text.as_deref().unwrap_or("unknown error")
                );
                error!("{}", msg);
                return Err(msg);
            }

            ids.push(status.message_id.unwrap_or_default());
        }

        Ok(ids)
    }
}

#[async_trait]
impl Notifier for VonageSmsClient {
    async fn send(&self, message: &SmsMessage) -> bool {
        match self.send_message(message).await {
            Ok(ids) => {
                info!("Sent message to number {}: ids={:?}", message.to, ids);
                true
            }
            Err(e) => {
                warn!("SMS notification failed: {}", e);
                false
            }
        }
    }
}
