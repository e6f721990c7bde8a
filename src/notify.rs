//! Notification adapter — delivers the report link over the Twilio
//! WhatsApp message API.
//!
//! Delivery is best-effort by contract: the save flow logs failures as
//! warnings and still reports success. Nothing in this module is allowed
//! to fail a request.

use serde::Deserialize;
use thiserror::Error;

use crate::config::{TwilioConfig, TWILIO_URL};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("messaging provider unreachable at {0}")]
    Unreachable(String),

    #[error("messaging provider rejected the request ({status}): {body}")]
    Provider { status: u16, body: String },

    #[error("unexpected provider response: {0}")]
    ResponseParsing(String),
}

/// Twilio message API client.
pub struct TwilioClient {
    base_url: String,
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

/// Response body from the Messages endpoint; only the message sid matters.
#[derive(Deserialize)]
struct MessageResponse {
    sid: String,
}

impl TwilioClient {
    pub fn new(config: &TwilioConfig) -> Self {
        Self::with_base_url(config, TWILIO_URL)
    }

    /// Client against an explicit API root. Test seam.
    pub fn with_base_url(config: &TwilioConfig, base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
        }
    }

    /// Send the report link as a WhatsApp media message.
    ///
    /// Returns the provider-assigned message sid.
    pub async fn send_report_link(
        &self,
        to: &str,
        patient_name: &str,
        media_url: &str,
    ) -> Result<String, NotifyError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );

        let body = format!(
            "Hello {patient_name}, here is your AI-generated skin diagnosis report."
        );
        let form = [
            ("From", format!("whatsapp:{}", self.from_number)),
            ("To", format!("whatsapp:{to}")),
            ("Body", body),
            ("MediaUrl", media_url.to_string()),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    NotifyError::Unreachable(self.base_url.clone())
                } else {
                    NotifyError::ResponseParsing(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessageResponse = response
            .json()
            .await
            .map_err(|e| NotifyError::ResponseParsing(e.to_string()))?;

        Ok(parsed.sid)
    }
}
