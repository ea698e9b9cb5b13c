//! Minimal client for the Resend email API.
//!
//! Covers exactly one operation, sending an email with optional
//! attachments via `POST /emails`.

pub mod models;

use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::models::{ApiErrorResponse, EmailMessage, SendResponse};

const API_BASE: &str = "https://api.resend.com";

/// Errors from the email API.
#[derive(Debug, Error)]
pub enum ResendError {
    /// The API endpoint could not be reached
    #[error("email service unreachable: {0}")]
    Connect(#[source] reqwest::Error),

    /// The API rejected the request
    #[error("email API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The API answered with a body that does not parse
    #[error("unparseable email API response: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, ResendError>;

/// Resend API client.
#[derive(Debug, Clone)]
pub struct ResendClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ResendClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: API_BASE.to_string(),
        }
    }

    /// Point at a different endpoint (tests, proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Send one email; returns the provider's message id.
    pub async fn send(&self, message: &EmailMessage) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(message)
            .send()
            .await
            .map_err(ResendError::Connect)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(ResendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let sent: SendResponse = response
            .json()
            .await
            .map_err(|e| ResendError::Parse(e.to_string()))?;
        debug!(id = %sent.id, "email accepted");
        Ok(sent.id)
    }
}
