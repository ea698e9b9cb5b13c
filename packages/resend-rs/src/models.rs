//! Request and response types for the Resend email API.

use base64::Engine;
use serde::{Deserialize, Serialize};

/// An outbound email.
#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl EmailMessage {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        subject: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: vec![to.into()],
            subject: subject.into(),
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    /// Attach raw bytes under the given filename.
    pub fn with_attachment(mut self, filename: impl Into<String>, bytes: &[u8]) -> Self {
        self.attachments.push(Attachment {
            filename: filename.into(),
            content: base64::engine::general_purpose::STANDARD.encode(bytes),
        });
        self
    }
}

/// A file attachment; the API takes content base64-encoded.
#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    pub filename: String,
    pub content: String,
}

/// Payload of a successful send.
#[derive(Debug, Deserialize)]
pub struct SendResponse {
    pub id: String,
}

/// Payload of an error response.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub name: String,
    pub message: String,
}
