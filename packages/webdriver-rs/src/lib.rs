//! Minimal W3C WebDriver client.
//!
//! Talks to a driver endpoint (chromedriver, geckodriver) over its HTTP
//! protocol. Covers only the session, navigation, script execution, and
//! page-source commands this workspace needs; not a general-purpose
//! binding.

pub mod models;

use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::models::{ErrorValue, NewSessionValue, ValueResponse};

/// Errors from the driver endpoint.
#[derive(Debug, Error)]
pub enum WebDriverError {
    /// The driver endpoint could not be reached at all
    #[error("driver endpoint unreachable: {0}")]
    Connect(#[source] reqwest::Error),

    /// The driver answered with a protocol-level error
    #[error("driver error ({error}): {message}")]
    Protocol { error: String, message: String },

    /// The driver answered with a body that does not parse
    #[error("unparseable driver response: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, WebDriverError>;

/// How to start the browser behind the session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Driver endpoint, e.g. `http://localhost:9515`
    pub endpoint: String,

    /// Chrome profile directory, so logins persist across runs
    pub user_data_dir: Option<String>,

    /// Run without a visible window
    pub headless: bool,
}

impl SessionOptions {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            user_data_dir: None,
            headless: false,
        }
    }

    pub fn with_user_data_dir(mut self, dir: impl Into<String>) -> Self {
        self.user_data_dir = Some(dir.into());
        self
    }

    pub fn headless(mut self) -> Self {
        self.headless = true;
        self
    }

    fn capabilities(&self) -> Value {
        let mut args = vec![
            "--disable-blink-features=AutomationControlled".to_string(),
            "--no-first-run".to_string(),
        ];
        if let Some(dir) = &self.user_data_dir {
            args.push(format!("--user-data-dir={dir}"));
        }
        if self.headless {
            args.push("--headless=new".to_string());
        }
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args }
                }
            }
        })
    }
}

/// One live browser session.
///
/// Dropping the session does not close the browser; call
/// [`WebDriverSession::quit`] when done.
pub struct WebDriverSession {
    client: Client,
    endpoint: String,
    session_id: String,
}

impl WebDriverSession {
    /// Start a new session against the driver endpoint.
    pub async fn start(options: SessionOptions) -> Result<Self> {
        let client = Client::new();
        let response = client
            .post(format!("{}/session", options.endpoint))
            .json(&options.capabilities())
            .send()
            .await
            .map_err(WebDriverError::Connect)?;

        let value: NewSessionValue = unwrap_value(response).await?;
        debug!(session_id = %value.session_id, "webdriver session started");

        Ok(Self {
            client,
            endpoint: options.endpoint,
            session_id: value.session_id,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Navigate to a URL and wait for the document to load.
    pub async fn goto(&self, url: &str) -> Result<()> {
        let response = self
            .client
            .post(self.command_url("url"))
            .json(&json!({ "url": url }))
            .send()
            .await
            .map_err(WebDriverError::Connect)?;
        unwrap_value::<Value>(response).await?;
        Ok(())
    }

    /// The current URL of the top-level browsing context.
    pub async fn current_url(&self) -> Result<String> {
        let response = self
            .client
            .get(self.command_url("url"))
            .send()
            .await
            .map_err(WebDriverError::Connect)?;
        unwrap_value(response).await
    }

    /// Full serialized DOM of the current page.
    pub async fn page_source(&self) -> Result<String> {
        let response = self
            .client
            .get(self.command_url("source"))
            .send()
            .await
            .map_err(WebDriverError::Connect)?;
        unwrap_value(response).await
    }

    /// Execute JavaScript synchronously in the page; returns the
    /// script's JSON return value.
    pub async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        let response = self
            .client
            .post(self.command_url("execute/sync"))
            .json(&json!({ "script": script, "args": args }))
            .send()
            .await
            .map_err(WebDriverError::Connect)?;
        unwrap_value(response).await
    }

    /// Resize the browser window.
    pub async fn set_window_rect(&self, width: u32, height: u32) -> Result<()> {
        let response = self
            .client
            .post(self.command_url("window/rect"))
            .json(&json!({ "width": width, "height": height, "x": 0, "y": 0 }))
            .send()
            .await
            .map_err(WebDriverError::Connect)?;
        unwrap_value::<Value>(response).await?;
        Ok(())
    }

    /// End the session and close the browser window.
    pub async fn quit(self) -> Result<()> {
        let response = self
            .client
            .delete(format!("{}/session/{}", self.endpoint, self.session_id))
            .send()
            .await
            .map_err(WebDriverError::Connect)?;
        unwrap_value::<Value>(response).await?;
        Ok(())
    }

    fn command_url(&self, command: &str) -> String {
        format!("{}/session/{}/{command}", self.endpoint, self.session_id)
    }
}

/// Unwrap the `value` envelope, converting protocol errors.
async fn unwrap_value<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| WebDriverError::Parse(e.to_string()))?;

    if !status.is_success() {
        // Error bodies still carry the value envelope.
        if let Ok(err) = serde_json::from_str::<ValueResponse<ErrorValue>>(&body) {
            return Err(WebDriverError::Protocol {
                error: err.value.error,
                message: err.value.message,
            });
        }
        return Err(WebDriverError::Protocol {
            error: status.to_string(),
            message: body,
        });
    }

    serde_json::from_str::<ValueResponse<T>>(&body)
        .map(|v| v.value)
        .map_err(|e| WebDriverError::Parse(format!("{e}: {body}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_carry_profile_and_headless_args() {
        let opts = SessionOptions::new("http://localhost:9515")
            .with_user_data_dir("/tmp/profile")
            .headless();
        let caps = opts.capabilities();
        let args = caps["capabilities"]["alwaysMatch"]["goog:chromeOptions"]["args"]
            .as_array()
            .unwrap();
        let args: Vec<&str> = args.iter().filter_map(Value::as_str).collect();
        assert!(args.contains(&"--user-data-dir=/tmp/profile"));
        assert!(args.contains(&"--headless=new"));
    }

    #[test]
    fn default_options_have_no_profile() {
        let caps = SessionOptions::new("http://localhost:9515").capabilities();
        let args = caps["capabilities"]["alwaysMatch"]["goog:chromeOptions"]["args"]
            .as_array()
            .unwrap();
        assert!(!args
            .iter()
            .filter_map(Value::as_str)
            .any(|a| a.starts_with("--user-data-dir")));
    }
}
