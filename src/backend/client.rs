//! HTTP client for the chat backend contract.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::widget::ConversationContext;

/// Connection settings for the conversational backend.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    base_url: String,
    request_timeout: Duration,
}

impl BackendSettings {
    /// Create settings for the given base URL.
    ///
    /// A trailing slash is normalized away before use.
    #[must_use]
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Get the normalized base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the chat endpoint URL.
    #[must_use]
    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

/// Request body for a single conversational turn.
#[derive(Debug, Serialize)]
pub struct TurnRequest<'a> {
    /// Trimmed customer message.
    pub message: &'a str,
    /// Context snapshot echoed back verbatim.
    pub context: &'a ConversationContext,
}

/// Successful reply payload for a turn.
#[derive(Debug, Clone, Deserialize)]
pub struct TurnReply {
    /// Bot reply text.
    pub reply: String,
    /// Replacement conversational context, when the backend supplies one.
    #[serde(default)]
    pub context: Option<ConversationContext>,
}

/// Errors surfaced by the backend client.
///
/// The widget collapses all of these into the same user-visible apology; the
/// variants exist so diagnostics can log what actually went wrong.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The configured base URL does not parse.
    #[error("invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request never produced a usable response (network/DNS/timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned status {status}")]
    Status {
        /// HTTP status code.
        status: StatusCode,
        /// Response body, kept for diagnostics logging only.
        body: String,
    },

    /// The response body was not a decodable reply payload.
    #[error("invalid reply payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Seam between the widget and the remote conversational backend.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one conversational turn and await its reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be delivered, the backend
    /// answers with a non-success status, or the reply body does not decode.
    async fn send_turn(
        &self,
        message: &str,
        context: &ConversationContext,
    ) -> Result<TurnReply, BackendError>;
}

/// [`ChatBackend`] implementation over HTTP.
#[derive(Debug, Clone)]
pub struct HttpChatBackend {
    http: reqwest::Client,
    settings: BackendSettings,
}

impl HttpChatBackend {
    /// Create a client for the given settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be constructed.
    pub fn new(settings: BackendSettings) -> Result<Self, BackendError> {
        Url::parse(settings.base_url())?;
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self { http, settings })
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn send_turn(
        &self,
        message: &str,
        context: &ConversationContext,
    ) -> Result<TurnReply, BackendError> {
        let url = self.settings.chat_url();
        let body = TurnRequest { message, context };

        tracing::debug!(
            name: "backend.turn.request",
            url = %url,
            "Forwarding turn to backend"
        );

        let response = self.http.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".into());
            tracing::warn!(
                name: "backend.turn.status",
                status = %status,
                body = %body,
                "Backend returned error status"
            );
            return Err(BackendError::Status { status, body });
        }

        let text = response.text().await?;
        let reply = serde_json::from_str::<TurnReply>(&text)?;
        Ok(reply)
    }
}
