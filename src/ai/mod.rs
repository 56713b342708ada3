//! LLM provider integration.
//!
//! Generation is delegated to two providers chosen when the
//! [`WorkflowOrchestrator`](crate::workflow::WorkflowOrchestrator) is built:
//!
//! - a **fast/structured** provider (Azure OpenAI) for functional requirements
//! - a **deep/reasoning** provider (Claude) for documents and estimates
//!
//! Both implement [`GenerationProvider`]. Failures are classified as
//! transient (worth one retry) or permanent (fail immediately).

mod azure;
mod claude;

pub use azure::AzureOpenAIProvider;
pub use claude::ClaudeProvider;

use std::fmt;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;

/// Trait for text generation providers.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate text for a prompt.
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Get the provider name.
    fn name(&self) -> &str;
}

/// Why a transient failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransientKind {
    /// The call exceeded its time budget
    Timeout,
    /// The provider asked us to slow down
    RateLimited,
    /// The provider returned a 5xx
    ServerError,
    /// Connection-level failure
    Network,
}

/// Why a permanent failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PermanentKind {
    /// Bad or missing credentials
    Auth,
    /// The request was rejected as malformed
    BadRequest,
    /// Anything else retry cannot fix
    Other,
}

impl fmt::Display for TransientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Timeout => "timeout",
            Self::RateLimited => "rate limited",
            Self::ServerError => "server error",
            Self::Network => "network error",
        })
    }
}

impl fmt::Display for PermanentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auth => "authentication failed",
            Self::BadRequest => "bad request",
            Self::Other => "provider error",
        })
    }
}

/// Provider error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Expected to succeed on an immediate retry.
    #[error("Transient provider failure ({0}): {1}")]
    Transient(TransientKind, String),

    /// Retrying cannot help.
    #[error("Permanent provider failure ({0}): {1}")]
    Permanent(PermanentKind, String),
}

impl ProviderError {
    /// Create a transient error.
    pub fn transient(kind: TransientKind, message: impl Into<String>) -> Self {
        Self::Transient(kind, message.into())
    }

    /// Create a permanent error.
    pub fn permanent(kind: PermanentKind, message: impl Into<String>) -> Self {
        Self::Permanent(kind, message.into())
    }

    /// Check whether a retry may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(..))
    }

    /// Classify a non-success HTTP response.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = format!("HTTP {}: {}", status.as_u16(), truncate(body, 300));
        match status.as_u16() {
            408 => Self::transient(TransientKind::Timeout, message),
            429 => Self::transient(TransientKind::RateLimited, message),
            // Anthropic's "overloaded" status
            529 => Self::transient(TransientKind::ServerError, message),
            500..=599 => Self::transient(TransientKind::ServerError, message),
            401 | 403 => Self::permanent(PermanentKind::Auth, message),
            400 | 404 | 413 | 422 => Self::permanent(PermanentKind::BadRequest, message),
            _ => Self::permanent(PermanentKind::Other, message),
        }
    }

    /// Classify a transport-level failure.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::transient(TransientKind::Timeout, err.to_string())
        } else if err.is_connect() || err.is_request() {
            Self::transient(TransientKind::Network, err.to_string())
        } else if let Some(status) = err.status() {
            Self::from_status(status, &err.to_string())
        } else if err.is_decode() {
            Self::permanent(PermanentKind::Other, format!("Unreadable response: {err}"))
        } else {
            Self::transient(TransientKind::Network, err.to_string())
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
