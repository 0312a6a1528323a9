//! Request pipeline: credential lookup, the client call under a timeout, and
//! the reference filter.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use super::auth::{AuthError, AuthManager};
use super::ports::{ClientError, CompletionClient, CompletionRequest, Settings, Suggestion};

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("no connection found")]
    NoConnection,
    #[error("connection is not an {expected} connection (found {actual})")]
    BadConnectionType {
        expected: &'static str,
        actual: &'static str,
    },
    #[error("completion request failed: {0}")]
    RequestFailed(String),
}

impl From<AuthError> for CompletionError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NoConnection => Self::NoConnection,
            AuthError::BadConnectionType { expected, actual } => {
                Self::BadConnectionType { expected, actual }
            }
            other => Self::RequestFailed(other.to_string()),
        }
    }
}

impl From<ClientError> for CompletionError {
    fn from(err: ClientError) -> Self {
        Self::RequestFailed(err.to_string())
    }
}

/// Per-request knobs taken from the settings at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOptions {
    pub timeout: Duration,
    pub include_references: bool,
}

impl From<&Settings> for RequestOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            timeout: settings.request_timeout(),
            include_references: settings.include_suggestions_with_references,
        }
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

pub struct CompletionPipeline {
    client: Arc<dyn CompletionClient>,
    auth: Arc<AuthManager>,
}

impl CompletionPipeline {
    pub fn new(client: Arc<dyn CompletionClient>, auth: Arc<AuthManager>) -> Self {
        Self { client, auth }
    }

    pub fn auth(&self) -> &Arc<AuthManager> {
        &self.auth
    }

    /// Must be polled inside a tokio runtime with the time driver enabled.
    pub async fn request_completions(
        &self,
        request: CompletionRequest,
        options: RequestOptions,
    ) -> Result<Vec<Suggestion>, CompletionError> {
        let credential = self.auth.credential().await?;

        let call = self.client.generate(request, credential);
        let suggestions = match tokio::time::timeout(options.timeout, call).await {
            Ok(result) => result?,
            Err(_) => return Err(ClientError::Timeout.into()),
        };

        if options.include_references {
            return Ok(suggestions);
        }
        let total = suggestions.len();
        let kept: Vec<Suggestion> = suggestions
            .into_iter()
            .filter(|s| !s.has_references())
            .collect();
        if kept.len() < total {
            tracing::debug!(
                dropped = total - kept.len(),
                "suggestions with code references filtered"
            );
        }
        Ok(kept)
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/services/completion.rs"]
mod tests;
