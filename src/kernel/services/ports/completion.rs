use std::time::Duration;

use futures::future::BoxFuture;
use thiserror::Error;

use super::auth::Credential;
use crate::kernel::language::CompletionLanguage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Auto,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FileContext {
    pub filename: String,
    pub language: CompletionLanguage,
    pub left_content: String,
    pub right_content: String,
    pub cursor: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CompletionRequest {
    pub file_context: FileContext,
    pub max_results: usize,
    pub trigger: TriggerKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_since_last_modification: Option<Duration>,
}

/// License attribution attached to a suggestion. Opaque to the kernel.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CodeReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<(usize, usize)>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Suggestion {
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<CodeReference>,
}

impl Suggestion {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            references: Vec::new(),
        }
    }

    pub fn has_references(&self) -> bool {
        !self.references.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("request timed out")]
    Timeout,
    #[error("request throttled")]
    Throttled,
    #[error("service error: {0}")]
    Service(String),
}

/// Remote completion service.
///
/// Implementations are not expected to support cancellation; superseded
/// calls are left to finish and their results are dropped by the kernel.
pub trait CompletionClient: Send + Sync {
    fn generate(
        &self,
        request: CompletionRequest,
        credential: Credential,
    ) -> BoxFuture<'_, Result<Vec<Suggestion>, ClientError>>;
}
