//! Service ports: traits + data contracts.

pub mod auth;
pub mod completion;
pub mod editor;
pub mod runtime;
pub mod settings;

pub use auth::{
    AuthProvider, AuthProviderError, AwsCredentials, Connection, ConnectionId, ConnectionKind,
    ConnectionProfile, ConnectionState, Credential,
};
pub use completion::{
    ClientError, CodeReference, CompletionClient, CompletionRequest, FileContext, Suggestion,
    TriggerKind,
};
pub use editor::{EditorError, EditorPort, Prompt};
pub use runtime::{AsyncExecutor, TaskFuture};
pub use settings::Settings;
