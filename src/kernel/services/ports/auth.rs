use futures::future::BoxFuture;
use thiserror::Error;

pub const BUILDER_ID_START_URL: &str = "https://view.awsapps.com/start";
pub const BUILDER_ID_REGION: &str = "us-east-1";
pub const COMPLETION_SCOPES: &[&str] = &["codewhisperer:completions", "codewhisperer:analysis"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ConnectionId(pub String);

impl ConnectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionKind {
    /// Token based.
    Sso {
        start_url: String,
        region: String,
        scopes: Vec<String>,
    },
    /// Key based.
    Iam { profile: String },
}

impl ConnectionKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sso { .. } => "sso",
            Self::Iam { .. } => "iam",
        }
    }

    pub fn is_builder_id(&self) -> bool {
        matches!(self, Self::Sso { start_url, .. } if start_url == BUILDER_ID_START_URL)
    }

    pub fn has_scopes(&self, required: &[&str]) -> bool {
        match self {
            Self::Sso { scopes, .. } => required
                .iter()
                .all(|scope| scopes.iter().any(|s| s == scope)),
            Self::Iam { .. } => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Valid,
    Expired,
    Authenticating,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub label: String,
    pub kind: ConnectionKind,
    pub state: ConnectionState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionProfile {
    BuilderId,
    EnterpriseSso { start_url: String, region: String },
    Iam { profile: String },
}

#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    BearerToken(String),
    Keys(AwsCredentials),
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BearerToken(_) => f.write_str("BearerToken(<redacted>)"),
            Self::Keys(keys) => f.debug_tuple("Keys").field(keys).finish(),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthProviderError {
    #[error("connection not found: {0}")]
    NotFound(ConnectionId),
    #[error("profile not found: {0}")]
    ProfileNotFound(String),
    #[error("{0}")]
    Failed(String),
}

/// Shared credential store owned by the host. The manager delegates every
/// network-facing auth operation to it.
pub trait AuthProvider: Send + Sync {
    fn list_connections(&self) -> BoxFuture<'_, Result<Vec<Connection>, AuthProviderError>>;

    fn create_connection(
        &self,
        profile: ConnectionProfile,
    ) -> BoxFuture<'_, Result<Connection, AuthProviderError>>;

    fn delete_connection(&self, id: ConnectionId) -> BoxFuture<'_, Result<(), AuthProviderError>>;

    fn reauthenticate(
        &self,
        id: ConnectionId,
    ) -> BoxFuture<'_, Result<Connection, AuthProviderError>>;

    fn token(&self, id: ConnectionId) -> BoxFuture<'_, Result<String, AuthProviderError>>;

    fn credentials(
        &self,
        id: ConnectionId,
    ) -> BoxFuture<'_, Result<AwsCredentials, AuthProviderError>>;
}
