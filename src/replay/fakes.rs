//! In-process stand-ins for the credential store and the completion service.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use futures::future::BoxFuture;
use futures::FutureExt;
use whisperline::kernel::services::ports::auth::{
    BUILDER_ID_REGION, BUILDER_ID_START_URL, COMPLETION_SCOPES,
};
use whisperline::kernel::services::ports::{
    AuthProvider, AuthProviderError, AwsCredentials, ClientError, CompletionClient,
    CompletionRequest, Connection, ConnectionId, ConnectionKind, ConnectionProfile,
    ConnectionState, Credential, Suggestion,
};

/// Answers each request with the next queued reply, or nothing.
#[derive(Default)]
pub struct CannedClient {
    replies: Mutex<VecDeque<Vec<Suggestion>>>,
}

impl CannedClient {
    pub fn push(&self, suggestions: Vec<Suggestion>) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(suggestions);
    }
}

impl CompletionClient for CannedClient {
    fn generate(
        &self,
        request: CompletionRequest,
        _credential: Credential,
    ) -> BoxFuture<'_, Result<Vec<Suggestion>, ClientError>> {
        let reply = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_default();
        tracing::debug!(
            language = %request.file_context.language,
            trigger = ?request.trigger,
            count = reply.len(),
            "canned completion reply"
        );
        async move { Ok(reply) }.boxed()
    }
}

/// Credential store holding SSO connections in memory. Every connection it
/// creates carries the completion scopes.
#[derive(Default)]
pub struct LocalAuthProvider {
    connections: Mutex<Vec<Connection>>,
    next_id: AtomicU64,
}

impl LocalAuthProvider {
    fn connections(&self) -> std::sync::MutexGuard<'_, Vec<Connection>> {
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn sso(&self, start_url: String, region: String) -> Connection {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        Connection {
            id: ConnectionId::new(format!("local-{n}")),
            label: start_url.clone(),
            kind: ConnectionKind::Sso {
                start_url,
                region,
                scopes: COMPLETION_SCOPES.iter().map(|s| s.to_string()).collect(),
            },
            state: ConnectionState::Valid,
        }
    }
}

impl AuthProvider for LocalAuthProvider {
    fn list_connections(&self) -> BoxFuture<'_, Result<Vec<Connection>, AuthProviderError>> {
        let list = self.connections().clone();
        async move { Ok(list) }.boxed()
    }

    fn create_connection(
        &self,
        profile: ConnectionProfile,
    ) -> BoxFuture<'_, Result<Connection, AuthProviderError>> {
        let result = match profile {
            ConnectionProfile::BuilderId => Ok(self.sso(
                BUILDER_ID_START_URL.to_string(),
                BUILDER_ID_REGION.to_string(),
            )),
            ConnectionProfile::EnterpriseSso { start_url, region } => {
                Ok(self.sso(start_url, region))
            }
            ConnectionProfile::Iam { profile } => Err(AuthProviderError::ProfileNotFound(profile)),
        };
        if let Ok(conn) = &result {
            self.connections().push(conn.clone());
        }
        async move { result }.boxed()
    }

    fn delete_connection(&self, id: ConnectionId) -> BoxFuture<'_, Result<(), AuthProviderError>> {
        self.connections().retain(|c| c.id != id);
        async { Ok(()) }.boxed()
    }

    fn reauthenticate(
        &self,
        id: ConnectionId,
    ) -> BoxFuture<'_, Result<Connection, AuthProviderError>> {
        let result = self
            .connections()
            .iter_mut()
            .find(|c| c.id == id)
            .map(|c| {
                c.state = ConnectionState::Valid;
                c.clone()
            })
            .ok_or(AuthProviderError::NotFound(id));
        async move { result }.boxed()
    }

    fn token(&self, id: ConnectionId) -> BoxFuture<'_, Result<String, AuthProviderError>> {
        async move { Ok(format!("local-token-{id}")) }.boxed()
    }

    fn credentials(
        &self,
        id: ConnectionId,
    ) -> BoxFuture<'_, Result<AwsCredentials, AuthProviderError>> {
        async move { Err(AuthProviderError::ProfileNotFound(id.0)) }.boxed()
    }
}
