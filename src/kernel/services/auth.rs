//! Connection manager for the completion service.
//!
//! One manager is built at startup and shared through `Arc`. Observers never
//! hold the manager itself: they subscribe to a `watch` channel carrying a
//! [`ConnectionSnapshot`] that is republished on every state change.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::watch;

use super::ports::auth::COMPLETION_SCOPES;
use super::ports::{
    AuthProvider, AuthProviderError, AwsCredentials, Connection, ConnectionId, ConnectionKind,
    ConnectionProfile, ConnectionState, Credential,
};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no connection found")]
    NoConnection,
    #[error("connection is not an {expected} connection (found {actual})")]
    BadConnectionType {
        expected: &'static str,
        actual: &'static str,
    },
    #[error("unable to authenticate connection")]
    ReauthenticationFailed {
        #[source]
        source: AuthProviderError,
    },
    #[error(transparent)]
    Provider(#[from] AuthProviderError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionSnapshot {
    pub connection: Option<Connection>,
    pub valid: bool,
    pub expired: bool,
    pub enterprise: bool,
}

#[derive(Default)]
struct AuthInner {
    active: Option<Connection>,
    enterprise: bool,
}

pub struct AuthManager {
    provider: Arc<dyn AuthProvider>,
    allow_key_based: bool,
    inner: Mutex<AuthInner>,
    changes: watch::Sender<ConnectionSnapshot>,
}

impl AuthManager {
    pub fn new(provider: Arc<dyn AuthProvider>, allow_key_based: bool) -> Self {
        let (changes, _) = watch::channel(ConnectionSnapshot::default());
        Self {
            provider,
            allow_key_based,
            inner: Mutex::new(AuthInner::default()),
            changes,
        }
    }

    fn inner(&self) -> MutexGuard<'_, AuthInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionSnapshot> {
        self.changes.subscribe()
    }

    pub fn snapshot(&self) -> ConnectionSnapshot {
        let inner = self.inner();
        Self::snapshot_of(&inner)
    }

    fn snapshot_of(inner: &AuthInner) -> ConnectionSnapshot {
        let expired = inner
            .active
            .as_ref()
            .is_some_and(|conn| conn.state == ConnectionState::Expired);
        ConnectionSnapshot {
            connection: inner.active.clone(),
            valid: inner.active.is_some() && !expired,
            expired,
            enterprise: inner.active.is_some() && inner.enterprise,
        }
    }

    fn publish(&self, inner: &AuthInner) {
        let snapshot = Self::snapshot_of(inner);
        tracing::info!(
            connection = snapshot.connection.as_ref().map(|c| c.id.0.as_str()),
            valid = snapshot.valid,
            expired = snapshot.expired,
            enterprise = snapshot.enterprise,
            "connection changed"
        );
        self.changes.send_replace(snapshot);
    }

    pub fn active_connection(&self) -> Option<Connection> {
        self.inner().active.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.inner().active.is_some()
    }

    pub fn is_valid(&self) -> bool {
        self.snapshot().valid
    }

    pub fn is_expired(&self) -> bool {
        let inner = self.inner();
        inner
            .active
            .as_ref()
            .is_some_and(|conn| conn.state == ConnectionState::Expired && self.is_usable(conn))
    }

    pub fn is_enterprise_sso_in_use(&self) -> bool {
        self.snapshot().enterprise
    }

    /// Whether `conn` can be used for completions as-is.
    pub fn is_usable(&self, conn: &Connection) -> bool {
        match &conn.kind {
            ConnectionKind::Sso { .. } => conn.kind.has_scopes(COMPLETION_SCOPES),
            ConnectionKind::Iam { .. } => self.allow_key_based,
        }
    }

    fn accepted_kind(&self) -> &'static str {
        if self.allow_key_based {
            "sso or iam"
        } else {
            "sso"
        }
    }

    pub async fn connect(&self, profile: ConnectionProfile) -> Result<Connection, AuthError> {
        let existing = self.provider.list_connections().await?;
        match profile {
            ConnectionProfile::BuilderId => {
                let found = existing.into_iter().find(|c| c.kind.is_builder_id());
                self.adopt_or_create(found, ConnectionProfile::BuilderId)
                    .await
            }
            ConnectionProfile::EnterpriseSso { start_url, region } => {
                let found = existing.into_iter().find(|c| {
                    matches!(&c.kind, ConnectionKind::Sso { start_url: url, .. }
                        if url.eq_ignore_ascii_case(&start_url))
                });
                self.adopt_or_create(
                    found,
                    ConnectionProfile::EnterpriseSso { start_url, region },
                )
                .await
            }
            ConnectionProfile::Iam { profile } => {
                if !self.allow_key_based {
                    return Err(AuthError::BadConnectionType {
                        expected: self.accepted_kind(),
                        actual: "iam",
                    });
                }
                let found = existing.into_iter().find(|c| {
                    matches!(&c.kind, ConnectionKind::Iam { profile: p } if *p == profile)
                });
                let conn = found.ok_or(AuthError::NoConnection)?;
                self.use_connection(conn.clone())?;
                Ok(conn)
            }
        }
    }

    async fn adopt_or_create(
        &self,
        existing: Option<Connection>,
        profile: ConnectionProfile,
    ) -> Result<Connection, AuthError> {
        match existing {
            None => {
                let conn = self.provider.create_connection(profile).await?;
                self.use_connection(conn.clone())?;
                Ok(conn)
            }
            Some(conn) if self.is_usable(&conn) => {
                self.use_connection(conn.clone())?;
                Ok(conn)
            }
            Some(conn) => self.rescope(conn).await,
        }
    }

    /// Replaces an SSO connection lacking completion scopes with an upgraded one.
    async fn rescope(&self, existing: Connection) -> Result<Connection, AuthError> {
        let profile = match &existing.kind {
            kind if kind.is_builder_id() => ConnectionProfile::BuilderId,
            ConnectionKind::Sso {
                start_url, region, ..
            } => ConnectionProfile::EnterpriseSso {
                start_url: start_url.clone(),
                region: region.clone(),
            },
            ConnectionKind::Iam { .. } => {
                return Err(AuthError::BadConnectionType {
                    expected: "sso",
                    actual: "iam",
                })
            }
        };

        let upgraded = self.provider.create_connection(profile).await?;
        self.provider.delete_connection(existing.id.clone()).await?;
        tracing::debug!(from = %existing.id, to = %upgraded.id, "connection rescoped");
        self.use_connection(upgraded.clone())?;
        Ok(upgraded)
    }

    /// Makes `conn` the active connection. Rejects connections that cannot
    /// serve completions.
    pub fn use_connection(&self, conn: Connection) -> Result<(), AuthError> {
        if !self.is_usable(&conn) {
            return Err(AuthError::BadConnectionType {
                expected: self.accepted_kind(),
                actual: conn.kind.name(),
            });
        }

        let mut inner = self.inner();
        inner.enterprise = match &conn.kind {
            ConnectionKind::Sso { .. } => !conn.kind.is_builder_id(),
            ConnectionKind::Iam { .. } => false,
        };
        inner.active = Some(conn);
        self.publish(&inner);
        Ok(())
    }

    pub fn disconnect(&self) {
        let mut inner = self.inner();
        if inner.active.take().is_none() {
            return;
        }
        inner.enterprise = false;
        self.publish(&inner);
    }

    /// Applies a provider-originated state change. Transitional
    /// `Authenticating` states are recorded but not broadcast.
    pub fn set_connection_state(&self, id: &ConnectionId, state: ConnectionState) -> bool {
        let mut inner = self.inner();
        let Some(conn) = inner.active.as_mut().filter(|c| &c.id == id) else {
            return false;
        };
        if conn.state == state {
            return false;
        }
        conn.state = state;
        if state != ConnectionState::Authenticating {
            self.publish(&inner);
        }
        true
    }

    pub async fn bearer_token(&self) -> Result<String, AuthError> {
        let conn = self.active_connection().ok_or(AuthError::NoConnection)?;
        if !matches!(conn.kind, ConnectionKind::Sso { .. }) {
            return Err(AuthError::BadConnectionType {
                expected: "sso",
                actual: conn.kind.name(),
            });
        }
        Ok(self.provider.token(conn.id).await?)
    }

    pub async fn credentials(&self) -> Result<AwsCredentials, AuthError> {
        let conn = self.active_connection().ok_or(AuthError::NoConnection)?;
        if !matches!(conn.kind, ConnectionKind::Iam { .. }) {
            return Err(AuthError::BadConnectionType {
                expected: "iam",
                actual: conn.kind.name(),
            });
        }
        Ok(self.provider.credentials(conn.id).await?)
    }

    /// Whichever credential fits the active connection.
    pub async fn credential(&self) -> Result<Credential, AuthError> {
        let conn = self.active_connection().ok_or(AuthError::NoConnection)?;
        match conn.kind {
            ConnectionKind::Sso { .. } => self.bearer_token().await.map(Credential::BearerToken),
            ConnectionKind::Iam { .. } => self.credentials().await.map(Credential::Keys),
        }
    }

    pub async fn reauthenticate(&self) -> Result<(), AuthError> {
        if !self.is_expired() {
            return Ok(());
        }
        let conn = self.active_connection().ok_or(AuthError::NoConnection)?;
        let refreshed = self
            .provider
            .reauthenticate(conn.id)
            .await
            .map_err(|source| AuthError::ReauthenticationFailed { source })?;
        self.use_connection(refreshed)
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/services/auth.rs"]
mod tests;
