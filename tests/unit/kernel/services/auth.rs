use super::*;
use crate::kernel::services::ports::auth::{BUILDER_ID_REGION, BUILDER_ID_START_URL};
use futures::executor::block_on;
use futures::future::BoxFuture;
use futures::FutureExt;

#[derive(Default)]
struct FakeProvider {
    connections: Mutex<Vec<Connection>>,
    deleted: Mutex<Vec<ConnectionId>>,
    fail_reauth: bool,
}

impl FakeProvider {
    fn with(connections: Vec<Connection>) -> Self {
        Self {
            connections: Mutex::new(connections),
            ..Default::default()
        }
    }
}

fn sso(id: &str, start_url: &str, scopes: &[&str]) -> Connection {
    Connection {
        id: ConnectionId::new(id),
        label: id.to_string(),
        kind: ConnectionKind::Sso {
            start_url: start_url.to_string(),
            region: BUILDER_ID_REGION.to_string(),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
        },
        state: ConnectionState::Valid,
    }
}

fn iam(id: &str, profile: &str) -> Connection {
    Connection {
        id: ConnectionId::new(id),
        label: id.to_string(),
        kind: ConnectionKind::Iam {
            profile: profile.to_string(),
        },
        state: ConnectionState::Valid,
    }
}

impl AuthProvider for FakeProvider {
    fn list_connections(&self) -> BoxFuture<'_, Result<Vec<Connection>, AuthProviderError>> {
        let list = self.connections.lock().unwrap().clone();
        async move { Ok(list) }.boxed()
    }

    fn create_connection(
        &self,
        profile: ConnectionProfile,
    ) -> BoxFuture<'_, Result<Connection, AuthProviderError>> {
        let mut list = self.connections.lock().unwrap();
        let id = format!("created-{}", list.len());
        let conn = match profile {
            ConnectionProfile::BuilderId => sso(&id, BUILDER_ID_START_URL, COMPLETION_SCOPES),
            ConnectionProfile::EnterpriseSso { start_url, .. } => {
                sso(&id, &start_url, COMPLETION_SCOPES)
            }
            ConnectionProfile::Iam { profile } => iam(&id, &profile),
        };
        list.push(conn.clone());
        async move { Ok(conn) }.boxed()
    }

    fn delete_connection(&self, id: ConnectionId) -> BoxFuture<'_, Result<(), AuthProviderError>> {
        self.connections.lock().unwrap().retain(|c| c.id != id);
        self.deleted.lock().unwrap().push(id);
        async { Ok(()) }.boxed()
    }

    fn reauthenticate(
        &self,
        id: ConnectionId,
    ) -> BoxFuture<'_, Result<Connection, AuthProviderError>> {
        let result = if self.fail_reauth {
            Err(AuthProviderError::Failed("browser flow cancelled".to_string()))
        } else {
            self.connections
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.id == id)
                .cloned()
                .map(|mut c| {
                    c.state = ConnectionState::Valid;
                    c
                })
                .ok_or(AuthProviderError::NotFound(id))
        };
        async move { result }.boxed()
    }

    fn token(&self, id: ConnectionId) -> BoxFuture<'_, Result<String, AuthProviderError>> {
        async move { Ok(format!("token-for-{id}")) }.boxed()
    }

    fn credentials(
        &self,
        _id: ConnectionId,
    ) -> BoxFuture<'_, Result<AwsCredentials, AuthProviderError>> {
        async {
            Ok(AwsCredentials {
                access_key_id: "AKID".to_string(),
                secret_access_key: "secret".to_string(),
                session_token: None,
            })
        }
        .boxed()
    }
}

fn manager(provider: FakeProvider, allow_key_based: bool) -> (Arc<FakeProvider>, AuthManager) {
    let provider = Arc::new(provider);
    let manager = AuthManager::new(provider.clone(), allow_key_based);
    (provider, manager)
}

#[test]
fn no_connection_errors_before_connect() {
    let (_, auth) = manager(FakeProvider::default(), false);
    assert!(auth.active_connection().is_none());
    assert!(!auth.is_valid());
    assert!(matches!(
        block_on(auth.bearer_token()),
        Err(AuthError::NoConnection)
    ));
    assert!(matches!(
        block_on(auth.credential()),
        Err(AuthError::NoConnection)
    ));
}

#[test]
fn builder_id_connect_creates_connection_and_notifies() {
    let (_, auth) = manager(FakeProvider::default(), false);
    let mut rx = auth.subscribe();

    let conn = block_on(auth.connect(ConnectionProfile::BuilderId)).unwrap();
    assert!(conn.kind.is_builder_id());
    assert!(auth.is_valid());
    assert!(!auth.is_enterprise_sso_in_use());

    assert!(rx.has_changed().unwrap());
    let snapshot = rx.borrow_and_update().clone();
    assert_eq!(snapshot.connection.as_ref(), Some(&conn));
    assert!(snapshot.valid);
    assert!(!snapshot.enterprise);
}

#[test]
fn existing_scoped_connection_is_reused() {
    let existing = sso("saved", BUILDER_ID_START_URL, COMPLETION_SCOPES);
    let (provider, auth) = manager(FakeProvider::with(vec![existing.clone()]), false);

    let conn = block_on(auth.connect(ConnectionProfile::BuilderId)).unwrap();
    assert_eq!(conn, existing);
    assert_eq!(provider.connections.lock().unwrap().len(), 1);
}

#[test]
fn unscoped_sso_connection_is_rescoped() {
    let existing = sso("old", "https://Example.awsapps.com/start", &["sso:account:access"]);
    let (provider, auth) = manager(FakeProvider::with(vec![existing]), false);

    let conn = block_on(auth.connect(ConnectionProfile::EnterpriseSso {
        start_url: "https://example.awsapps.com/start".to_string(),
        region: "eu-west-1".to_string(),
    }))
    .unwrap();

    assert!(conn.kind.has_scopes(COMPLETION_SCOPES));
    assert_eq!(
        provider.deleted.lock().unwrap().as_slice(),
        &[ConnectionId::new("old")]
    );
    assert!(auth.is_enterprise_sso_in_use());
}

#[test]
fn key_based_connection_rejected_unless_allowed() {
    let (_, auth) = manager(FakeProvider::with(vec![iam("keys", "default")]), false);
    let err = block_on(auth.connect(ConnectionProfile::Iam {
        profile: "default".to_string(),
    }))
    .unwrap_err();
    assert!(matches!(
        err,
        AuthError::BadConnectionType { actual: "iam", .. }
    ));
}

#[test]
fn key_based_connection_uses_credentials() {
    let (_, auth) = manager(FakeProvider::with(vec![iam("keys", "default")]), true);
    block_on(auth.connect(ConnectionProfile::Iam {
        profile: "default".to_string(),
    }))
    .unwrap();

    assert!(!auth.is_enterprise_sso_in_use());
    assert!(matches!(
        block_on(auth.bearer_token()),
        Err(AuthError::BadConnectionType {
            expected: "sso",
            actual: "iam"
        })
    ));
    assert!(matches!(
        block_on(auth.credential()),
        Ok(Credential::Keys(_))
    ));
}

#[test]
fn missing_key_profile_is_no_connection() {
    let (_, auth) = manager(FakeProvider::default(), true);
    let err = block_on(auth.connect(ConnectionProfile::Iam {
        profile: "missing".to_string(),
    }))
    .unwrap_err();
    assert!(matches!(err, AuthError::NoConnection));
}

#[test]
fn token_connection_rejects_credentials_request() {
    let (_, auth) = manager(FakeProvider::default(), false);
    block_on(auth.connect(ConnectionProfile::BuilderId)).unwrap();
    assert!(matches!(
        block_on(auth.credentials()),
        Err(AuthError::BadConnectionType {
            expected: "iam",
            actual: "sso"
        })
    ));
    let token = block_on(auth.bearer_token()).unwrap();
    assert!(token.starts_with("token-for-"));
}

#[test]
fn expiry_is_broadcast_and_reauthenticate_restores() {
    let (_, auth) = manager(FakeProvider::default(), false);
    let conn = block_on(auth.connect(ConnectionProfile::BuilderId)).unwrap();
    let mut rx = auth.subscribe();

    assert!(auth.set_connection_state(&conn.id, ConnectionState::Expired));
    assert!(auth.is_expired());
    assert!(!auth.is_valid());
    let snapshot = rx.borrow_and_update().clone();
    assert!(snapshot.expired);
    assert!(!snapshot.valid);

    block_on(auth.reauthenticate()).unwrap();
    assert!(auth.is_valid());
    assert!(rx.borrow_and_update().valid);
}

#[test]
fn authenticating_state_is_not_broadcast() {
    let (_, auth) = manager(FakeProvider::default(), false);
    let conn = block_on(auth.connect(ConnectionProfile::BuilderId)).unwrap();
    let mut rx = auth.subscribe();
    rx.borrow_and_update();

    assert!(auth.set_connection_state(&conn.id, ConnectionState::Authenticating));
    assert!(!rx.has_changed().unwrap());
    assert!(!auth.set_connection_state(&ConnectionId::new("other"), ConnectionState::Expired));
}

#[test]
fn failed_reauthentication_is_chained() {
    let provider = FakeProvider {
        fail_reauth: true,
        ..Default::default()
    };
    let (_, auth) = manager(provider, false);
    let conn = block_on(auth.connect(ConnectionProfile::BuilderId)).unwrap();
    auth.set_connection_state(&conn.id, ConnectionState::Expired);

    let err = block_on(auth.reauthenticate()).unwrap_err();
    assert!(matches!(err, AuthError::ReauthenticationFailed { .. }));
    let source = std::error::Error::source(&err).map(|s| s.to_string());
    assert_eq!(source.as_deref(), Some("browser flow cancelled"));
}

#[test]
fn reauthenticate_is_noop_when_not_expired() {
    let provider = FakeProvider {
        fail_reauth: true,
        ..Default::default()
    };
    let (_, auth) = manager(provider, false);
    block_on(auth.connect(ConnectionProfile::BuilderId)).unwrap();
    assert!(block_on(auth.reauthenticate()).is_ok());
}

#[test]
fn disconnect_clears_and_notifies_once() {
    let (_, auth) = manager(FakeProvider::default(), false);
    block_on(auth.connect(ConnectionProfile::BuilderId)).unwrap();
    let mut rx = auth.subscribe();
    rx.borrow_and_update();

    auth.disconnect();
    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), ConnectionSnapshot::default());

    auth.disconnect();
    assert!(!rx.has_changed().unwrap());
}
