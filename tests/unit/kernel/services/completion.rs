use super::*;
use crate::kernel::language::CompletionLanguage;
use crate::kernel::services::ports::auth::{
    BUILDER_ID_REGION, BUILDER_ID_START_URL, COMPLETION_SCOPES,
};
use crate::kernel::services::ports::{
    AuthProvider, AuthProviderError, AwsCredentials, CodeReference, Connection, ConnectionId,
    ConnectionKind, ConnectionProfile, ConnectionState, Credential, FileContext, TriggerKind,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Mutex;

struct TokenProvider;

impl AuthProvider for TokenProvider {
    fn list_connections(&self) -> BoxFuture<'_, Result<Vec<Connection>, AuthProviderError>> {
        async { Ok(Vec::new()) }.boxed()
    }

    fn create_connection(
        &self,
        _profile: ConnectionProfile,
    ) -> BoxFuture<'_, Result<Connection, AuthProviderError>> {
        async { Err(AuthProviderError::Failed("unsupported".to_string())) }.boxed()
    }

    fn delete_connection(&self, _id: ConnectionId) -> BoxFuture<'_, Result<(), AuthProviderError>> {
        async { Ok(()) }.boxed()
    }

    fn reauthenticate(
        &self,
        id: ConnectionId,
    ) -> BoxFuture<'_, Result<Connection, AuthProviderError>> {
        async move { Err(AuthProviderError::NotFound(id)) }.boxed()
    }

    fn token(&self, id: ConnectionId) -> BoxFuture<'_, Result<String, AuthProviderError>> {
        async move { Ok(format!("token-{id}")) }.boxed()
    }

    fn credentials(
        &self,
        id: ConnectionId,
    ) -> BoxFuture<'_, Result<AwsCredentials, AuthProviderError>> {
        async move { Err(AuthProviderError::ProfileNotFound(id.0)) }.boxed()
    }
}

enum Reply {
    Items(Vec<Suggestion>),
    Error(ClientError),
    Hang,
}

struct ScriptedClient {
    reply: Reply,
    seen: Mutex<Vec<(CompletionRequest, Credential)>>,
}

impl ScriptedClient {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            seen: Mutex::new(Vec::new()),
        })
    }
}

impl CompletionClient for ScriptedClient {
    fn generate(
        &self,
        request: CompletionRequest,
        credential: Credential,
    ) -> BoxFuture<'_, Result<Vec<Suggestion>, ClientError>> {
        self.seen.lock().unwrap().push((request, credential));
        match &self.reply {
            Reply::Items(items) => {
                let items = items.clone();
                async move { Ok(items) }.boxed()
            }
            Reply::Error(err) => {
                let err = err.clone();
                async move { Err(err) }.boxed()
            }
            Reply::Hang => async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(Vec::new())
            }
            .boxed(),
        }
    }
}

fn connected_auth() -> Arc<AuthManager> {
    let auth = Arc::new(AuthManager::new(Arc::new(TokenProvider), false));
    auth.use_connection(Connection {
        id: ConnectionId::new("builder"),
        label: "Builder ID".to_string(),
        kind: ConnectionKind::Sso {
            start_url: BUILDER_ID_START_URL.to_string(),
            region: BUILDER_ID_REGION.to_string(),
            scopes: COMPLETION_SCOPES.iter().map(|s| s.to_string()).collect(),
        },
        state: ConnectionState::Valid,
    })
    .unwrap();
    auth
}

fn request() -> CompletionRequest {
    CompletionRequest {
        file_context: FileContext {
            filename: "main.py".to_string(),
            language: CompletionLanguage::Python,
            left_content: "def ".to_string(),
            right_content: String::new(),
            cursor: 4,
        },
        max_results: 5,
        trigger: TriggerKind::Auto,
        time_since_last_modification: None,
    }
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
        .block_on(future)
}

fn referenced(content: &str) -> Suggestion {
    Suggestion {
        content: content.to_string(),
        references: vec![CodeReference {
            license: Some("MIT".to_string()),
            repository: Some("example/repo".to_string()),
            ..Default::default()
        }],
    }
}

#[test]
fn passes_bearer_token_and_returns_suggestions() {
    let client = ScriptedClient::new(Reply::Items(vec![Suggestion::new("main():")]));
    let pipeline = CompletionPipeline::new(client.clone(), connected_auth());

    let items =
        block_on(pipeline.request_completions(request(), RequestOptions::default())).unwrap();
    assert_eq!(items, vec![Suggestion::new("main():")]);

    let seen = client.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, request());
    assert!(matches!(&seen[0].1, Credential::BearerToken(token) if token == "token-builder"));
}

#[test]
fn missing_connection_never_reaches_client() {
    let client = ScriptedClient::new(Reply::Items(vec![Suggestion::new("x")]));
    let auth = Arc::new(AuthManager::new(Arc::new(TokenProvider), false));
    let pipeline = CompletionPipeline::new(client.clone(), auth);

    let err = block_on(pipeline.request_completions(request(), RequestOptions::default()))
        .unwrap_err();
    assert!(matches!(err, CompletionError::NoConnection));
    assert!(client.seen.lock().unwrap().is_empty());
}

#[test]
fn client_error_maps_to_request_failed() {
    let client = ScriptedClient::new(Reply::Error(ClientError::Throttled));
    let pipeline = CompletionPipeline::new(client, connected_auth());
    let err = block_on(pipeline.request_completions(request(), RequestOptions::default()))
        .unwrap_err();
    assert!(matches!(err, CompletionError::RequestFailed(msg) if msg.contains("throttled")));
}

#[test]
fn slow_client_times_out() {
    let client = ScriptedClient::new(Reply::Hang);
    let pipeline = CompletionPipeline::new(client, connected_auth());
    let options = RequestOptions {
        timeout: Duration::from_millis(20),
        include_references: true,
    };
    let err = block_on(pipeline.request_completions(request(), options)).unwrap_err();
    assert!(matches!(err, CompletionError::RequestFailed(msg) if msg.contains("timed out")));
}

#[test]
fn reference_filter_drops_only_referenced_items() {
    let reply = vec![referenced("a"), Suggestion::new("b"), referenced("c")];

    let pipeline = CompletionPipeline::new(
        ScriptedClient::new(Reply::Items(reply.clone())),
        connected_auth(),
    );
    let options = RequestOptions {
        include_references: false,
        ..RequestOptions::default()
    };
    let items = block_on(pipeline.request_completions(request(), options)).unwrap();
    assert_eq!(items, vec![Suggestion::new("b")]);

    let pipeline = CompletionPipeline::new(
        ScriptedClient::new(Reply::Items(reply.clone())),
        connected_auth(),
    );
    let items =
        block_on(pipeline.request_completions(request(), RequestOptions::default())).unwrap();
    assert_eq!(items, reply);
}

#[test]
fn auth_errors_keep_their_kind() {
    let err = CompletionError::from(AuthError::BadConnectionType {
        expected: "sso",
        actual: "iam",
    });
    assert!(matches!(
        err,
        CompletionError::BadConnectionType {
            expected: "sso",
            actual: "iam"
        }
    ));
    assert!(matches!(
        CompletionError::from(AuthError::NoConnection),
        CompletionError::NoConnection
    ));
}
