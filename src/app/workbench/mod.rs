//! Workbench: owns the store and runs its effects.
//!
//! The host forwards editor events with [`Workbench::dispatch`] and calls
//! [`Workbench::tick`] from its event loop, at least as often as
//! [`Workbench::next_deadline`] asks for. Background completion requests
//! report back over the kernel bus and are applied on the next tick.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use tokio::sync::watch;

use crate::kernel::services::ports::{AsyncExecutor, CompletionClient, EditorPort, Settings};
use crate::kernel::services::{
    AuthManager, CompletionPipeline, ConnectionSnapshot, KernelServiceContext, KernelServiceHost,
};
use crate::kernel::{Action, AppState, AuthStatus, LanguageContext, Store, UserDecision};

mod bridge;
mod tick;

const SETTINGS_CHECK_INTERVAL: Duration = Duration::from_millis(500);
const MAX_KERNEL_BUS_DRAIN_PER_TICK: usize = 256;

pub struct Workbench {
    store: Store,
    kernel_services: KernelServiceHost,
    auth: Arc<AuthManager>,
    auth_rx: watch::Receiver<ConnectionSnapshot>,
    pipeline: Arc<CompletionPipeline>,
    editor: Box<dyn EditorPort>,
    decisions: VecDeque<UserDecision>,
    settings_path: Option<PathBuf>,
    last_settings_check: Option<Instant>,
    last_settings_modified: Option<SystemTime>,
}

impl Workbench {
    pub fn new(
        settings: Settings,
        executor: Arc<dyn AsyncExecutor>,
        auth: Arc<AuthManager>,
        client: Arc<dyn CompletionClient>,
        editor: Box<dyn EditorPort>,
    ) -> Self {
        Self::with_languages(
            settings,
            LanguageContext::default(),
            executor,
            auth,
            client,
            editor,
        )
    }

    pub fn with_languages(
        settings: Settings,
        languages: LanguageContext,
        executor: Arc<dyn AsyncExecutor>,
        auth: Arc<AuthManager>,
        client: Arc<dyn CompletionClient>,
        editor: Box<dyn EditorPort>,
    ) -> Self {
        let mut auth_rx = auth.subscribe();
        let initial = AuthStatus::from(&*auth_rx.borrow_and_update());
        let pipeline = Arc::new(CompletionPipeline::new(client, Arc::clone(&auth)));

        let store = Store::new(AppState::new(settings).with_languages(languages));

        let mut workbench = Self {
            store,
            kernel_services: KernelServiceHost::new(executor),
            auth,
            auth_rx,
            pipeline,
            editor,
            decisions: VecDeque::new(),
            settings_path: None,
            last_settings_check: None,
            last_settings_modified: None,
        };
        workbench.dispatch(Action::ConnectionChanged(initial));
        workbench
    }

    /// Watches `path` and applies edits to it on tick.
    pub fn watch_settings(&mut self, path: PathBuf) {
        self.last_settings_modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok();
        self.last_settings_check = None;
        self.settings_path = Some(path);
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    pub fn auth(&self) -> &Arc<AuthManager> {
        &self.auth
    }

    pub fn context(&self) -> KernelServiceContext {
        self.kernel_services.context()
    }

    /// Accept/reject decisions, oldest first, bounded by
    /// `decision_history_limit`.
    pub fn decisions(&self) -> &VecDeque<UserDecision> {
        &self.decisions
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.store.next_deadline()
    }

    pub fn shutdown(&mut self) -> bool {
        self.dispatch(Action::Shutdown)
    }
}
