use std::time::{Duration, Instant};

use crate::kernel::event::{ActiveEditor, DocumentId};
use crate::kernel::language::LanguageContext;
use crate::kernel::services::auth::ConnectionSnapshot;
use crate::kernel::services::ports::Settings;
use crate::kernel::session::SessionController;
use crate::kernel::trigger::TriggerController;

/// Connection facts the trigger controller needs, copied out of the auth
/// manager's snapshot on every change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthStatus {
    pub connected: bool,
    pub valid: bool,
    pub expired: bool,
    pub enterprise: bool,
}

impl From<&ConnectionSnapshot> for AuthStatus {
    fn from(snapshot: &ConnectionSnapshot) -> Self {
        Self {
            connected: snapshot.connection.is_some(),
            valid: snapshot.valid,
            expired: snapshot.expired,
            enterprise: snapshot.enterprise,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EditorFocus {
    pub active: Option<ActiveEditor>,
    pub window_focused: bool,
}

impl EditorFocus {
    pub fn active_document(&self) -> Option<&DocumentId> {
        self.active.as_ref().map(|editor| &editor.document)
    }
}

/// Prompts already shown for auto triggers during this connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptState {
    pub connect_shown: bool,
    pub reauthenticate_shown: bool,
}

#[derive(Debug)]
pub struct AppState {
    pub settings: Settings,
    pub languages: LanguageContext,
    pub auth: AuthStatus,
    pub editor: EditorFocus,
    pub trigger: TriggerController,
    pub session: SessionController,
    pub prompts: PromptState,
    pub last_user_modification: Option<Instant>,
    pub time_since_last_modification: Option<Duration>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let trigger = TriggerController::new(settings.settle_delay());
        Self {
            settings,
            languages: LanguageContext::default(),
            auth: AuthStatus::default(),
            editor: EditorFocus {
                active: None,
                window_focused: true,
            },
            trigger,
            session: SessionController::default(),
            prompts: PromptState::default(),
            last_user_modification: None,
            time_since_last_modification: None,
        }
    }

    pub fn with_languages(mut self, languages: LanguageContext) -> Self {
        self.languages = languages;
        self
    }
}
