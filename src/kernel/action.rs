use std::time::Instant;

use crate::kernel::event::{
    ActiveEditor, DocumentChange, DocumentId, DocumentSnapshot, SelectionChange,
};
use crate::kernel::services::ports::{Settings, Suggestion};
use crate::kernel::state::AuthStatus;

#[derive(Debug, Clone)]
pub enum CompletionOutcome {
    Suggestions(Vec<Suggestion>),
    Failed(String),
}

#[derive(Debug, Clone)]
pub enum Action {
    DocumentChanged {
        change: DocumentChange,
        now: Instant,
    },
    SelectionChanged(SelectionChange),
    ActiveEditorChanged(Option<ActiveEditor>),
    WindowFocusChanged {
        focused: bool,
    },
    DocumentClosed(DocumentId),
    /// Manual invocation from a command or keybinding.
    InvokeCompletion(DocumentSnapshot),
    Tick {
        now: Instant,
    },
    CompletionFinished {
        seq: u64,
        outcome: CompletionOutcome,
    },
    NavigateRecommendation {
        forward: bool,
    },
    AcceptRecommendation,
    AcceptEditApplied,
    RejectRecommendation,
    ConnectionChanged(AuthStatus),
    SettingsChanged(Settings),
    Shutdown,
}
