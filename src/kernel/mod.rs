//! Headless completion core (state/action/effect).
//!
//! Editor events come in as [`Action`]s, the [`Store`] reduces them and
//! returns [`Effect`]s for the host to run. Nothing in here blocks or
//! touches the network.

pub mod action;
pub mod effect;
pub mod event;
pub mod language;
pub mod services;
pub mod session;
pub mod state;
pub mod store;
pub mod trigger;

pub use action::{Action, CompletionOutcome};
pub use effect::Effect;
pub use event::{
    ActiveEditor, ChangeOrigin, DocumentChange, DocumentId, DocumentSnapshot, SelectionChange,
    SelectionKind, TextChange,
};
pub use language::{CompletionLanguage, LanguageContext};
pub use session::{DecisionOutcome, PendingInsert, RecommendationSession, UserDecision};
pub use state::{AppState, AuthStatus};
pub use store::{DispatchResult, Store};
pub use trigger::{Suppression, TriggerPhase};
