use std::time::Instant;

mod request;

use super::action::{Action, CompletionOutcome};
use super::effect::Effect;
use super::event::{DocumentChange, DocumentId, DocumentSnapshot, SelectionChange, SelectionKind};
use super::services::ports::{Prompt, Settings, TriggerKind};
use super::session::TypeAhead;
use super::state::{AppState, AuthStatus, PromptState};
use super::trigger::{Suppression, TriggerGate};

pub struct DispatchResult {
    pub effects: Vec<Effect>,
    pub state_changed: bool,
}

impl DispatchResult {
    fn unchanged() -> Self {
        Self {
            effects: Vec::new(),
            state_changed: false,
        }
    }

    fn changed(state_changed: bool) -> Self {
        Self {
            effects: Vec::new(),
            state_changed,
        }
    }

    fn merge(&mut self, other: DispatchResult) {
        self.effects.extend(other.effects);
        self.state_changed |= other.state_changed;
    }
}

pub struct Store {
    state: AppState,
}

impl Store {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// When the host should tick next to fire a pending trigger.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.state.trigger.deadline()
    }

    pub fn dispatch(&mut self, action: Action) -> DispatchResult {
        match action {
            Action::DocumentChanged { change, now } => self.on_document_changed(change, now),
            Action::SelectionChanged(selection) => self.on_selection_changed(selection),
            Action::ActiveEditorChanged(editor) => {
                let changed = self.state.editor.active != editor;
                self.state.editor.active = editor;
                let mut result = self.teardown("active editor changed");
                result.state_changed |= changed;
                result
            }
            Action::WindowFocusChanged { focused } => {
                let changed = self.state.editor.window_focused != focused;
                self.state.editor.window_focused = focused;
                if focused {
                    return DispatchResult::changed(changed);
                }
                let mut result = self.teardown("window focus lost");
                result.state_changed |= changed;
                result
            }
            Action::DocumentClosed(document) => self.on_document_closed(document),
            Action::InvokeCompletion(snapshot) => self.on_invoke(snapshot),
            Action::Tick { now } => self.on_tick(now),
            Action::CompletionFinished { seq, outcome } => {
                self.on_completion_finished(seq, outcome)
            }
            Action::NavigateRecommendation { forward } => {
                DispatchResult::changed(self.state.session.navigate(forward))
            }
            Action::AcceptRecommendation => match self.state.session.accept() {
                Some((insert, decision)) => DispatchResult {
                    effects: vec![Effect::InsertText(insert), Effect::RecordDecision(decision)],
                    state_changed: true,
                },
                None => DispatchResult::unchanged(),
            },
            Action::AcceptEditApplied => {
                DispatchResult::changed(self.state.session.finish_accept_edit())
            }
            Action::RejectRecommendation => self.reject_session(),
            Action::ConnectionChanged(status) => self.on_connection_changed(status),
            Action::SettingsChanged(settings) => self.on_settings_changed(settings),
            Action::Shutdown => self.teardown("shutdown"),
        }
    }

    fn gate(&self) -> TriggerGate<'_> {
        TriggerGate {
            auto_trigger_enabled: self.state.settings.auto_trigger_enabled,
            active_document: self.state.editor.active_document(),
            editing: self.state.session.is_editing(),
            auth: self.state.auth,
            languages: &self.state.languages,
        }
    }

    fn reject_session(&mut self) -> DispatchResult {
        match self.state.session.reject() {
            Some(decision) => DispatchResult {
                effects: vec![Effect::RecordDecision(decision)],
                state_changed: true,
            },
            None => DispatchResult::unchanged(),
        }
    }

    /// Cancels any pending trigger and rejects the live session.
    fn teardown(&mut self, reason: &'static str) -> DispatchResult {
        let cancelled = self.state.trigger.cancel();
        if cancelled {
            tracing::debug!(reason, "completion trigger cancelled");
        }
        let mut result = self.reject_session();
        result.state_changed |= cancelled;
        result
    }

    fn note_user_modification(&mut self, now: Instant) {
        if let Some(prev) = self.state.last_user_modification {
            self.state.time_since_last_modification = Some(now.saturating_duration_since(prev));
        }
        self.state.last_user_modification = Some(now);
    }

    /// Prompt to surface for an auth suppression. Auto triggers show each
    /// prompt at most once until the connection becomes valid again.
    fn prompt_for(&mut self, reason: Suppression, trigger: TriggerKind) -> Option<Prompt> {
        let (prompt, shown) = match reason {
            Suppression::NoConnection => (Prompt::Connect, &mut self.state.prompts.connect_shown),
            Suppression::ConnectionExpired => (
                Prompt::Reauthenticate,
                &mut self.state.prompts.reauthenticate_shown,
            ),
            _ => return None,
        };
        if trigger == TriggerKind::Auto {
            if *shown {
                return None;
            }
            *shown = true;
        }
        Some(prompt)
    }

    fn on_document_changed(&mut self, change: DocumentChange, now: Instant) -> DispatchResult {
        if self.state.session.observe_accept_edit(&change) {
            tracing::trace!(document = %change.document(), "accepted suggestion applied");
            return DispatchResult::changed(true);
        }
        if let Some(reason) = self.gate().edit_suppression(&change) {
            tracing::trace!(?reason, document = %change.document(), "document change ignored");
            if reason == Suppression::DeletionOnly {
                self.note_user_modification(now);
                return self.teardown("deletion");
            }
            return DispatchResult::unchanged();
        }
        self.note_user_modification(now);

        let mut result = DispatchResult::unchanged();
        if self.state.session.session().is_some() {
            let expected = self.state.session.session().map(|s| s.expected_cursor());
            let outcome = match change.single_insertion() {
                Some((offset, text)) if Some(offset) == expected => {
                    self.state.session.type_ahead(text)
                }
                _ => TypeAhead::Diverged,
            };
            if outcome == TypeAhead::Matched {
                return DispatchResult::changed(true);
            }
            result = self.reject_session();
        }

        if let Some(reason) = self.gate().trigger_suppression(&change.snapshot.language_id) {
            tracing::trace!(?reason, document = %change.document(), "auto trigger suppressed");
            result.state_changed |= self.state.trigger.cancel();
            if let Some(prompt) = self.prompt_for(reason, TriggerKind::Auto) {
                result.effects.push(Effect::Prompt(prompt));
            }
            return result;
        }

        self.state.trigger.schedule(change.snapshot, now);
        result.state_changed = true;
        result
    }

    fn on_selection_changed(&mut self, selection: SelectionChange) -> DispatchResult {
        if self.state.session.is_editing() {
            return DispatchResult::unchanged();
        }
        if selection.kind == SelectionKind::Mouse {
            return self.teardown("mouse selection");
        }

        let mut result = DispatchResult::unchanged();
        let trigger_moved = self.state.trigger.document() == Some(&selection.document)
            && self.state.trigger.cursor() != Some(selection.cursor);
        if trigger_moved {
            result.state_changed |= self.state.trigger.cancel();
        }

        let session_moved = self.state.session.session().is_some_and(|s| {
            s.document == selection.document && s.expected_cursor() != selection.cursor
        });
        if session_moved {
            result.merge(self.reject_session());
        }
        result
    }

    fn on_document_closed(&mut self, document: DocumentId) -> DispatchResult {
        let mut result = DispatchResult::unchanged();
        if self.state.editor.active_document() == Some(&document) {
            self.state.editor.active = None;
            result.state_changed = true;
        }
        if self.state.trigger.document() == Some(&document) {
            result.state_changed |= self.state.trigger.cancel();
        }
        if self
            .state
            .session
            .session()
            .is_some_and(|s| s.document == document)
        {
            result.merge(self.reject_session());
        }
        result
    }

    fn on_invoke(&mut self, snapshot: DocumentSnapshot) -> DispatchResult {
        if !self.state.languages.is_supported(&snapshot.language_id) {
            tracing::debug!(
                language = %snapshot.language_id,
                "manual trigger on unsupported language"
            );
            return DispatchResult::unchanged();
        }

        let mut result = self.reject_session();
        result.state_changed |= self.state.trigger.cancel();

        if let Some(reason) = self.gate().auth_suppression() {
            if let Some(prompt) = self.prompt_for(reason, TriggerKind::Manual) {
                result.effects.push(Effect::Prompt(prompt));
            }
            return result;
        }

        let seq = self.state.trigger.begin_request(&snapshot);
        let request = request::build_request(
            &snapshot,
            &self.state.languages,
            &self.state.settings,
            TriggerKind::Manual,
            None,
        );
        tracing::debug!(
            seq,
            language = %request.file_context.language,
            "manual completion request"
        );
        result.effects.push(Effect::RequestCompletion { seq, request });
        result.state_changed = true;
        result
    }

    fn on_tick(&mut self, now: Instant) -> DispatchResult {
        let was_debouncing = self.state.trigger.deadline().is_some();
        let visible = self.state.session.is_visible();
        let Some((seq, snapshot)) = self.state.trigger.poll(now, visible) else {
            return DispatchResult::changed(
                was_debouncing && self.state.trigger.deadline().is_none(),
            );
        };

        // Validity may have changed during the settle delay.
        if let Some(reason) = self.gate().auth_suppression() {
            tracing::debug!(seq, ?reason, "completion request dropped before sending");
            self.state.trigger.cancel();
            return DispatchResult::changed(true);
        }

        self.state.session.clear();
        let request = request::build_request(
            &snapshot,
            &self.state.languages,
            &self.state.settings,
            TriggerKind::Auto,
            self.state.time_since_last_modification,
        );
        tracing::debug!(
            seq,
            language = %request.file_context.language,
            cursor = request.file_context.cursor,
            "auto completion request"
        );
        DispatchResult {
            effects: vec![Effect::RequestCompletion { seq, request }],
            state_changed: true,
        }
    }

    fn on_completion_finished(&mut self, seq: u64, outcome: CompletionOutcome) -> DispatchResult {
        let Some(inflight) = self.state.trigger.complete(seq) else {
            tracing::debug!(seq, "stale completion response dropped");
            return DispatchResult::unchanged();
        };

        match outcome {
            CompletionOutcome::Failed(error) => {
                tracing::warn!(seq, %error, "completion request failed");
            }
            CompletionOutcome::Suggestions(suggestions) => {
                let count = suggestions.len();
                let shown =
                    self.state
                        .session
                        .show(seq, inflight.document, inflight.cursor, suggestions);
                tracing::debug!(seq, count, shown, "completion response");
            }
        }
        DispatchResult::changed(true)
    }

    fn on_connection_changed(&mut self, status: AuthStatus) -> DispatchResult {
        let changed = self.state.auth != status;
        self.state.auth = status;
        if status.valid {
            self.state.prompts = PromptState::default();
            return DispatchResult::changed(changed);
        }
        // Nothing may be sent without a valid connection.
        let cancelled = self.state.trigger.cancel();
        DispatchResult::changed(changed || cancelled)
    }

    fn on_settings_changed(&mut self, settings: Settings) -> DispatchResult {
        if settings == self.state.settings {
            return DispatchResult::unchanged();
        }
        self.state.trigger.set_settle_delay(settings.settle_delay());
        if !settings.auto_trigger_enabled && self.state.trigger.deadline().is_some() {
            self.state.trigger.cancel();
        }
        self.state.settings = settings;
        DispatchResult::changed(true)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/store.rs"]
mod tests;
