use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ropey::Rope;
use serde_json::json;
use whisperline::app::Workbench;
use whisperline::kernel::services::adapters::AsyncRuntime;
use whisperline::kernel::services::ports::auth::BUILDER_ID_REGION;
use whisperline::kernel::services::ports::{ConnectionProfile, ConnectionState, Settings};
use whisperline::kernel::services::{AuthError, AuthManager};
use whisperline::kernel::{Action, DocumentId, SelectionKind, TriggerPhase};

use super::editor::{Buffer, OpenDocument, ScriptEditor, SharedBuffer};
use super::fakes::{CannedClient, LocalAuthProvider};
use super::script::Step;

const RESPONSE_WAIT: Duration = Duration::from_secs(2);

/// Drives a [`Workbench`] from script steps on a virtual clock and writes
/// one JSON line per step.
pub struct ReplayHost<W: Write> {
    workbench: Workbench,
    runtime: Arc<AsyncRuntime>,
    client: Arc<CannedClient>,
    buffer: SharedBuffer,
    clock: Instant,
    out: W,
}

impl<W: Write> ReplayHost<W> {
    pub fn new(settings: Settings, out: W) -> std::io::Result<Self> {
        let runtime = Arc::new(AsyncRuntime::new()?);
        let client = Arc::new(CannedClient::default());
        let auth = Arc::new(AuthManager::new(
            Arc::new(LocalAuthProvider::default()),
            settings.allow_key_based_connections,
        ));
        let buffer: SharedBuffer = Rc::new(RefCell::new(Buffer::default()));
        let workbench = Workbench::new(
            settings,
            runtime.clone(),
            auth,
            client.clone(),
            Box::new(ScriptEditor::new(Rc::clone(&buffer))),
        );
        let clock = Instant::now();
        buffer.borrow_mut().clock = Some(clock);
        Ok(Self {
            workbench,
            runtime,
            client,
            buffer,
            clock,
            out,
        })
    }

    pub fn run(&mut self, steps: Vec<Step>) -> Result<(), super::ReplayError> {
        for (idx, step) in steps.into_iter().enumerate() {
            let name = step.name();
            tracing::debug!(step = idx, op = name, "replay step");
            self.apply(step)?;
            self.settle();
            // Picks up connection changes made by the step.
            self.workbench.tick_at(self.clock);
            self.settle();
            self.report(idx, name)?;
        }
        self.workbench.shutdown();
        Ok(())
    }

    fn apply(&mut self, step: Step) -> Result<(), AuthError> {
        match step {
            Step::Connect { start_url, region } => {
                let profile = match start_url {
                    Some(start_url) => ConnectionProfile::EnterpriseSso {
                        start_url,
                        region: region.unwrap_or_else(|| BUILDER_ID_REGION.to_string()),
                    },
                    None => ConnectionProfile::BuilderId,
                };
                let auth = Arc::clone(self.workbench.auth());
                self.runtime.block_on(auth.connect(profile))?;
            }
            Step::Disconnect => self.workbench.auth().disconnect(),
            Step::Expire => {
                if let Some(conn) = self.workbench.auth().active_connection() {
                    self.workbench
                        .auth()
                        .set_connection_state(&conn.id, ConnectionState::Expired);
                }
            }
            Step::Reauthenticate => {
                let auth = Arc::clone(self.workbench.auth());
                self.runtime.block_on(auth.reauthenticate())?;
            }
            Step::Open {
                uri,
                language,
                text,
                cursor,
            } => {
                let text = Rope::from_str(&text);
                let cursor = cursor.unwrap_or(text.len_chars()).min(text.len_chars());
                let doc = OpenDocument {
                    id: DocumentId::new(uri),
                    language_id: language,
                    text,
                    cursor,
                };
                let editor = doc.active_editor();
                self.buffer.borrow_mut().document = Some(doc);
                self.workbench
                    .dispatch(Action::ActiveEditorChanged(Some(editor)));
            }
            Step::Type { text } => {
                let events = self.with_document(|doc, now| {
                    vec![doc.insert(&text, now), doc.selection(SelectionKind::Keyboard)]
                });
                self.dispatch_all(events);
            }
            Step::Backspace { count } => {
                let events = self.with_document(|doc, now| {
                    let mut events: Vec<Action> = doc.backspace(count, now).into_iter().collect();
                    events.push(doc.selection(SelectionKind::Keyboard));
                    events
                });
                self.dispatch_all(events);
            }
            Step::MoveCursor { offset, mouse } => {
                let kind = if mouse {
                    SelectionKind::Mouse
                } else {
                    SelectionKind::Keyboard
                };
                let events = self.with_document(|doc, _| {
                    doc.cursor = offset.min(doc.text.len_chars());
                    vec![doc.selection(kind)]
                });
                self.dispatch_all(events);
            }
            Step::Wait { ms } => self.advance(Duration::from_millis(ms)),
            Step::Next => {
                self.workbench
                    .dispatch(Action::NavigateRecommendation { forward: true });
            }
            Step::Previous => {
                self.workbench
                    .dispatch(Action::NavigateRecommendation { forward: false });
            }
            Step::Accept => {
                self.workbench.dispatch(Action::AcceptRecommendation);
            }
            Step::Reject => {
                self.workbench.dispatch(Action::RejectRecommendation);
            }
            Step::Invoke => {
                let snapshot = self
                    .buffer
                    .borrow()
                    .document
                    .as_ref()
                    .map(OpenDocument::snapshot);
                if let Some(snapshot) = snapshot {
                    self.workbench.dispatch(Action::InvokeCompletion(snapshot));
                }
            }
            Step::Blur => {
                self.workbench
                    .dispatch(Action::WindowFocusChanged { focused: false });
            }
            Step::Focus => {
                self.workbench
                    .dispatch(Action::WindowFocusChanged { focused: true });
            }
            Step::Close => {
                let closed = self.buffer.borrow_mut().document.take();
                if let Some(doc) = closed {
                    self.workbench.dispatch(Action::DocumentClosed(doc.id));
                }
            }
            Step::Respond { suggestions } => self.client.push(suggestions),
        }
        Ok(())
    }

    fn with_document(
        &mut self,
        f: impl FnOnce(&mut OpenDocument, Instant) -> Vec<Action>,
    ) -> Vec<Action> {
        let now = self.clock;
        let mut buffer = self.buffer.borrow_mut();
        match buffer.document.as_mut() {
            Some(doc) => f(doc, now),
            None => Vec::new(),
        }
    }

    fn dispatch_all(&mut self, actions: Vec<Action>) {
        for action in actions {
            self.workbench.dispatch(action);
        }
    }

    /// Moves the virtual clock forward, firing every deadline on the way.
    fn advance(&mut self, by: Duration) {
        let target = self.clock + by;
        while let Some(deadline) = self.workbench.next_deadline().filter(|d| *d <= target) {
            self.set_clock(deadline.max(self.clock));
            self.workbench.tick_at(self.clock);
            self.settle();
        }
        self.set_clock(target);
        self.workbench.tick_at(self.clock);
    }

    fn set_clock(&mut self, now: Instant) {
        self.clock = now;
        self.buffer.borrow_mut().clock = Some(now);
    }

    /// Applies editor events and background results until nothing is left.
    fn settle(&mut self) {
        loop {
            let pending = std::mem::take(&mut self.buffer.borrow_mut().pending);
            if !pending.is_empty() {
                self.dispatch_all(pending);
                continue;
            }
            if self.workbench.poll_kernel_bus() {
                continue;
            }
            let in_flight = matches!(
                self.workbench.state().trigger.phase(),
                TriggerPhase::RequestInFlight(_)
            );
            if !in_flight || !self.workbench.wait_for_message(RESPONSE_WAIT) {
                break;
            }
        }
    }

    fn report(&mut self, step: usize, op: &str) -> std::io::Result<()> {
        let state = self.workbench.state();
        let phase = match state.trigger.phase() {
            TriggerPhase::Idle => "idle",
            TriggerPhase::Debouncing { .. } => "debouncing",
            TriggerPhase::RequestInFlight(_) => "in_flight",
        };
        let session = state.session.session().map(|s| {
            json!({
                "items": s.items.iter().map(|i| i.suggestion.content.as_str()).collect::<Vec<_>>(),
                "index": s.index,
                "typed": s.typed,
            })
        });
        let mut buffer = self.buffer.borrow_mut();
        let prompts: Vec<String> = buffer
            .prompts
            .drain(..)
            .map(|p| format!("{p:?}"))
            .collect();
        let document = buffer.document.as_ref().map(|doc| {
            json!({
                "uri": doc.id.as_str(),
                "text": doc.text.to_string(),
                "cursor": doc.cursor,
            })
        });
        let decisions: Vec<i64> = self
            .workbench
            .decisions()
            .iter()
            .map(|d| d.outcome.as_index())
            .collect();
        let line = json!({
            "step": step,
            "op": op,
            "phase": phase,
            "connected": state.auth.connected,
            "valid": state.auth.valid,
            "document": document,
            "session": session,
            "prompts": prompts,
            "decisions": decisions,
        });
        writeln!(self.out, "{line}")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/replay/host.rs"]
mod tests;
