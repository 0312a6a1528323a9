//! Single-document editor the replay drives. Edits made on the kernel's
//! behalf are queued as editor events, the way a real host reports them.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use ropey::Rope;
use whisperline::kernel::services::ports::{EditorError, EditorPort, Prompt};
use whisperline::kernel::{
    Action, ActiveEditor, ChangeOrigin, DocumentChange, DocumentId, DocumentSnapshot,
    SelectionChange, SelectionKind, TextChange,
};

pub struct OpenDocument {
    pub id: DocumentId,
    pub language_id: String,
    pub text: Rope,
    pub cursor: usize,
}

impl OpenDocument {
    pub fn snapshot(&self) -> DocumentSnapshot {
        let filename = self
            .id
            .as_str()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        DocumentSnapshot {
            document: self.id.clone(),
            language_id: self.language_id.clone(),
            filename,
            text: self.text.clone(),
            cursor: self.cursor,
        }
    }

    pub fn active_editor(&self) -> ActiveEditor {
        ActiveEditor {
            document: self.id.clone(),
            language_id: self.language_id.clone(),
        }
    }

    /// Inserts at the cursor and returns the change event.
    pub fn insert(&mut self, text: &str, now: Instant) -> Action {
        let offset = self.cursor;
        self.text.insert(offset, text);
        self.cursor += text.chars().count();
        Action::DocumentChanged {
            change: DocumentChange {
                snapshot: self.snapshot(),
                changes: vec![TextChange::insert(offset, text)],
                origin: ChangeOrigin::User,
            },
            now,
        }
    }

    /// Deletes up to `count` chars before the cursor.
    pub fn backspace(&mut self, count: usize, now: Instant) -> Option<Action> {
        let count = count.min(self.cursor);
        if count == 0 {
            return None;
        }
        let start = self.cursor - count;
        self.text.remove(start..self.cursor);
        self.cursor = start;
        Some(Action::DocumentChanged {
            change: DocumentChange {
                snapshot: self.snapshot(),
                changes: vec![TextChange::delete(start, count)],
                origin: ChangeOrigin::User,
            },
            now,
        })
    }

    pub fn selection(&self, kind: SelectionKind) -> Action {
        Action::SelectionChanged(SelectionChange {
            document: self.id.clone(),
            cursor: self.cursor,
            kind,
        })
    }
}

#[derive(Default)]
pub struct Buffer {
    pub document: Option<OpenDocument>,
    /// Events produced by kernel-initiated edits, not yet dispatched.
    pub pending: Vec<Action>,
    pub prompts: Vec<Prompt>,
    pub clock: Option<Instant>,
}

pub type SharedBuffer = Rc<RefCell<Buffer>>;

pub struct ScriptEditor {
    buffer: SharedBuffer,
}

impl ScriptEditor {
    pub fn new(buffer: SharedBuffer) -> Self {
        Self { buffer }
    }
}

impl EditorPort for ScriptEditor {
    fn insert_text(
        &mut self,
        document: &DocumentId,
        offset: usize,
        text: &str,
    ) -> Result<(), EditorError> {
        let mut buffer = self.buffer.borrow_mut();
        let now = buffer.clock.unwrap_or_else(Instant::now);
        let Some(doc) = buffer.document.as_mut().filter(|d| &d.id == document) else {
            return Err(EditorError::DocumentNotOpen(document.clone()));
        };
        if offset > doc.text.len_chars() {
            return Err(EditorError::OutOfBounds {
                document: document.clone(),
                offset,
            });
        }

        doc.cursor = offset;
        let change = doc.insert(text, now);
        let selection = doc.selection(SelectionKind::Command);
        buffer.pending.push(change);
        buffer.pending.push(selection);
        Ok(())
    }

    fn show_prompt(&mut self, prompt: Prompt) {
        tracing::info!(?prompt, "prompt shown");
        self.buffer.borrow_mut().prompts.push(prompt);
    }
}
