//! Editor events consumed by the kernel.
//!
//! Offsets are char offsets into the document, matching `ropey`.

use compact_str::CompactString;
use ropey::Rope;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct DocumentId(CompactString);

impl DocumentId {
    pub fn new(id: impl Into<CompactString>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a document change: `removed` chars starting at `offset` were
/// replaced by `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    pub offset: usize,
    pub removed: usize,
    pub text: String,
}

impl TextChange {
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self {
            offset,
            removed: 0,
            text: text.into(),
        }
    }

    pub fn delete(offset: usize, removed: usize) -> Self {
        Self {
            offset,
            removed,
            text: String::new(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.removed == 0 && self.text.is_empty()
    }

    pub fn is_deletion(&self) -> bool {
        self.removed > 0 && self.text.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    User,
    UndoRedo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    Keyboard,
    Mouse,
    Command,
}

/// Document state right after an edit, or at a manual invocation.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub document: DocumentId,
    pub language_id: String,
    pub filename: String,
    pub text: Rope,
    pub cursor: usize,
}

#[derive(Debug, Clone)]
pub struct DocumentChange {
    pub snapshot: DocumentSnapshot,
    pub changes: Vec<TextChange>,
    pub origin: ChangeOrigin,
}

impl DocumentChange {
    pub fn document(&self) -> &DocumentId {
        &self.snapshot.document
    }

    pub fn is_empty_delta(&self) -> bool {
        self.changes.iter().all(TextChange::is_noop)
    }

    pub fn is_deletion_only(&self) -> bool {
        !self.is_empty_delta()
            && self
                .changes
                .iter()
                .all(|change| change.is_noop() || change.is_deletion())
    }

    /// Text typed at a single point, if the change is a plain insertion.
    pub fn single_insertion(&self) -> Option<(usize, &str)> {
        match self.changes.as_slice() {
            [change] if change.removed == 0 && !change.text.is_empty() => {
                Some((change.offset, change.text.as_str()))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChange {
    pub document: DocumentId,
    pub cursor: usize,
    pub kind: SelectionKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveEditor {
    pub document: DocumentId,
    pub language_id: String,
}
