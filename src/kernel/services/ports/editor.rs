use thiserror::Error;

use crate::kernel::event::DocumentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// No connection: ask the user to sign in.
    Connect,
    /// Connection expired: offer to reauthenticate.
    Reauthenticate,
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("document not open: {0}")]
    DocumentNotOpen(DocumentId),
    #[error("offset {offset} out of bounds for {document}")]
    OutOfBounds { document: DocumentId, offset: usize },
    #[error("edit rejected: {0}")]
    Rejected(String),
}

/// What the kernel needs from the editor host.
///
/// `insert_text` is the only document mutation the kernel performs. Hosts
/// report the resulting document change through the normal event path; the
/// kernel recognises it as its own edit.
pub trait EditorPort {
    fn insert_text(
        &mut self,
        document: &DocumentId,
        offset: usize,
        text: &str,
    ) -> Result<(), EditorError>;

    fn show_prompt(&mut self, prompt: Prompt) {
        tracing::info!(?prompt, "prompt requested");
    }
}
