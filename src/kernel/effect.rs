use crate::kernel::services::ports::{CompletionRequest, Prompt};
use crate::kernel::session::{PendingInsert, UserDecision};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    RequestCompletion {
        seq: u64,
        request: CompletionRequest,
    },
    InsertText(PendingInsert),
    RecordDecision(UserDecision),
    Prompt(Prompt),
}
