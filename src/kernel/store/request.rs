use std::time::Duration;

use crate::kernel::event::DocumentSnapshot;
use crate::kernel::language::LanguageContext;
use crate::kernel::services::ports::{CompletionRequest, FileContext, Settings, TriggerKind};

/// Builds the service request for `snapshot`: text windows on both sides of
/// the cursor, bounded to `max_context_chars` each.
pub(super) fn build_request(
    snapshot: &DocumentSnapshot,
    languages: &LanguageContext,
    settings: &Settings,
    trigger: TriggerKind,
    time_since_last_modification: Option<Duration>,
) -> CompletionRequest {
    let rope = &snapshot.text;
    let len = rope.len_chars();
    let cursor = snapshot.cursor.min(len);
    let limit = settings.max_context_chars;

    let left_start = cursor.saturating_sub(limit);
    let right_end = cursor.saturating_add(limit).min(len);

    CompletionRequest {
        file_context: FileContext {
            filename: snapshot.filename.clone(),
            language: languages.request_language(&snapshot.language_id),
            left_content: rope.slice(left_start..cursor).to_string(),
            right_content: rope.slice(cursor..right_end).to_string(),
            cursor,
        },
        max_results: settings.max_results,
        trigger,
        time_since_last_modification,
    }
}
