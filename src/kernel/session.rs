//! Recommendation session: the suggestions currently offered inline.
//!
//! At most one session is live per editor. Only the store creates or clears
//! it; UI-originated navigate/accept/reject go through [`SessionController`].

use crate::kernel::event::{DocumentChange, DocumentId};
use crate::kernel::services::ports::Suggestion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionItem {
    /// Position in the service response. Reported in decisions.
    pub response_index: usize,
    pub suggestion: Suggestion,
}

#[derive(Debug, Clone)]
pub struct RecommendationSession {
    pub request_seq: u64,
    pub document: DocumentId,
    /// Cursor offset the suggestions were requested at.
    pub anchor: usize,
    pub items: Vec<SessionItem>,
    pub index: usize,
    pub visible: bool,
    /// Text typed over the suggestion since it was shown.
    pub typed: String,
}

impl RecommendationSession {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current(&self) -> Option<&SessionItem> {
        self.items.get(self.index)
    }

    /// Where the cursor sits while the user types along the suggestion.
    pub fn expected_cursor(&self) -> usize {
        self.anchor + self.typed.chars().count()
    }

    /// Suggestion text not yet typed by the user.
    pub fn remaining_text(&self) -> Option<&str> {
        let item = self.current()?;
        item.suggestion.content.get(self.typed.len()..)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionOutcome {
    Accepted { index: usize },
    Rejected,
}

impl DecisionOutcome {
    /// Chosen index, or -1 for a rejection.
    pub fn as_index(self) -> i64 {
        match self {
            Self::Accepted { index } => index as i64,
            Self::Rejected => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDecision {
    pub request_seq: u64,
    pub document: DocumentId,
    pub outcome: DecisionOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingInsert {
    pub document: DocumentId,
    pub offset: usize,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeAhead {
    NoSession,
    Matched,
    Diverged,
}

#[derive(Debug, Default)]
pub struct SessionController {
    session: Option<RecommendationSession>,
    editing: bool,
    /// Insert handed to the editor on accept. Its change event is recognized
    /// whenever it arrives and is never treated as typing.
    applying: Option<PendingInsert>,
}

impl SessionController {
    pub fn session(&self) -> Option<&RecommendationSession> {
        self.session.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.visible)
    }

    /// True while an accepted suggestion is being written into the document.
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn show(
        &mut self,
        request_seq: u64,
        document: DocumentId,
        anchor: usize,
        suggestions: Vec<Suggestion>,
    ) -> bool {
        let items: Vec<SessionItem> = suggestions
            .into_iter()
            .enumerate()
            .filter(|(_, s)| !s.content.is_empty())
            .map(|(response_index, suggestion)| SessionItem {
                response_index,
                suggestion,
            })
            .collect();
        if items.is_empty() {
            return false;
        }

        self.session = Some(RecommendationSession {
            request_seq,
            document,
            anchor,
            items,
            index: 0,
            visible: true,
            typed: String::new(),
        });
        true
    }

    pub fn navigate(&mut self, forward: bool) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let len = session.items.len();
        if len < 2 {
            return false;
        }
        session.index = if forward {
            (session.index + 1) % len
        } else {
            (session.index + len - 1) % len
        };
        true
    }

    /// Commits the current suggestion. The session is cleared and the
    /// reentrancy flag stays set until the insert's change event is seen
    /// ([`Self::observe_accept_edit`]) or the host reports the edit applied
    /// ([`Self::finish_accept_edit`]).
    pub fn accept(&mut self) -> Option<(PendingInsert, UserDecision)> {
        let session = self.session.take()?;
        let item = session.current()?;
        let text = session.remaining_text()?.to_string();

        let insert = PendingInsert {
            document: session.document.clone(),
            offset: session.expected_cursor(),
            text,
        };
        let decision = UserDecision {
            request_seq: session.request_seq,
            document: session.document.clone(),
            outcome: DecisionOutcome::Accepted {
                index: item.response_index,
            },
        };
        self.editing = true;
        self.applying = Some(insert.clone());
        Some((insert, decision))
    }

    /// Host signal that the accepted insert was applied. Clears the
    /// reentrancy flag but keeps expecting the insert's change event, which
    /// may still be queued behind this signal.
    pub fn finish_accept_edit(&mut self) -> bool {
        std::mem::replace(&mut self.editing, false)
    }

    /// Returns true when `change` is the edit produced by the accepted
    /// insert. A matching change ends the accept edit. Any other change made
    /// after the host reported the insert applied drops the expectation.
    pub fn observe_accept_edit(&mut self, change: &DocumentChange) -> bool {
        let Some(expected) = self.applying.as_ref() else {
            return false;
        };
        let matches = change.document() == &expected.document
            && change.single_insertion() == Some((expected.offset, expected.text.as_str()));
        if matches {
            self.applying = None;
            self.editing = false;
            return true;
        }
        if !self.editing {
            self.applying = None;
        }
        false
    }

    pub fn reject(&mut self) -> Option<UserDecision> {
        let session = self.session.take()?;
        Some(UserDecision {
            request_seq: session.request_seq,
            document: session.document,
            outcome: DecisionOutcome::Rejected,
        })
    }

    pub fn clear(&mut self) -> bool {
        self.session.take().is_some()
    }

    /// Narrows the session to suggestions that continue with `inserted`.
    pub fn type_ahead(&mut self, inserted: &str) -> TypeAhead {
        let Some(session) = self.session.as_mut() else {
            return TypeAhead::NoSession;
        };

        let mut typed = session.typed.clone();
        typed.push_str(inserted);

        let selected = session.current().map(|item| item.response_index);
        let remaining: Vec<SessionItem> = session
            .items
            .iter()
            .filter(|item| {
                let content = &item.suggestion.content;
                content.len() > typed.len() && content.starts_with(&typed)
            })
            .cloned()
            .collect();
        if remaining.is_empty() {
            return TypeAhead::Diverged;
        }

        session.index = selected
            .and_then(|idx| remaining.iter().position(|item| item.response_index == idx))
            .unwrap_or(0);
        session.items = remaining;
        session.typed = typed;
        TypeAhead::Matched
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/session.rs"]
mod tests;
