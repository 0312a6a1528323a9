//! Auto-trigger state machine: `Idle -> Debouncing -> RequestInFlight -> Idle`.
//!
//! The settle delay is a deadline polled by the host tick; a newer event
//! replaces the pending one. Requests are numbered and a response is only
//! accepted for the sequence number currently in flight.

use std::time::{Duration, Instant};

use crate::kernel::event::{DocumentChange, DocumentId, DocumentSnapshot};
use crate::kernel::language::LanguageContext;
use crate::kernel::state::AuthStatus;

#[derive(Debug, Clone)]
pub enum TriggerPhase {
    Idle,
    Debouncing {
        deadline: Instant,
        snapshot: DocumentSnapshot,
    },
    RequestInFlight(InFlight),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlight {
    pub seq: u64,
    pub document: DocumentId,
    pub cursor: usize,
}

/// Why a document change did not start the settle delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppression {
    AutoTriggerDisabled,
    InactiveDocument,
    UndoRedo,
    SelfInflicted,
    EmptyDelta,
    DeletionOnly,
    UnsupportedLanguage,
    NoConnection,
    ConnectionExpired,
}

/// Inputs to the suppression rules, gathered from the rest of the state.
pub struct TriggerGate<'a> {
    pub auto_trigger_enabled: bool,
    pub active_document: Option<&'a DocumentId>,
    pub editing: bool,
    pub auth: AuthStatus,
    pub languages: &'a LanguageContext,
}

impl TriggerGate<'_> {
    /// Edit-shape rules: does this change count as user typing in the active
    /// document at all.
    pub fn edit_suppression(&self, change: &DocumentChange) -> Option<Suppression> {
        if self.active_document != Some(change.document()) {
            return Some(Suppression::InactiveDocument);
        }
        if self.editing {
            return Some(Suppression::SelfInflicted);
        }
        if change.origin == crate::kernel::event::ChangeOrigin::UndoRedo {
            return Some(Suppression::UndoRedo);
        }
        if change.is_empty_delta() {
            return Some(Suppression::EmptyDelta);
        }
        if change.is_deletion_only() {
            return Some(Suppression::DeletionOnly);
        }
        None
    }

    /// Rules deciding whether typing may start a request.
    pub fn trigger_suppression(&self, language_id: &str) -> Option<Suppression> {
        if !self.languages.is_supported(language_id) {
            return Some(Suppression::UnsupportedLanguage);
        }
        if !self.auto_trigger_enabled {
            return Some(Suppression::AutoTriggerDisabled);
        }
        self.auth_suppression()
    }

    pub fn auth_suppression(&self) -> Option<Suppression> {
        if !self.auth.connected {
            return Some(Suppression::NoConnection);
        }
        if self.auth.expired || !self.auth.valid {
            return Some(Suppression::ConnectionExpired);
        }
        None
    }
}

#[derive(Debug)]
pub struct TriggerController {
    phase: TriggerPhase,
    last_seq: u64,
    settle_delay: Duration,
}

impl TriggerController {
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            phase: TriggerPhase::Idle,
            last_seq: 0,
            settle_delay,
        }
    }

    pub fn phase(&self) -> &TriggerPhase {
        &self.phase
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, TriggerPhase::Idle)
    }

    pub fn in_flight(&self) -> Option<&InFlight> {
        match &self.phase {
            TriggerPhase::RequestInFlight(inflight) => Some(inflight),
            _ => None,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        match &self.phase {
            TriggerPhase::Debouncing { deadline, .. } => Some(*deadline),
            _ => None,
        }
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    pub fn set_settle_delay(&mut self, delay: Duration) {
        self.settle_delay = delay;
    }

    /// Last sequence number handed out.
    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }

    /// Document the pending or in-flight trigger belongs to.
    pub fn document(&self) -> Option<&DocumentId> {
        match &self.phase {
            TriggerPhase::Idle => None,
            TriggerPhase::Debouncing { snapshot, .. } => Some(&snapshot.document),
            TriggerPhase::RequestInFlight(inflight) => Some(&inflight.document),
        }
    }

    /// Cursor the pending or in-flight trigger was taken at.
    pub fn cursor(&self) -> Option<usize> {
        match &self.phase {
            TriggerPhase::Idle => None,
            TriggerPhase::Debouncing { snapshot, .. } => Some(snapshot.cursor),
            TriggerPhase::RequestInFlight(inflight) => Some(inflight.cursor),
        }
    }

    /// Starts (or restarts) the settle delay for `snapshot`. Whatever was
    /// pending or in flight is superseded.
    pub fn schedule(&mut self, snapshot: DocumentSnapshot, now: Instant) {
        if let TriggerPhase::RequestInFlight(inflight) = &self.phase {
            tracing::debug!(seq = inflight.seq, "in-flight completion superseded");
        }
        self.phase = TriggerPhase::Debouncing {
            deadline: now + self.settle_delay,
            snapshot,
        };
    }

    /// Fires the pending trigger once its deadline has passed. With a visible
    /// session the trigger is dropped and typing passes through.
    pub fn poll(&mut self, now: Instant, session_visible: bool) -> Option<(u64, DocumentSnapshot)> {
        let TriggerPhase::Debouncing { deadline, .. } = &self.phase else {
            return None;
        };
        if now < *deadline {
            return None;
        }

        let TriggerPhase::Debouncing { snapshot, .. } =
            std::mem::replace(&mut self.phase, TriggerPhase::Idle)
        else {
            return None;
        };
        if session_visible {
            return None;
        }
        let seq = self.begin_request(&snapshot);
        Some((seq, snapshot))
    }

    /// Issues a request immediately, bypassing the settle delay.
    pub fn begin_request(&mut self, snapshot: &DocumentSnapshot) -> u64 {
        self.last_seq += 1;
        self.phase = TriggerPhase::RequestInFlight(InFlight {
            seq: self.last_seq,
            document: snapshot.document.clone(),
            cursor: snapshot.cursor,
        });
        self.last_seq
    }

    /// Settles the request `seq`. Returns `None` for superseded responses.
    pub fn complete(&mut self, seq: u64) -> Option<InFlight> {
        match &self.phase {
            TriggerPhase::RequestInFlight(inflight) if inflight.seq == seq => {}
            _ => return None,
        }
        match std::mem::replace(&mut self.phase, TriggerPhase::Idle) {
            TriggerPhase::RequestInFlight(inflight) => Some(inflight),
            _ => None,
        }
    }

    /// Drops the pending wait or invalidates the in-flight request.
    pub fn cancel(&mut self) -> bool {
        let was_active = !self.is_idle();
        if let Some(inflight) = self.in_flight() {
            tracing::debug!(seq = inflight.seq, "in-flight completion cancelled");
        }
        self.phase = TriggerPhase::Idle;
        was_active
    }
}

impl Default for TriggerController {
    fn default() -> Self {
        Self::new(Duration::from_millis(30))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/trigger.rs"]
mod tests;
