use std::sync::Arc;

use super::Workbench;
use crate::kernel::services::completion::RequestOptions;
use crate::kernel::{Action, CompletionOutcome, Effect, PendingInsert, UserDecision};

impl Workbench {
    /// Reduces `action` and runs the resulting effects. Returns whether the
    /// kernel state changed.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let result = self.store.dispatch(action);
        for effect in result.effects {
            self.run_effect(effect);
        }
        result.state_changed
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::RequestCompletion { seq, request } => {
                let ctx = self.kernel_services.context();
                let pipeline = Arc::clone(&self.pipeline);
                let options = RequestOptions::from(&self.store.state().settings);
                ctx.clone().spawn_future(async move {
                    let outcome = match pipeline.request_completions(request, options).await {
                        Ok(suggestions) => CompletionOutcome::Suggestions(suggestions),
                        Err(e) => CompletionOutcome::Failed(e.to_string()),
                    };
                    ctx.dispatch(Action::CompletionFinished { seq, outcome });
                });
            }
            Effect::InsertText(insert) => self.apply_insert(insert),
            Effect::RecordDecision(decision) => self.record_decision(decision),
            Effect::Prompt(prompt) => self.editor.show_prompt(prompt),
        }
    }

    fn apply_insert(&mut self, insert: PendingInsert) {
        if let Err(e) = self
            .editor
            .insert_text(&insert.document, insert.offset, &insert.text)
        {
            tracing::warn!(
                error = %e,
                document = %insert.document,
                "accepted suggestion not inserted"
            );
        }
        // The insert's own change event is recognized by the store in either
        // order relative to this acknowledgement.
        self.kernel_services
            .context()
            .dispatch(Action::AcceptEditApplied);
    }

    fn record_decision(&mut self, decision: UserDecision) {
        tracing::info!(
            seq = decision.request_seq,
            document = %decision.document,
            index = decision.outcome.as_index(),
            "recommendation decision"
        );
        let limit = self.store.state().settings.decision_history_limit;
        if limit == 0 {
            return;
        }
        while self.decisions.len() >= limit {
            self.decisions.pop_front();
        }
        self.decisions.push_back(decision);
    }
}
