//! Entry/exit worker: direct responses when no flow step applies, and the
//! finalize step that assembles the structured response for every pass.

use async_trait::async_trait;
use serde_json::json;

use crate::managers::conversation;
use crate::state::{SessionState, StructuredResponse};
use crate::types::{Stage, WorkerKind};
use crate::workers::{Worker, WorkerContext, WorkerError, WorkerOutput};

pub struct SupervisorWorker;

#[async_trait]
impl Worker for SupervisorWorker {
    fn kind(&self) -> WorkerKind {
        WorkerKind::Supervisor
    }

    /// Direct response for actions that match no flow step: orient the
    /// learner instead of erroring. No generation call is made.
    async fn run(
        &self,
        state: &mut SessionState,
        _ctx: WorkerContext<'_>,
    ) -> Result<WorkerOutput, WorkerError> {
        let guidance = match state.stage {
            Stage::SessionStart => "Let's get started with this section's explanation.",
            Stage::ExplanationCompleted => {
                "You can move on to the quiz, or ask a question about the explanation."
            }
            Stage::QuizAndFeedbackCompleted => {
                "This section is wrapped up. Continue to move on, or ask a question first."
            }
        };
        conversation::append_worker(state, WorkerKind::Supervisor, guidance);
        let drafts: Vec<String> = conversation::all_drafts(state)
            .keys()
            .map(|w| w.to_string())
            .collect();
        Ok(WorkerOutput::content(json!({
            "message": guidance,
            "stage": state.stage,
            "available_drafts": drafts,
        })))
    }
}

/// Assemble the final response for a pass and record it on the state.
pub fn finalize(
    state: &mut SessionState,
    worker: WorkerKind,
    content: serde_json::Value,
) -> StructuredResponse {
    let response = StructuredResponse {
        worker,
        stage: state.stage,
        ui_mode: state.ui_mode,
        content,
    };
    state.last_response = Some(response.clone());
    response
}
