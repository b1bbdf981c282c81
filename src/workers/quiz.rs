//! Generates the section quiz and switches the learner into quiz mode.

use async_trait::async_trait;
use serde_json::json;

use crate::collaborators::{GenerationPayload, GenerationRequest, QuizPayload};
use crate::managers::{conversation, quiz};
use crate::state::SessionState;
use crate::types::WorkerKind;
use crate::workers::{Worker, WorkerContext, WorkerError, WorkerOutput};

pub struct QuizWorker;

#[async_trait]
impl Worker for QuizWorker {
    fn kind(&self) -> WorkerKind {
        WorkerKind::Quiz
    }

    async fn run(
        &self,
        state: &mut SessionState,
        ctx: WorkerContext<'_>,
    ) -> Result<WorkerOutput, WorkerError> {
        if state.explanation_draft.is_empty() {
            return Err(WorkerError::Precondition {
                what: "quiz requested before any explanation exists".to_string(),
            });
        }

        let generated = ctx
            .generate_bounded(GenerationRequest::Quiz {
                tier: state.tier,
                unit: state.unit,
                section: state.section,
                explanation: state.explanation_draft.clone(),
            })
            .await?;
        let payload = match generated {
            GenerationPayload::Quiz(payload) => payload,
            _ => {
                return Err(WorkerError::Generation(
                    crate::collaborators::GenerationError::KindMismatch,
                ))
            }
        };

        quiz::populate_from_payload(state, &payload)?;
        quiz::reset_hint_use(state);
        conversation::set_draft(state, WorkerKind::Quiz, payload.prompt().to_string());
        conversation::append_worker(state, WorkerKind::Quiz, payload.prompt().to_string());

        // The answer key and sample answer stay server-side; the learner
        // sees only what is needed to attempt the question.
        let content = match &payload {
            QuizPayload::ClosedForm {
                prompt,
                options,
                hint,
                ..
            } => json!({
                "quiz_type": "closed_form",
                "prompt": prompt,
                "options": options,
                "hint": hint,
            }),
            QuizPayload::OpenForm {
                prompt,
                criteria,
                hint,
                ..
            } => json!({
                "quiz_type": "open_form",
                "prompt": prompt,
                "criteria": criteria,
                "hint": hint,
            }),
        };
        Ok(WorkerOutput::content(content))
    }
}
