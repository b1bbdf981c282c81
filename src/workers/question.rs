//! Answers free-form learner questions with section context.

use async_trait::async_trait;
use serde_json::json;

use crate::collaborators::{GenerationPayload, GenerationRequest};
use crate::managers::conversation;
use crate::state::SessionState;
use crate::types::WorkerKind;
use crate::workers::{Worker, WorkerContext, WorkerError, WorkerOutput};

/// Recent section summaries passed along as long-term context.
const SUMMARY_CONTEXT: usize = 3;

pub struct QuestionWorker;

#[async_trait]
impl Worker for QuestionWorker {
    fn kind(&self) -> WorkerKind {
        WorkerKind::Question
    }

    async fn run(
        &self,
        state: &mut SessionState,
        ctx: WorkerContext<'_>,
    ) -> Result<WorkerOutput, WorkerError> {
        let question = conversation::last_learner_message(state).to_string();
        if question.is_empty() {
            return Err(WorkerError::Precondition {
                what: "question worker invoked with an empty transcript".to_string(),
            });
        }

        let summaries = conversation::recent_summaries(state, SUMMARY_CONTEXT)
            .iter()
            .map(|s| format!("{} (unit {} section {}): {}", s.topic, s.unit, s.section, s.summary))
            .collect();
        let payload = ctx
            .generate_bounded(GenerationRequest::Answer {
                question: question.clone(),
                section_context: state.explanation_draft.clone(),
                recent_summaries: summaries,
            })
            .await?;
        let answer = match payload {
            GenerationPayload::Answer(text) => text,
            _ => {
                return Err(WorkerError::Generation(
                    crate::collaborators::GenerationError::KindMismatch,
                ))
            }
        };

        conversation::set_draft(state, WorkerKind::Question, answer.clone());
        conversation::append_worker(state, WorkerKind::Question, answer.clone());

        Ok(WorkerOutput::content(json!({
            "question": question,
            "answer": answer,
        })))
    }
}
