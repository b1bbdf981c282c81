//! Grades the attached quiz answer and produces the feedback draft.
//!
//! Closed-form answers grade locally against the stored key; open-form
//! answers go out to the generation service for evaluation. Either way the
//! stage advances to quiz-and-feedback-completed on success.

use async_trait::async_trait;
use serde_json::json;

use crate::collaborators::{GenerationPayload, GenerationRequest};
use crate::managers::{conversation, progression, quiz};
use crate::state::{QuizKind, SessionState};
use crate::types::WorkerKind;
use crate::workers::{Worker, WorkerContext, WorkerError, WorkerOutput};

pub struct FeedbackWorker;

#[async_trait]
impl Worker for FeedbackWorker {
    fn kind(&self) -> WorkerKind {
        WorkerKind::Feedback
    }

    async fn run(
        &self,
        state: &mut SessionState,
        ctx: WorkerContext<'_>,
    ) -> Result<WorkerOutput, WorkerError> {
        if !state.quiz.has_unevaluated_answer() {
            return Err(WorkerError::Precondition {
                what: "feedback requested with no ungraded answer attached".to_string(),
            });
        }

        let content = match state.quiz.kind {
            QuizKind::ClosedForm => {
                let correct = quiz::grade_closed_form(state);
                let feedback = if correct {
                    format!("Correct. {}", state.quiz.explanation)
                } else {
                    format!("Not quite. {}", state.quiz.explanation)
                };
                state.quiz.feedback = feedback.clone();
                conversation::set_draft(state, WorkerKind::Feedback, feedback.clone());
                json!({
                    "correct": correct,
                    "score": quiz::combined_score(state),
                    "feedback": feedback,
                })
            }
            QuizKind::OpenForm => {
                let payload = ctx
                    .generate_bounded(GenerationRequest::Evaluation {
                        prompt: state.quiz.prompt.clone(),
                        sample_answer: state.quiz.sample_answer.clone(),
                        criteria: state.quiz.criteria.clone(),
                        learner_answer: state.quiz.learner_answer.clone(),
                    })
                    .await?;
                let (score, feedback) = match payload {
                    GenerationPayload::Evaluation { score, feedback } => (score, feedback),
                    _ => {
                        return Err(WorkerError::Generation(
                            crate::collaborators::GenerationError::KindMismatch,
                        ))
                    }
                };
                quiz::record_open_form_result(state, score, feedback.clone());
                conversation::set_draft(state, WorkerKind::Feedback, feedback.clone());
                json!({
                    "score": state.quiz.score,
                    "feedback": feedback,
                })
            }
        };

        conversation::append_worker(state, WorkerKind::Feedback, state.quiz.feedback.clone());
        progression::advance_stage(state, WorkerKind::Feedback);

        Ok(WorkerOutput::content(content))
    }
}
