//! Produces the explanation draft that opens each section.

use async_trait::async_trait;
use serde_json::json;

use crate::collaborators::{GenerationPayload, GenerationRequest};
use crate::managers::{conversation, progression};
use crate::state::SessionState;
use crate::types::WorkerKind;
use crate::workers::{Worker, WorkerContext, WorkerError, WorkerOutput};

pub struct ExplanationWorker;

#[async_trait]
impl Worker for ExplanationWorker {
    fn kind(&self) -> WorkerKind {
        WorkerKind::Explanation
    }

    async fn run(
        &self,
        state: &mut SessionState,
        ctx: WorkerContext<'_>,
    ) -> Result<WorkerOutput, WorkerError> {
        let info = ctx.section_info_or_default(state).await;
        let payload = ctx
            .generate_bounded(GenerationRequest::Explanation {
                tier: state.tier,
                unit: state.unit,
                section: state.section,
                topic: info.title.clone(),
            })
            .await?;
        let text = match payload {
            GenerationPayload::Explanation(text) => text,
            _ => {
                return Err(WorkerError::Generation(
                    crate::collaborators::GenerationError::KindMismatch,
                ))
            }
        };

        conversation::set_draft(state, WorkerKind::Explanation, text.clone());
        conversation::append_worker(state, WorkerKind::Explanation, text.clone());
        progression::advance_stage(state, WorkerKind::Explanation);

        Ok(WorkerOutput::content(json!({
            "explanation": text,
            "section_title": info.title,
        })))
    }
}
