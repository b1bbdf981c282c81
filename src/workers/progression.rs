//! Closes out a completed section: summary retention, durable record,
//! rollover, and the fresh-state reset.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::warn;

use crate::collaborators::CompletedSessionRecord;
use crate::faults::{FaultError, FaultEvent};
use crate::managers::{conversation, progression, quiz};
use crate::state::{factory, SectionSummary, SessionState};
use crate::types::{Decision, WorkerKind};
use crate::workers::{Worker, WorkerContext, WorkerError, WorkerOutput};

pub struct ProgressionWorker;

#[async_trait]
impl Worker for ProgressionWorker {
    fn kind(&self) -> WorkerKind {
        WorkerKind::Progression
    }

    async fn run(
        &self,
        state: &mut SessionState,
        ctx: WorkerContext<'_>,
    ) -> Result<WorkerOutput, WorkerError> {
        if !progression::is_session_completed(state) {
            return Err(WorkerError::Precondition {
                what: "progression requested before the section flow finished".to_string(),
            });
        }
        // An unset decision at this point means proceed; the learner asked
        // to advance and the flow is complete.
        if state.decision == Decision::Undecided {
            progression::record_decision(state, Decision::Proceed);
        }

        let info = ctx.section_info_or_default(state).await;
        let score = quiz::combined_score(state);
        let next = progression::compute_next_position(state, state.decision, info.total_sections);
        let summary_text = progression::transition_summary(state, score, next);
        let progress = progression::progress_percentage(state, info.total_sections);

        conversation::add_summary(
            state,
            SectionSummary {
                unit: state.unit,
                section: state.section,
                topic: info.title,
                summary: summary_text.clone(),
                recorded_at: Utc::now(),
            },
        );

        let record = CompletedSessionRecord {
            learner_id: state.learner_id,
            tier: state.tier,
            unit: state.unit,
            section: state.section,
            decision: state.decision.to_string(),
            quiz_score: score,
            duration_secs: progression::session_duration(state).num_seconds(),
            summary: summary_text.clone(),
            transcript: state.transcript.clone(),
        };
        let mut output = WorkerOutput::content(json!({
            "summary": summary_text,
            "score": score,
            "progress_percentage": progress,
            "decision": state.decision,
            "next_unit": next.map(|p| p.unit),
            "next_section": next.map(|p| p.section),
        }));
        if let Err(e) = ctx.persistence.store_completed(record).await {
            warn!(learner_id = state.learner_id, error = %e, "completed-section record not persisted");
            output = output.with_fault(
                FaultEvent::persistence(FaultError::msg(e.to_string()))
                    .with_context(json!({"learner_id": state.learner_id})),
            );
        }

        *state = factory::reset_for_next_section(state, next);
        Ok(output)
    }
}
