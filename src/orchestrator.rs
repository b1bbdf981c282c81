//! One-pass orchestration: fetch state, normalize intent, route, run the
//! selected worker, finalize, validate, store.
//!
//! Every learner action produces exactly one [`PassReport`]. A worker
//! failure never surfaces as an error; the pass degrades to the supervisor
//! fallback with the stage unchanged, so the learner can simply retry.

use std::sync::Arc;

use tracing::{instrument, warn};

use crate::collaborators::{CurriculumService, GenerationService, PersistenceService};
use crate::config::OrchestratorConfig;
use crate::faults::{FaultError, FaultEvent};
use crate::managers::{agent, conversation, progression, quiz};
use crate::registry::SessionRegistry;
use crate::state::{factory, validator, SessionState, StructuredResponse};
use crate::types::{Decision, Intent, Tier, WorkerKind};
use crate::workers::{
    explanation::ExplanationWorker, feedback::FeedbackWorker, progression::ProgressionWorker,
    question::QuestionWorker, quiz::QuizWorker, supervisor::SupervisorWorker, Worker,
    WorkerContext, WorkerError, WorkerOutput, FALLBACK_MESSAGE,
};

/// A learner-initiated action driving one orchestrator pass.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// Open a fresh session at the given position, replacing any existing
    /// session for this learner.
    StartSession { tier: Tier, unit: u32, section: u32 },
    /// Free-form chat message; intent is normalized unless supplied.
    SendMessage {
        text: String,
        intent: Option<Intent>,
    },
    /// Attach and grade a quiz answer.
    SubmitQuizAnswer { answer: String },
    /// Record the retry-vs-proceed decision and close out the section.
    CompleteSession { decision: Decision },
}

/// Outcome of one pass: the response plus any faults observed on the way.
#[derive(Clone, Debug)]
pub struct PassReport {
    pub response: StructuredResponse,
    pub faults: Vec<FaultEvent>,
}

/// Owns the worker set, collaborators, config, and registry.
pub struct Orchestrator {
    generation: Arc<dyn GenerationService>,
    curriculum: Arc<dyn CurriculumService>,
    persistence: Arc<dyn PersistenceService>,
    config: OrchestratorConfig,
    registry: SessionRegistry,
    explanation: ExplanationWorker,
    quiz: QuizWorker,
    feedback: FeedbackWorker,
    question: QuestionWorker,
    progression: ProgressionWorker,
    supervisor: SupervisorWorker,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        generation: Arc<dyn GenerationService>,
        curriculum: Arc<dyn CurriculumService>,
        persistence: Arc<dyn PersistenceService>,
        config: OrchestratorConfig,
    ) -> Self {
        let registry = SessionRegistry::new(config.session_ttl);
        Self {
            generation,
            curriculum,
            persistence,
            config,
            registry,
            explanation: ExplanationWorker,
            quiz: QuizWorker,
            feedback: FeedbackWorker,
            question: QuestionWorker,
            progression: ProgressionWorker,
            supervisor: SupervisorWorker,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run one pass for the learner. Always returns a report; worker
    /// failures degrade to the fallback response.
    #[instrument(skip(self, action))]
    pub async fn handle_action(&self, learner_id: i64, action: Action) -> PassReport {
        let mut faults = Vec::new();

        let handle = match &action {
            Action::StartSession {
                tier,
                unit,
                section,
            } => self.registry.put(
                learner_id,
                factory::new_session(learner_id, *tier, *unit, *section),
            ),
            _ => match self.registry.get(learner_id) {
                Some(handle) => handle,
                None => {
                    // No live session for a mid-flow action; start fresh
                    // rather than failing the learner.
                    faults.push(
                        FaultEvent::registry(FaultError::msg(
                            "action arrived with no live session, starting fresh",
                        ))
                        .with_context(serde_json::json!({"learner_id": learner_id})),
                    );
                    self.registry.put(
                        learner_id,
                        factory::new_session(learner_id, Tier::Unassigned, 1, 1),
                    )
                }
            },
        };

        // The slot lock is held for the entire pass, so concurrent actions
        // from one learner serialize.
        let mut slot = handle.lock().await;
        let state = &mut slot.state;
        progression::increment_pass_count(state);

        match &action {
            Action::StartSession { .. } => {
                state.intent = Intent::Advance;
            }
            Action::SendMessage { text, intent } => {
                conversation::append_learner(state, text.clone());
                state.intent = intent.unwrap_or_else(|| agent::normalize_intent(text));
            }
            Action::SubmitQuizAnswer { answer } => {
                conversation::append_learner(state, answer.clone());
                quiz::capture_answer(state, answer.clone());
                state.intent = Intent::SubmitQuizAnswer;
            }
            Action::CompleteSession { decision } => {
                progression::record_decision(state, *decision);
                state.intent = Intent::Advance;
            }
        }

        let routed = agent::route(state);
        if routed == WorkerKind::Supervisor {
            // No table entry matched; the supervisor serves a direct
            // response, but the miss itself is worth observing.
            faults.push(
                FaultEvent::router(FaultError::msg(format!(
                    "no route for stage {} with intent {}",
                    state.stage, state.intent
                )))
                .with_tag("direct_response"),
            );
        }
        agent::transition(state, routed);

        let pass = state.pass_count;
        let ctx = WorkerContext {
            generation: self.generation.as_ref(),
            curriculum: self.curriculum.as_ref(),
            persistence: self.persistence.as_ref(),
            config: &self.config,
            pass,
        };
        // The worker credited on the response: the routed one, unless the
        // pass degrades to the supervisor fallback.
        let mut responding = routed;
        let content = if !validator::quick_validate(state) {
            // Cheap gate before any generation call is made.
            warn!(learner_id, "session failed fast validation, worker skipped");
            faults.push(FaultEvent::validator(FaultError::msg(
                "session failed fast validation, worker skipped",
            )));
            agent::transition(state, WorkerKind::Supervisor);
            responding = WorkerKind::Supervisor;
            serde_json::json!({"message": FALLBACK_MESSAGE})
        } else {
            match self.worker(routed).run(state, ctx).await {
                Ok(WorkerOutput {
                    content,
                    faults: worker_faults,
                }) => {
                    faults.extend(worker_faults);
                    content
                }
                Err(e) => {
                    warn!(learner_id, worker = %routed, error = %e, "worker failed, serving fallback");
                    faults.push(self.fault_for(routed, pass, &e));
                    // Stage is untouched; the learner retries the same step.
                    agent::transition(state, WorkerKind::Supervisor);
                    responding = WorkerKind::Supervisor;
                    serde_json::json!({"message": FALLBACK_MESSAGE})
                }
            }
        };

        let report = validator::report(state);
        for warning in &report.warnings {
            warn!(learner_id, check = warning.check, "{}", warning.message);
        }
        for error in &report.errors {
            warn!(learner_id, check = error.check, "{}", error.message);
            faults.push(FaultEvent::validator(FaultError::msg(error.message.clone())));
        }
        validator::auto_correct_ui_mode(state);

        let response = crate::workers::supervisor::finalize(state, responding, content);
        slot.touch();

        PassReport { response, faults }
    }

    fn worker(&self, kind: WorkerKind) -> &dyn Worker {
        match kind {
            WorkerKind::Explanation => &self.explanation,
            WorkerKind::Quiz => &self.quiz,
            WorkerKind::Feedback => &self.feedback,
            WorkerKind::Question => &self.question,
            WorkerKind::Progression => &self.progression,
            WorkerKind::Supervisor => &self.supervisor,
        }
    }

    fn fault_for(&self, kind: WorkerKind, pass: u32, error: &WorkerError) -> FaultEvent {
        let event = FaultEvent::worker(kind, pass, FaultError::msg(error.to_string()));
        match error {
            WorkerError::Timeout { .. } => event.with_tag("timeout").with_tag("fallback"),
            WorkerError::Generation(_) => event.with_tag("generation").with_tag("fallback"),
            WorkerError::Precondition { .. } => event.with_tag("precondition").with_tag("fallback"),
        }
    }

    /// Snapshot of a learner's current state, if a live session exists.
    pub async fn session_snapshot(&self, learner_id: i64) -> Option<SessionState> {
        let handle = self.registry.get(learner_id)?;
        let slot = handle.lock().await;
        Some(slot.state.clone())
    }

    /// End a learner's session immediately.
    pub fn end_session(&self, learner_id: i64) -> bool {
        self.registry.evict(learner_id)
    }
}
