//! The specialized workers the router selects between.
//!
//! Every worker implements [`Worker`]: one async `run` over the mutable
//! session state plus a borrowed [`WorkerContext`]. A worker makes at most
//! one generation call, bounded by the configured timeout, writes results
//! through the managers, and leaves the state valid. Failures surface as
//! [`WorkerError`]; the orchestrator converts them into the fallback path,
//! so no worker error ever reaches the learner raw.

pub mod explanation;
pub mod feedback;
pub mod progression;
pub mod question;
pub mod quiz;
pub mod supervisor;

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;

use crate::collaborators::{
    CurriculumService, GenerationError, GenerationPayload, GenerationRequest, GenerationService,
    PersistenceService, SectionInfo,
};
use crate::config::OrchestratorConfig;
use crate::faults::FaultEvent;
use crate::state::SessionState;
use crate::types::WorkerKind;

/// Learner-facing notice substituted when a worker fails. The session stays
/// in its pre-failure stage so the action can simply be retried.
pub const FALLBACK_MESSAGE: &str =
    "We're temporarily unable to complete this step. Please try again in a moment.";

/// Borrowed collaborators and tunables for one worker invocation.
pub struct WorkerContext<'a> {
    pub generation: &'a dyn GenerationService,
    pub curriculum: &'a dyn CurriculumService,
    pub persistence: &'a dyn PersistenceService,
    pub config: &'a OrchestratorConfig,
    /// Pass number within the session, for fault scoping.
    pub pass: u32,
}

impl WorkerContext<'_> {
    /// Run one generation call bounded by the configured timeout.
    pub async fn generate_bounded(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationPayload, WorkerError> {
        let timeout = self.config.generation_timeout;
        match tokio::time::timeout(timeout, self.generation.generate(request)).await {
            Ok(Ok(payload)) => Ok(payload),
            Ok(Err(e)) => Err(WorkerError::Generation(e)),
            Err(_) => Err(WorkerError::Timeout {
                secs: timeout.as_secs(),
            }),
        }
    }

    /// Section metadata, falling back to a generic title and the configured
    /// default section count when the curriculum has no record.
    pub async fn section_info_or_default(&self, state: &SessionState) -> SectionInfo {
        match self
            .curriculum
            .section_info(state.tier, state.unit, state.section)
            .await
        {
            Some(info) => info,
            None => SectionInfo {
                title: format!("Unit {}, Section {}", state.unit, state.section),
                total_sections: self.config.default_sections_per_unit,
            },
        }
    }
}

/// Result of a successful worker run.
#[derive(Clone, Debug, Default)]
pub struct WorkerOutput {
    /// Worker-specific response fragment, embedded in the structured
    /// response by the finalize step.
    pub content: serde_json::Value,
    /// Non-fatal faults observed during the run (e.g. a persistence write
    /// that failed but was absorbed).
    pub faults: Vec<FaultEvent>,
}

impl WorkerOutput {
    #[must_use]
    pub fn content(content: serde_json::Value) -> Self {
        Self {
            content,
            faults: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_fault(mut self, fault: FaultEvent) -> Self {
        self.faults.push(fault);
        self
    }
}

/// Failures that abort a worker run and trigger the orchestrator fallback.
#[derive(Debug, Error, Diagnostic)]
pub enum WorkerError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Generation(#[from] GenerationError),

    #[error("generation call exceeded {secs}s")]
    #[diagnostic(
        code(tutorgraph::worker::timeout),
        help("raise TUTORGRAPH_GENERATION_TIMEOUT_SECS or check provider latency")
    )]
    Timeout { secs: u64 },

    #[error("worker precondition unmet: {what}")]
    #[diagnostic(code(tutorgraph::worker::precondition))]
    Precondition { what: String },
}

/// One routed step of the tutoring flow.
#[async_trait]
pub trait Worker: Send + Sync {
    fn kind(&self) -> WorkerKind;

    async fn run(
        &self,
        state: &mut SessionState,
        ctx: WorkerContext<'_>,
    ) -> Result<WorkerOutput, WorkerError>;
}
