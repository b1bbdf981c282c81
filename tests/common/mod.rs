//! Shared stub collaborators for integration tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use tutorgraph::collaborators::{
    CompletedSessionRecord, CurriculumService, FaultMessage, GenerationError, GenerationPayload,
    GenerationRequest, GenerationService, PersistenceService, QuizPayload, SectionInfo,
};
use tutorgraph::config::OrchestratorConfig;
use tutorgraph::orchestrator::Orchestrator;
use tutorgraph::types::Tier;

/// Deterministic generation backend driven by request kind.
pub struct StubGeneration {
    /// When set, every call fails with a provider error.
    pub fail: AtomicBool,
    /// When set, every call sleeps past any reasonable test timeout.
    pub stall: AtomicBool,
    /// Quiz variant served by quiz requests.
    pub open_form: AtomicBool,
}

impl Default for StubGeneration {
    fn default() -> Self {
        Self {
            fail: AtomicBool::new(false),
            stall: AtomicBool::new(false),
            open_form: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl GenerationService for StubGeneration {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationPayload, GenerationError> {
        if self.stall.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(GenerationError::Provider {
                message: "stub backend told to fail".to_string(),
            });
        }
        Ok(match request {
            GenerationRequest::Explanation { unit, section, .. } => GenerationPayload::Explanation(
                format!("Explanation for unit {unit} section {section}."),
            ),
            GenerationRequest::Quiz { .. } => {
                if self.open_form.load(Ordering::SeqCst) {
                    GenerationPayload::Quiz(QuizPayload::OpenForm {
                        prompt: "Explain the main idea in your own words.".to_string(),
                        sample_answer: "A model answer.".to_string(),
                        criteria: vec!["mentions the main idea".to_string()],
                        hint: "think back to the explanation".to_string(),
                    })
                } else {
                    GenerationPayload::Quiz(QuizPayload::ClosedForm {
                        prompt: "Which option is right?".to_string(),
                        options: vec!["wrong".to_string(), "right".to_string()],
                        correct_option: 2,
                        explanation: "The second option matches the text.".to_string(),
                        hint: "re-read the second paragraph".to_string(),
                    })
                }
            }
            GenerationRequest::Evaluation { learner_answer, .. } => {
                GenerationPayload::Evaluation {
                    score: if learner_answer.is_empty() { 0 } else { 80 },
                    feedback: "Good coverage of the main idea.".to_string(),
                }
            }
            GenerationRequest::Answer { question, .. } => {
                GenerationPayload::Answer(format!("Here is an answer to: {question}"))
            }
        })
    }
}

/// Curriculum with four sections per unit and fixed titles; unit 99 is
/// deliberately unknown.
pub struct StubCurriculum;

#[async_trait]
impl CurriculumService for StubCurriculum {
    async fn section_info(&self, _tier: Tier, unit: u32, section: u32) -> Option<SectionInfo> {
        if unit == 99 {
            return None;
        }
        Some(SectionInfo {
            title: format!("Topic {unit}.{section}"),
            total_sections: 4,
        })
    }
}

/// Records everything it is asked to store; can be told to fail.
#[derive(Default)]
pub struct StubPersistence {
    pub fail: AtomicBool,
    pub stored: Mutex<Vec<CompletedSessionRecord>>,
}

#[async_trait]
impl PersistenceService for StubPersistence {
    async fn store_completed(&self, record: CompletedSessionRecord) -> Result<(), FaultMessage> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(FaultMessage("stub database unavailable".to_string()));
        }
        self.stored.lock().push(record);
        Ok(())
    }
}

pub struct TestHarness {
    pub generation: Arc<StubGeneration>,
    pub persistence: Arc<StubPersistence>,
    pub orchestrator: Orchestrator,
}

fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

pub fn harness() -> TestHarness {
    harness_with_config(
        OrchestratorConfig::default().with_generation_timeout(Duration::from_millis(200)),
    )
}

pub fn harness_with_config(config: OrchestratorConfig) -> TestHarness {
    init_tracing();
    let generation = Arc::new(StubGeneration::default());
    let persistence = Arc::new(StubPersistence::default());
    let orchestrator = Orchestrator::new(
        Arc::clone(&generation) as Arc<dyn GenerationService>,
        Arc::new(StubCurriculum),
        Arc::clone(&persistence) as Arc<dyn PersistenceService>,
        config,
    );
    TestHarness {
        generation,
        persistence,
        orchestrator,
    }
}
