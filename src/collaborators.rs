//! Trait seams for the orchestrator's external collaborators.
//!
//! The orchestrator never talks to a model provider, curriculum store, or
//! database directly. It goes through three async traits so tests can swap
//! in deterministic stubs and production can bind real backends:
//!
//! - [`GenerationService`]: produces explanation, quiz, evaluation, and
//!   answer content.
//! - [`CurriculumService`]: resolves curriculum positions to section
//!   metadata.
//! - [`PersistenceService`]: durably records completed sections;
//!   fire-and-forget from the caller's perspective.

use async_trait::async_trait;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::TranscriptEntry;
use crate::types::Tier;

/// What the generation service is being asked to produce.
#[derive(Clone, Debug, PartialEq)]
pub enum GenerationRequest {
    /// Explanation text for the current section.
    Explanation {
        tier: Tier,
        unit: u32,
        section: u32,
        topic: String,
    },
    /// A quiz payload for the current section, grounded in the explanation.
    Quiz {
        tier: Tier,
        unit: u32,
        section: u32,
        explanation: String,
    },
    /// Grade a free-text answer against a sample answer and criteria.
    Evaluation {
        prompt: String,
        sample_answer: String,
        criteria: Vec<String>,
        learner_answer: String,
    },
    /// Answer a free-form learner question with section context.
    Answer {
        question: String,
        section_context: String,
        recent_summaries: Vec<String>,
    },
}

/// Successful generation result, one variant per request kind.
#[derive(Clone, Debug, PartialEq)]
pub enum GenerationPayload {
    Explanation(String),
    Quiz(QuizPayload),
    Evaluation { score: u32, feedback: String },
    Answer(String),
}

/// Quiz content as produced by the generation service.
///
/// Internally tagged so a serialized payload carries its variant explicitly;
/// a shape mismatch fails at the ingestion boundary instead of leaking a
/// half-populated quiz into the session state.
///
/// ```json
/// {"type": "closed_form", "prompt": "...", "options": ["a", "b"],
///  "correct_option": 2, "explanation": "...", "hint": "..."}
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuizPayload {
    ClosedForm {
        prompt: String,
        options: Vec<String>,
        /// 1-based index into `options`.
        correct_option: u32,
        explanation: String,
        #[serde(default)]
        hint: String,
    },
    OpenForm {
        prompt: String,
        sample_answer: String,
        criteria: Vec<String>,
        #[serde(default)]
        hint: String,
    },
}

impl QuizPayload {
    #[must_use]
    pub fn prompt(&self) -> &str {
        match self {
            QuizPayload::ClosedForm { prompt, .. } | QuizPayload::OpenForm { prompt, .. } => prompt,
        }
    }

    /// Structural checks beyond what serde enforces: non-empty prompt, and
    /// for closed-form a correct option inside the option list.
    pub fn check(&self) -> Result<(), GenerationError> {
        match self {
            QuizPayload::ClosedForm {
                prompt,
                options,
                correct_option,
                ..
            } => {
                if prompt.is_empty() {
                    return Err(GenerationError::MalformedPayload {
                        reason: "closed-form quiz has an empty prompt".to_string(),
                    });
                }
                if options.len() < 2 {
                    return Err(GenerationError::MalformedPayload {
                        reason: format!("closed-form quiz has {} option(s)", options.len()),
                    });
                }
                if *correct_option == 0 || *correct_option as usize > options.len() {
                    return Err(GenerationError::MalformedPayload {
                        reason: format!(
                            "correct_option {} outside 1..={}",
                            correct_option,
                            options.len()
                        ),
                    });
                }
                Ok(())
            }
            QuizPayload::OpenForm {
                prompt,
                sample_answer,
                ..
            } => {
                if prompt.is_empty() {
                    return Err(GenerationError::MalformedPayload {
                        reason: "open-form quiz has an empty prompt".to_string(),
                    });
                }
                if sample_answer.is_empty() {
                    return Err(GenerationError::MalformedPayload {
                        reason: "open-form quiz has an empty sample answer".to_string(),
                    });
                }
                Ok(())
            }
        }
    }
}

/// Errors surfaced by a generation backend.
#[derive(Debug, Error, Diagnostic)]
pub enum GenerationError {
    #[error("generation provider failure: {message}")]
    #[diagnostic(
        code(tutorgraph::generation::provider),
        help("the backing provider rejected or failed the request; the worker falls back to a canned draft")
    )]
    Provider { message: String },

    #[error("generation payload malformed: {reason}")]
    #[diagnostic(
        code(tutorgraph::generation::malformed),
        help("payload failed ingestion validation; no partial content reaches the session state")
    )]
    MalformedPayload { reason: String },

    #[error("generation returned the wrong payload kind for the request")]
    #[diagnostic(code(tutorgraph::generation::kind_mismatch))]
    KindMismatch,
}

/// Metadata for one curriculum section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionInfo {
    pub title: String,
    /// Sections in the containing unit.
    pub total_sections: u32,
}

/// Snapshot persisted when a section completes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompletedSessionRecord {
    pub learner_id: i64,
    pub tier: Tier,
    pub unit: u32,
    pub section: u32,
    pub decision: String,
    pub quiz_score: u32,
    pub duration_secs: i64,
    pub summary: String,
    pub transcript: Vec<TranscriptEntry>,
}

/// Produces learner-facing content.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, request: GenerationRequest)
        -> Result<GenerationPayload, GenerationError>;
}

/// Resolves curriculum positions to section metadata.
#[async_trait]
pub trait CurriculumService: Send + Sync {
    /// `None` means the position is unknown; callers fall back to
    /// [`crate::config::OrchestratorConfig::DEFAULT_SECTIONS_PER_UNIT`] and
    /// a generic title.
    async fn section_info(&self, tier: Tier, unit: u32, section: u32) -> Option<SectionInfo>;
}

/// Durable sink for completed-section records.
#[async_trait]
pub trait PersistenceService: Send + Sync {
    /// Failures are logged by the caller and never propagated to the learner.
    async fn store_completed(&self, record: CompletedSessionRecord) -> Result<(), FaultMessage>;
}

/// Minimal opaque error for persistence backends.
#[derive(Debug, Error, Diagnostic)]
#[error("persistence failure: {0}")]
#[diagnostic(code(tutorgraph::persistence::store))]
pub struct FaultMessage(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_payload_round_trips_with_type_tag() {
        let payload = QuizPayload::ClosedForm {
            prompt: "2 + 2?".to_string(),
            options: vec!["3".to_string(), "4".to_string()],
            correct_option: 2,
            explanation: "basic addition".to_string(),
            hint: String::new(),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["type"], "closed_form");
        let back: QuizPayload = serde_json::from_value(value).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn closed_form_check_rejects_out_of_range_answer() {
        let payload = QuizPayload::ClosedForm {
            prompt: "pick one".to_string(),
            options: vec!["a".to_string(), "b".to_string()],
            correct_option: 3,
            explanation: String::new(),
            hint: String::new(),
        };
        assert!(payload.check().is_err());
    }

    #[test]
    fn open_form_check_requires_sample_answer() {
        let payload = QuizPayload::OpenForm {
            prompt: "explain ownership".to_string(),
            sample_answer: String::new(),
            criteria: vec!["mentions borrowing".to_string()],
            hint: String::new(),
        };
        assert!(payload.check().is_err());
    }

    #[test]
    fn mixed_shape_fails_deserialization() {
        // A closed_form tag with open-form fields must not parse.
        let raw = serde_json::json!({
            "type": "closed_form",
            "prompt": "q",
            "sample_answer": "a",
            "criteria": []
        });
        assert!(serde_json::from_value::<QuizPayload>(raw).is_err());
    }
}
