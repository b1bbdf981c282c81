//! Session state model for the tutoring workflow.
//!
//! [`SessionState`] is the single canonical record describing where one
//! learner is right now: identity, curriculum position, stage, UI mode, quiz
//! payload, worker drafts, routing hints, transcript, retained summaries, and
//! the last structured response handed back to the caller.
//!
//! The state is pure data. All behavior lives in the factory
//! ([`crate::state::factory`]), the validator ([`crate::state::validator`]),
//! and the domain managers ([`crate::managers`]). Managers mutate the state
//! through an exclusive reference owned by the orchestrator for the duration
//! of one pass; the registry clones at its read/write boundary, so `Clone`
//! doubles as the deep-copy operation.
//!
//! # Examples
//!
//! ```rust
//! use tutorgraph::state::factory;
//! use tutorgraph::types::{Stage, Tier, UiMode};
//!
//! let state = factory::new_session(42, Tier::TierA, 1, 1);
//! assert_eq!(state.stage, Stage::SessionStart);
//! assert_eq!(state.ui_mode, UiMode::Chat);
//! assert!(state.quiz.is_empty());
//! ```

pub mod factory;
pub mod validator;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Decision, Intent, MessageKind, Stage, Tier, UiMode, WorkerKind};

/// Maximum retained per-section outcome summaries (ring semantics).
pub const MAX_SUMMARIES: usize = 5;

/// The canonical per-learner session record.
///
/// One active instance exists per learner at a time; the session registry
/// enforces this by overwriting unconditionally on store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    // Identity.
    pub learner_id: i64,
    pub tier: Tier,

    // Curriculum position, both 1-based.
    pub unit: u32,
    pub section: u32,

    // Session phase and derived UI mode.
    pub stage: Stage,
    pub ui_mode: UiMode,

    // Worker bookkeeping and routing hints.
    pub active_worker: WorkerKind,
    pub previous_worker: Option<WorkerKind>,
    pub intent: Intent,

    // Quiz payload; variant-tagged, see [`QuizState`].
    pub quiz: QuizState,

    // Per-worker draft buffers, overwritten never appended.
    pub explanation_draft: String,
    pub quiz_draft: String,
    pub feedback_draft: String,
    pub question_draft: String,

    // Retry-vs-proceed decision, set only at the completion step.
    pub decision: Decision,

    // Append-only conversation log; insertion order is meaningful.
    pub transcript: Vec<TranscriptEntry>,

    // Bounded ring of recent section outcomes for long-term context.
    pub summaries: Vec<SectionSummary>,

    // Elapsed-time bookkeeping.
    pub started_at: DateTime<Utc>,
    /// Sessions run at the current position (retries increment this).
    pub pass_count: u32,

    // Last fully-assembled payload handed back to the caller.
    pub last_response: Option<StructuredResponse>,
}

/// One entry in the append-only conversation log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// `"learner"` or a worker identifier.
    pub author: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub kind: MessageKind,
    /// Stage at the time the entry was appended.
    pub stage: Stage,
}

impl TranscriptEntry {
    /// Author string used for learner-originated entries.
    pub const LEARNER: &'static str = "learner";

    #[must_use]
    pub fn learner(text: impl Into<String>, stage: Stage) -> Self {
        Self {
            author: Self::LEARNER.to_string(),
            text: text.into(),
            timestamp: Utc::now(),
            kind: MessageKind::Learner,
            stage,
        }
    }

    #[must_use]
    pub fn worker(worker: WorkerKind, text: impl Into<String>, stage: Stage) -> Self {
        Self {
            author: worker.as_str().to_string(),
            text: text.into(),
            timestamp: Utc::now(),
            kind: MessageKind::Worker,
            stage,
        }
    }

    #[must_use]
    pub fn is_learner(&self) -> bool {
        self.kind == MessageKind::Learner
    }
}

/// Compact per-section outcome record retained for the question worker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub unit: u32,
    pub section: u32,
    pub topic: String,
    pub summary: String,
    pub recorded_at: DateTime<Utc>,
}

/// A computed curriculum position produced by the rollover rule and applied
/// by the factory reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextPosition {
    pub unit: u32,
    pub section: u32,
}

/// Which quiz variant is currently tagged on the state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizKind {
    #[default]
    ClosedForm,
    OpenForm,
}

impl QuizKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizKind::ClosedForm => "closed_form",
            QuizKind::OpenForm => "open_form",
        }
    }
}

/// Quiz slice of the session state.
///
/// Both variant field groups are materialized so resets, serialization, and
/// mid-transition residue detection work the way the validator expects, but
/// the invariant is that whenever `prompt` is non-empty exactly one group is
/// populated and the other is at its defaults. Ingestion from a generated
/// payload always clears the inactive group; residue is surfaced as a
/// validation warning, not a hard failure, because a worker mid-transition
/// may legitimately leave it for one pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizState {
    pub kind: QuizKind,
    /// Question text; empty means no quiz content exists yet.
    pub prompt: String,

    // Closed-form group.
    pub options: Vec<String>,
    /// 1-based index into `options`; `None` until populated.
    pub correct_option: Option<u32>,
    pub explanation: String,
    pub answered_correctly: bool,

    // Open-form group.
    pub sample_answer: String,
    pub criteria: Vec<String>,
    /// 0–100, meaningful only for the open-form variant.
    pub score: u32,

    // Common to both variants.
    pub hint: String,
    pub hint_usage: u32,
    pub learner_answer: String,
    pub feedback: String,
    /// Set once the attached answer has been graded.
    pub answer_evaluated: bool,
}

impl QuizState {
    /// True when no quiz content has been generated yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prompt.is_empty()
    }

    /// True when an answer is attached to existing quiz content but not yet
    /// graded. An answer without quiz content counts as nothing; there is no
    /// key to grade it against.
    #[must_use]
    pub fn has_unevaluated_answer(&self) -> bool {
        !self.is_empty() && !self.learner_answer.is_empty() && !self.answer_evaluated
    }

    /// True when any closed-form field is non-default.
    #[must_use]
    pub fn closed_form_populated(&self) -> bool {
        !self.options.is_empty() || self.correct_option.is_some() || !self.explanation.is_empty()
    }

    /// True when any open-form field is non-default.
    #[must_use]
    pub fn open_form_populated(&self) -> bool {
        !self.sample_answer.is_empty() || !self.criteria.is_empty() || self.score != 0
    }
}

/// The final payload assembled by the supervisor finalize step and handed
/// back to the (out-of-scope) API layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructuredResponse {
    pub worker: WorkerKind,
    pub stage: Stage,
    pub ui_mode: UiMode,
    /// Worker-specific content fragment (explanation text, quiz payload,
    /// feedback, transition summary, or the fallback notice).
    pub content: serde_json::Value,
}

impl SessionState {
    /// Draft buffer owned by the given worker, if it has one.
    ///
    /// The supervisor and progression workers own no draft; they compose
    /// responses from the others' buffers.
    #[must_use]
    pub fn draft(&self, worker: WorkerKind) -> Option<&str> {
        match worker {
            WorkerKind::Explanation => Some(&self.explanation_draft),
            WorkerKind::Quiz => Some(&self.quiz_draft),
            WorkerKind::Feedback => Some(&self.feedback_draft),
            WorkerKind::Question => Some(&self.question_draft),
            WorkerKind::Progression | WorkerKind::Supervisor => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_state_default_is_empty() {
        let quiz = QuizState::default();
        assert!(quiz.is_empty());
        assert!(!quiz.closed_form_populated());
        assert!(!quiz.open_form_populated());
        assert!(!quiz.has_unevaluated_answer());
    }

    #[test]
    fn unevaluated_answer_requires_pending_grade() {
        let mut quiz = QuizState {
            prompt: "2 + 2?".to_string(),
            learner_answer: "2".to_string(),
            ..Default::default()
        };
        assert!(quiz.has_unevaluated_answer());
        quiz.answer_evaluated = true;
        assert!(!quiz.has_unevaluated_answer());
    }

    #[test]
    fn answer_without_quiz_content_does_not_count() {
        let quiz = QuizState {
            learner_answer: "2".to_string(),
            ..Default::default()
        };
        assert!(quiz.is_empty());
        assert!(!quiz.has_unevaluated_answer());
    }

    #[test]
    fn transcript_entry_constructors_tag_kind() {
        let learner = TranscriptEntry::learner("hi", Stage::SessionStart);
        assert!(learner.is_learner());
        assert_eq!(learner.author, TranscriptEntry::LEARNER);

        let worker = TranscriptEntry::worker(
            crate::types::WorkerKind::Explanation,
            "draft",
            Stage::SessionStart,
        );
        assert!(!worker.is_learner());
        assert_eq!(worker.author, "explanation_worker");
    }
}
