//! Core vocabulary types for the tutoring workflow.
//!
//! Worker identifiers, session stages, UI modes, learner intents, tiers, and
//! retry decisions are all closed enums. Dispatch happens through exhaustive
//! `match`, so an unknown worker or stage is unrepresentable rather than a
//! runtime lookup failure.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one specialized worker in the tutoring workflow.
///
/// Workers are the units the router selects between: each incoming learner
/// action results in exactly one worker invocation (plus the supervisor
/// finalize step).
///
/// # Examples
///
/// ```rust
/// use tutorgraph::types::WorkerKind;
///
/// assert_eq!(WorkerKind::Quiz.as_str(), "quiz_worker");
/// assert_eq!(format!("{}", WorkerKind::Supervisor), "supervisor");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerKind {
    /// Produces the explanation draft for the current section.
    Explanation,
    /// Generates the quiz payload and switches the UI into quiz mode.
    Quiz,
    /// Grades the learner's answer and produces the feedback draft.
    Feedback,
    /// Answers free-form learner questions.
    Question,
    /// Completes the section: rollover, summary retention, persistence.
    Progression,
    /// Entry/exit node; also the direct-response fallback target.
    Supervisor,
}

impl WorkerKind {
    /// Stable snake_case identifier, used in logs and serialized records.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerKind::Explanation => "explanation_worker",
            WorkerKind::Quiz => "quiz_worker",
            WorkerKind::Feedback => "feedback_worker",
            WorkerKind::Question => "question_worker",
            WorkerKind::Progression => "progression_worker",
            WorkerKind::Supervisor => "supervisor",
        }
    }

    /// The UI mode a learner should see while this worker is active.
    ///
    /// Quiz mode exists only while the quiz worker is active; everything else
    /// is ordinary chat.
    #[must_use]
    pub fn ui_mode(&self) -> UiMode {
        match self {
            WorkerKind::Quiz => UiMode::Quiz,
            _ => UiMode::Chat,
        }
    }

    /// Parse the stable identifier form. Unknown strings map to `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "explanation_worker" => Some(WorkerKind::Explanation),
            "quiz_worker" => Some(WorkerKind::Quiz),
            "feedback_worker" => Some(WorkerKind::Feedback),
            "question_worker" => Some(WorkerKind::Question),
            "progression_worker" => Some(WorkerKind::Progression),
            "supervisor" => Some(WorkerKind::Supervisor),
            _ => None,
        }
    }
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse phase of a single curriculum-section session.
///
/// The stage is strictly ordered within one section:
/// `SessionStart → ExplanationCompleted → QuizAndFeedbackCompleted`, and it
/// resets to `SessionStart` when the position advances. No other transition
/// is reachable through the progression manager.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    SessionStart,
    ExplanationCompleted,
    QuizAndFeedbackCompleted,
}

impl Stage {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::SessionStart => "session_start",
            Stage::ExplanationCompleted => "explanation_completed",
            Stage::QuizAndFeedbackCompleted => "quiz_and_feedback_completed",
        }
    }

    /// Ordinal used to assert forward-only movement.
    #[must_use]
    pub fn rank(&self) -> u8 {
        match self {
            Stage::SessionStart => 0,
            Stage::ExplanationCompleted => 1,
            Stage::QuizAndFeedbackCompleted => 2,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frontend mode derived from the active worker, never set independently.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiMode {
    #[default]
    Chat,
    Quiz,
}

impl UiMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            UiMode::Chat => "chat",
            UiMode::Quiz => "quiz",
        }
    }
}

impl fmt::Display for UiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized classification of the learner's latest input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Proceed to the next step of the section flow.
    #[default]
    Advance,
    /// Free-form question for the question worker.
    AskQuestion,
    /// A quiz answer is attached and awaits evaluation.
    SubmitQuizAnswer,
    /// Streaming variant of a question request; routed like `AskQuestion`.
    QuestionStreaming,
}

impl Intent {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Advance => "advance",
            Intent::AskQuestion => "ask_question",
            Intent::SubmitQuizAnswer => "submit_quiz_answer",
            Intent::QuestionStreaming => "question_streaming",
        }
    }

    /// True for both the plain and streaming question intents.
    #[must_use]
    pub fn is_question(&self) -> bool {
        matches!(self, Intent::AskQuestion | Intent::QuestionStreaming)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Learner tier, assigned by an out-of-scope diagnosis step.
///
/// The tier bounds how many units the curriculum has for this learner:
/// tier-A learners have 8 units, tier-B 10. `Unassigned` falls back to the
/// tier-A bound.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    #[default]
    Unassigned,
    TierA,
    TierB,
}

impl Tier {
    /// Last known unit for this tier; position never advances past it.
    #[must_use]
    pub fn max_units(&self) -> u32 {
        match self {
            Tier::Unassigned | Tier::TierA => 8,
            Tier::TierB => 10,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Unassigned => "unassigned",
            Tier::TierA => "tier_a",
            Tier::TierB => "tier_b",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Retry-vs-proceed decision captured at the feedback/completion step and
/// consumed by the progression worker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// No decision recorded yet.
    #[default]
    Undecided,
    Proceed,
    Retry,
}

impl Decision {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Undecided => "undecided",
            Decision::Proceed => "proceed",
            Decision::Retry => "retry",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies transcript entries by author category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Learner,
    #[default]
    Worker,
    Tool,
}

impl MessageKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Learner => "learner",
            MessageKind::Worker => "worker",
            MessageKind::Tool => "tool",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_kind_round_trips_through_identifier() {
        for kind in [
            WorkerKind::Explanation,
            WorkerKind::Quiz,
            WorkerKind::Feedback,
            WorkerKind::Question,
            WorkerKind::Progression,
            WorkerKind::Supervisor,
        ] {
            assert_eq!(WorkerKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(WorkerKind::parse("router"), None);
    }

    #[test]
    fn ui_mode_is_quiz_only_for_quiz_worker() {
        assert_eq!(WorkerKind::Quiz.ui_mode(), UiMode::Quiz);
        assert_eq!(WorkerKind::Explanation.ui_mode(), UiMode::Chat);
        assert_eq!(WorkerKind::Feedback.ui_mode(), UiMode::Chat);
        assert_eq!(WorkerKind::Supervisor.ui_mode(), UiMode::Chat);
    }

    #[test]
    fn stage_ranks_are_strictly_ordered() {
        assert!(Stage::SessionStart.rank() < Stage::ExplanationCompleted.rank());
        assert!(Stage::ExplanationCompleted.rank() < Stage::QuizAndFeedbackCompleted.rank());
    }

    #[test]
    fn tier_unit_bounds() {
        assert_eq!(Tier::TierA.max_units(), 8);
        assert_eq!(Tier::TierB.max_units(), 10);
        assert_eq!(Tier::Unassigned.max_units(), 8);
    }
}
