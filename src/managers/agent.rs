//! Worker transitions, intent normalization, and the routing decision table.
//!
//! Routing is a pure function of stage, normalized intent, and whether an
//! ungraded quiz answer is attached. No generation call or clock read is
//! involved, so the same inputs always select the same worker.

use tracing::debug;

use crate::state::SessionState;
use crate::types::{Intent, Stage, WorkerKind};

/// Hand control to a new worker: the current one becomes `previous_worker`
/// and the UI mode is re-derived from the newcomer.
pub fn transition(state: &mut SessionState, new_worker: WorkerKind) {
    if state.active_worker == new_worker {
        return;
    }
    debug!(from = %state.active_worker, to = %new_worker, "worker transition");
    state.previous_worker = Some(state.active_worker);
    state.active_worker = new_worker;
    apply_ui_mode(state);
}

/// Re-derive the UI mode from the active worker. The mode is never set
/// independently of the worker.
pub fn apply_ui_mode(state: &mut SessionState) {
    state.ui_mode = state.active_worker.ui_mode();
}

/// Classify free-form learner text into an intent.
///
/// A deterministic keyword heuristic: question punctuation or an
/// interrogative opener reads as a question, everything else as a request to
/// advance. Callers with an explicit intent (quiz submission, streaming
/// question) bypass this entirely.
#[must_use]
pub fn normalize_intent(text: &str) -> Intent {
    let trimmed = text.trim();
    if trimmed.contains('?') {
        return Intent::AskQuestion;
    }
    let first_word = trimmed
        .split_whitespace()
        .next()
        .map(str::to_lowercase)
        .unwrap_or_default();
    const INTERROGATIVES: &[&str] = &[
        "what", "why", "how", "when", "where", "who", "which", "can", "could", "does", "do", "is",
        "are", "explain",
    ];
    if INTERROGATIVES.contains(&first_word.as_str()) {
        Intent::AskQuestion
    } else {
        Intent::Advance
    }
}

/// The routing decision table; first matching rule wins.
///
/// An unevaluated submitted answer outranks everything so grading can never
/// be skipped by a stage mismatch. The final rule is the supervisor
/// fallback, reached only when the stage/intent pair matches no flow step.
#[must_use]
pub fn route_intent(stage: Stage, intent: Intent, has_unevaluated_answer: bool) -> WorkerKind {
    let worker = if intent == Intent::SubmitQuizAnswer && has_unevaluated_answer {
        WorkerKind::Feedback
    } else {
        match (stage, intent) {
            (Stage::SessionStart, _) => WorkerKind::Explanation,
            (Stage::ExplanationCompleted, Intent::Advance) => WorkerKind::Quiz,
            (Stage::ExplanationCompleted, i) if i.is_question() => WorkerKind::Question,
            (Stage::QuizAndFeedbackCompleted, Intent::Advance) => WorkerKind::Progression,
            (Stage::QuizAndFeedbackCompleted, i) if i.is_question() => WorkerKind::Question,
            _ => WorkerKind::Supervisor,
        }
    };
    debug!(%stage, %intent, has_unevaluated_answer, %worker, "routed");
    worker
}

/// Route using the state's own stage, intent, and quiz condition.
#[must_use]
pub fn route(state: &SessionState) -> WorkerKind {
    route_intent(
        state.stage,
        state.intent,
        state.quiz.has_unevaluated_answer(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::factory;
    use crate::types::{Tier, UiMode};

    #[test]
    fn transition_tracks_previous_and_ui_mode() {
        let mut state = factory::new_session(1, Tier::TierA, 1, 1);
        transition(&mut state, WorkerKind::Quiz);
        assert_eq!(state.active_worker, WorkerKind::Quiz);
        assert_eq!(state.previous_worker, Some(WorkerKind::Supervisor));
        assert_eq!(state.ui_mode, UiMode::Quiz);

        transition(&mut state, WorkerKind::Feedback);
        assert_eq!(state.previous_worker, Some(WorkerKind::Quiz));
        assert_eq!(state.ui_mode, UiMode::Chat);

        // Self-transition is a no-op; previous stays put.
        transition(&mut state, WorkerKind::Feedback);
        assert_eq!(state.previous_worker, Some(WorkerKind::Quiz));
    }

    #[test]
    fn intent_heuristic_spots_questions() {
        assert_eq!(normalize_intent("what is a closure"), Intent::AskQuestion);
        assert_eq!(normalize_intent("Why does this work"), Intent::AskQuestion);
        assert_eq!(normalize_intent("tell me more?"), Intent::AskQuestion);
        assert_eq!(normalize_intent("next"), Intent::Advance);
        assert_eq!(normalize_intent("let's continue"), Intent::Advance);
        assert_eq!(normalize_intent(""), Intent::Advance);
    }

    #[test]
    fn answer_submission_outranks_stage() {
        // Even at session start, a pending answer routes to feedback.
        assert_eq!(
            route_intent(Stage::SessionStart, Intent::SubmitQuizAnswer, true),
            WorkerKind::Feedback
        );
        // Without a pending answer the submission intent falls through the
        // table; at session start that means the explanation worker.
        assert_eq!(
            route_intent(Stage::SessionStart, Intent::SubmitQuizAnswer, false),
            WorkerKind::Explanation
        );
    }

    #[test]
    fn routing_table_covers_the_section_flow() {
        use Intent::*;
        use Stage::*;
        use WorkerKind::*;

        assert_eq!(route_intent(SessionStart, Advance, false), Explanation);
        assert_eq!(route_intent(SessionStart, AskQuestion, false), Explanation);
        assert_eq!(route_intent(ExplanationCompleted, Advance, false), Quiz);
        assert_eq!(
            route_intent(ExplanationCompleted, AskQuestion, false),
            Question
        );
        assert_eq!(
            route_intent(ExplanationCompleted, QuestionStreaming, false),
            Question
        );
        assert_eq!(
            route_intent(QuizAndFeedbackCompleted, Advance, false),
            Progression
        );
        assert_eq!(
            route_intent(QuizAndFeedbackCompleted, QuestionStreaming, false),
            Question
        );
        // No flow step matches: supervisor fallback.
        assert_eq!(
            route_intent(QuizAndFeedbackCompleted, SubmitQuizAnswer, false),
            WorkerKind::Supervisor
        );
        assert_eq!(
            route_intent(ExplanationCompleted, SubmitQuizAnswer, false),
            WorkerKind::Supervisor
        );
    }

    #[test]
    fn route_reads_state_fields() {
        let mut state = factory::new_session(1, Tier::TierA, 1, 1);
        assert_eq!(route(&state), WorkerKind::Explanation);

        state.stage = Stage::ExplanationCompleted;
        state.intent = Intent::SubmitQuizAnswer;
        state.quiz.prompt = "q".to_string();
        state.quiz.learner_answer = "2".to_string();
        assert_eq!(route(&state), WorkerKind::Feedback);
    }
}
