//! Quiz lifecycle: payload ingestion, answer capture, grading, hints.

use tracing::debug;

use crate::collaborators::{GenerationError, QuizPayload};
use crate::state::{QuizKind, QuizState, SessionState};

/// Install generated quiz content on the state.
///
/// The payload is structurally checked first; a malformed payload leaves the
/// existing quiz untouched. On success the entire quiz slice is rebuilt, so
/// no residue from the previous variant survives ingestion.
pub fn populate_from_payload(
    state: &mut SessionState,
    payload: &QuizPayload,
) -> Result<(), GenerationError> {
    payload.check()?;
    state.quiz = match payload {
        QuizPayload::ClosedForm {
            prompt,
            options,
            correct_option,
            explanation,
            hint,
        } => QuizState {
            kind: QuizKind::ClosedForm,
            prompt: prompt.clone(),
            options: options.clone(),
            correct_option: Some(*correct_option),
            explanation: explanation.clone(),
            hint: hint.clone(),
            ..Default::default()
        },
        QuizPayload::OpenForm {
            prompt,
            sample_answer,
            criteria,
            hint,
        } => QuizState {
            kind: QuizKind::OpenForm,
            prompt: prompt.clone(),
            sample_answer: sample_answer.clone(),
            criteria: criteria.clone(),
            hint: hint.clone(),
            ..Default::default()
        },
    };
    debug!(kind = state.quiz.kind.as_str(), "quiz payload installed");
    Ok(())
}

/// Attach the learner's answer, clearing any previous evaluation.
pub fn capture_answer(state: &mut SessionState, answer: impl Into<String>) {
    state.quiz.learner_answer = answer.into();
    state.quiz.answer_evaluated = false;
    state.quiz.feedback.clear();
}

/// Grade the attached answer against the closed-form key.
///
/// The answer is parsed as a 1-based option index; anything non-numeric or
/// out of range grades as incorrect rather than failing. Marks the answer
/// evaluated and returns correctness.
pub fn grade_closed_form(state: &mut SessionState) -> bool {
    let quiz = &mut state.quiz;
    let correct = quiz
        .learner_answer
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|picked| *picked >= 1 && *picked as usize <= quiz.options.len())
        .is_some_and(|picked| Some(picked) == quiz.correct_option);
    quiz.answered_correctly = correct;
    quiz.answer_evaluated = true;
    correct
}

/// Record an externally-evaluated open-form result. Scores clamp to 0..=100.
pub fn record_open_form_result(state: &mut SessionState, score: u32, feedback: impl Into<String>) {
    state.quiz.score = score.min(100);
    state.quiz.feedback = feedback.into();
    state.quiz.answer_evaluated = true;
}

pub fn increment_hint_use(state: &mut SessionState) {
    state.quiz.hint_usage = state.quiz.hint_usage.saturating_add(1);
}

pub fn reset_hint_use(state: &mut SessionState) {
    state.quiz.hint_usage = 0;
}

/// Drop all quiz content, returning the slice to its empty default.
pub fn clear_quiz(state: &mut SessionState) {
    state.quiz = QuizState::default();
}

/// Uniform 0..=100 score across both variants: closed-form maps correctness
/// to 100/0, open-form reports its evaluated score.
#[must_use]
pub fn combined_score(state: &SessionState) -> u32 {
    match state.quiz.kind {
        QuizKind::ClosedForm => {
            if state.quiz.answered_correctly {
                100
            } else {
                0
            }
        }
        QuizKind::OpenForm => state.quiz.score,
    }
}

/// True once quiz content exists and its answer has been graded.
#[must_use]
pub fn is_quiz_completed(state: &SessionState) -> bool {
    !state.quiz.is_empty() && state.quiz.answer_evaluated
}
