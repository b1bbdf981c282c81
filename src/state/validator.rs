//! Staged consistency checks over [`SessionState`].
//!
//! Value domains are already closed by the type system, so the validator
//! focuses on the business rules that types cannot express: positive
//! identifiers, 1-based positions, score bounds, option-index agreement, and
//! quiz-variant residue. Checks run in a fixed order and the report records
//! which stages ran, so a failed validation pinpoints its stage.
//!
//! Two severities exist. Errors mean the state must not be stored as-is.
//! Warnings flag suspicious but tolerable shapes, like residue from the
//! inactive quiz variant, which a worker mid-transition may legitimately
//! leave for one pass.

use tracing::warn;

use crate::state::SessionState;

/// One finding produced by a validation stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Stage that produced the finding, e.g. `"business_rules"`.
    pub check: &'static str,
    pub message: String,
}

/// Outcome of a full validation run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    /// Names of the stages that ran, in order.
    pub checks: Vec<String>,
}

const CHECK_IDENTITY: &str = "identity";
const CHECK_POSITION: &str = "position";
const CHECK_BUSINESS: &str = "business_rules";
const CHECK_QUIZ: &str = "quiz_variant";
const CHECK_STRICT: &str = "strict_coupling";

/// Full validation; true when no errors were found.
#[must_use]
pub fn validate(state: &SessionState) -> bool {
    report(state).valid
}

/// Full validation with findings, excluding the strict coupling stage.
#[must_use]
pub fn report(state: &SessionState) -> ValidationReport {
    let mut rep = ValidationReport {
        valid: true,
        ..Default::default()
    };
    check_identity(state, &mut rep);
    check_position(state, &mut rep);
    check_business_rules(state, &mut rep);
    check_quiz_variant(state, &mut rep);
    rep.valid = rep.errors.is_empty();
    rep
}

/// Identity and position only; the cheap gate used on the hot path before a
/// pass starts.
#[must_use]
pub fn quick_validate(state: &SessionState) -> bool {
    state.learner_id > 0 && state.unit >= 1 && state.section >= 1
}

/// Full validation plus the UI-mode/active-worker coupling rule.
#[must_use]
pub fn validate_strict(state: &SessionState) -> ValidationReport {
    let mut rep = report(state);
    rep.checks.push(CHECK_STRICT.to_string());
    let expected = state.active_worker.ui_mode();
    if state.ui_mode != expected {
        rep.errors.push(ValidationIssue {
            check: CHECK_STRICT,
            message: format!(
                "ui mode {} does not match active worker {} (expected {})",
                state.ui_mode, state.active_worker, expected
            ),
        });
    }
    rep.valid = rep.errors.is_empty();
    rep
}

/// Coerce the UI mode to the one derived from the active worker, logging
/// when a correction happens. Used by the orchestrator after each pass.
pub fn auto_correct_ui_mode(state: &mut SessionState) {
    let expected = state.active_worker.ui_mode();
    if state.ui_mode != expected {
        warn!(
            learner_id = state.learner_id,
            worker = %state.active_worker,
            from = %state.ui_mode,
            to = %expected,
            "correcting drifted ui mode"
        );
        state.ui_mode = expected;
    }
}

fn check_identity(state: &SessionState, rep: &mut ValidationReport) {
    rep.checks.push(CHECK_IDENTITY.to_string());
    if state.learner_id <= 0 {
        rep.errors.push(ValidationIssue {
            check: CHECK_IDENTITY,
            message: format!("learner_id must be positive, got {}", state.learner_id),
        });
    }
}

fn check_position(state: &SessionState, rep: &mut ValidationReport) {
    rep.checks.push(CHECK_POSITION.to_string());
    if state.unit < 1 {
        rep.errors.push(ValidationIssue {
            check: CHECK_POSITION,
            message: "unit must be >= 1".to_string(),
        });
    }
    if state.section < 1 {
        rep.errors.push(ValidationIssue {
            check: CHECK_POSITION,
            message: "section must be >= 1".to_string(),
        });
    }
    let cap = state.tier.max_units();
    if state.unit > cap {
        rep.errors.push(ValidationIssue {
            check: CHECK_POSITION,
            message: format!("unit {} exceeds tier cap {}", state.unit, cap),
        });
    }
}

fn check_business_rules(state: &SessionState, rep: &mut ValidationReport) {
    rep.checks.push(CHECK_BUSINESS.to_string());
    let quiz = &state.quiz;

    if quiz.open_form_populated() && quiz.score > 100 {
        rep.errors.push(ValidationIssue {
            check: CHECK_BUSINESS,
            message: format!("open-form score {} outside 0..=100", quiz.score),
        });
    }
    if let Some(correct) = quiz.correct_option {
        if !quiz.options.is_empty() && (correct == 0 || correct as usize > quiz.options.len()) {
            rep.errors.push(ValidationIssue {
                check: CHECK_BUSINESS,
                message: format!(
                    "correct_option {} outside 1..={}",
                    correct,
                    quiz.options.len()
                ),
            });
        }
    }
    if quiz.answer_evaluated && quiz.learner_answer.is_empty() {
        rep.errors.push(ValidationIssue {
            check: CHECK_BUSINESS,
            message: "answer marked evaluated but no answer is attached".to_string(),
        });
    }
}

fn check_quiz_variant(state: &SessionState, rep: &mut ValidationReport) {
    rep.checks.push(CHECK_QUIZ.to_string());
    let quiz = &state.quiz;
    if quiz.is_empty() {
        // Residue without content is still worth flagging.
        if quiz.closed_form_populated() || quiz.open_form_populated() {
            rep.warnings.push(ValidationIssue {
                check: CHECK_QUIZ,
                message: "quiz fields populated without a prompt".to_string(),
            });
        }
        return;
    }
    match quiz.kind {
        crate::state::QuizKind::ClosedForm => {
            if quiz.open_form_populated() {
                rep.warnings.push(ValidationIssue {
                    check: CHECK_QUIZ,
                    message: "closed-form quiz carries open-form residue".to_string(),
                });
            }
        }
        crate::state::QuizKind::OpenForm => {
            if quiz.closed_form_populated() {
                rep.warnings.push(ValidationIssue {
                    check: CHECK_QUIZ,
                    message: "open-form quiz carries closed-form residue".to_string(),
                });
            }
        }
    }
}
