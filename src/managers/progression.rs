//! Stage advancement, curriculum rollover, and session bookkeeping.

use std::time::Duration;

use tracing::debug;

use crate::state::{NextPosition, SessionState};
use crate::types::{Decision, Stage, WorkerKind};

/// Advance the stage after a worker completes, per the fixed table:
/// explanation done at `SessionStart` moves to `ExplanationCompleted`,
/// feedback done at `ExplanationCompleted` moves to
/// `QuizAndFeedbackCompleted`. Every other combination leaves the stage
/// untouched, which keeps movement strictly forward within a section.
///
/// Returns true when the stage changed.
pub fn advance_stage(state: &mut SessionState, completed_worker: WorkerKind) -> bool {
    let next = match (state.stage, completed_worker) {
        (Stage::SessionStart, WorkerKind::Explanation) => Stage::ExplanationCompleted,
        (Stage::ExplanationCompleted, WorkerKind::Feedback) => Stage::QuizAndFeedbackCompleted,
        _ => return false,
    };
    debug!(from = %state.stage, to = %next, worker = %completed_worker, "stage advanced");
    state.stage = next;
    true
}

/// Record the retry-vs-proceed decision taken at the completion step.
pub fn record_decision(state: &mut SessionState, decision: Decision) {
    state.decision = decision;
}

/// Compute where the learner goes next.
///
/// `Proceed` rolls over: next section within the unit, or section 1 of the
/// next unit at the unit boundary, never past the tier's last unit. `Retry`
/// and `Undecided` return `None`, meaning the position stays put.
#[must_use]
pub fn compute_next_position(
    state: &SessionState,
    decision: Decision,
    max_sections: u32,
) -> Option<NextPosition> {
    if decision != Decision::Proceed {
        return None;
    }
    if state.section < max_sections {
        Some(NextPosition {
            unit: state.unit,
            section: state.section + 1,
        })
    } else if state.unit < state.tier.max_units() {
        Some(NextPosition {
            unit: state.unit + 1,
            section: 1,
        })
    } else {
        // Last section of the last unit; nowhere further to go.
        None
    }
}

/// Elapsed time since the session (or its current section run) started.
#[must_use]
pub fn session_duration(state: &SessionState) -> chrono::Duration {
    chrono::Utc::now() - state.started_at
}

/// True when the session has sat longer than the given idle lifetime.
#[must_use]
pub fn is_expired(state: &SessionState, ttl: Duration) -> bool {
    session_duration(state)
        .to_std()
        .map_or(false, |elapsed| elapsed > ttl)
}

pub fn increment_pass_count(state: &mut SessionState) {
    state.pass_count = state.pass_count.saturating_add(1);
}

/// True when the learner has run at least `limit` passes at this position.
#[must_use]
pub fn is_session_limit_reached(state: &SessionState, limit: u32) -> bool {
    state.pass_count >= limit
}

/// True once the section flow has reached its final stage.
#[must_use]
pub fn is_session_completed(state: &SessionState) -> bool {
    state.stage == Stage::QuizAndFeedbackCompleted
}

/// Fraction of the tier curriculum behind the learner, as a whole percent.
///
/// Counts fully completed sections, so a learner sitting at the very first
/// section reports zero.
#[must_use]
pub fn progress_percentage(state: &SessionState, sections_per_unit: u32) -> u32 {
    let sections_per_unit = sections_per_unit.max(1);
    let total = state.tier.max_units() * sections_per_unit;
    let done = (state.unit - 1) * sections_per_unit + (state.section - 1);
    (done * 100 / total).min(100)
}

/// Human-readable summary of a completed section, used in the progression
/// response and the persisted record.
#[must_use]
pub fn transition_summary(state: &SessionState, score: u32, next: Option<NextPosition>) -> String {
    let destination = match next {
        Some(pos) => format!("moving on to unit {} section {}", pos.unit, pos.section),
        None => match state.decision {
            Decision::Retry => format!("retrying unit {} section {}", state.unit, state.section),
            _ => "curriculum complete".to_string(),
        },
    };
    format!(
        "Finished unit {} section {} with a score of {}; {}.",
        state.unit, state.section, score, destination
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::factory;
    use crate::types::Tier;

    #[test]
    fn stage_table_only_allows_forward_moves() {
        let mut state = factory::new_session(1, Tier::TierA, 1, 1);

        // Quiz completion does not advance the stage on its own.
        assert!(!advance_stage(&mut state, WorkerKind::Quiz));
        assert_eq!(state.stage, Stage::SessionStart);

        assert!(advance_stage(&mut state, WorkerKind::Explanation));
        assert_eq!(state.stage, Stage::ExplanationCompleted);

        // Running explanation again at a later stage is a no-op.
        assert!(!advance_stage(&mut state, WorkerKind::Explanation));
        assert_eq!(state.stage, Stage::ExplanationCompleted);

        assert!(advance_stage(&mut state, WorkerKind::Feedback));
        assert_eq!(state.stage, Stage::QuizAndFeedbackCompleted);
        assert!(is_session_completed(&state));

        assert!(!advance_stage(&mut state, WorkerKind::Feedback));
    }

    #[test]
    fn rollover_within_unit() {
        let state = factory::new_session(1, Tier::TierA, 2, 2);
        let next = compute_next_position(&state, Decision::Proceed, 4).unwrap();
        assert_eq!(next, NextPosition { unit: 2, section: 3 });
    }

    #[test]
    fn rollover_at_unit_boundary() {
        let state = factory::new_session(1, Tier::TierA, 2, 4);
        let next = compute_next_position(&state, Decision::Proceed, 4).unwrap();
        assert_eq!(next, NextPosition { unit: 3, section: 1 });
    }

    #[test]
    fn retry_keeps_position() {
        let state = factory::new_session(1, Tier::TierA, 2, 4);
        assert_eq!(compute_next_position(&state, Decision::Retry, 4), None);
        assert_eq!(compute_next_position(&state, Decision::Undecided, 4), None);
    }

    #[test]
    fn rollover_stops_at_tier_cap() {
        let state = factory::new_session(1, Tier::TierA, 8, 4);
        assert_eq!(compute_next_position(&state, Decision::Proceed, 4), None);

        let state = factory::new_session(1, Tier::TierB, 8, 4);
        let next = compute_next_position(&state, Decision::Proceed, 4).unwrap();
        assert_eq!(next, NextPosition { unit: 9, section: 1 });
    }

    #[test]
    fn progress_counts_completed_sections() {
        let state = factory::new_session(1, Tier::TierA, 1, 1);
        assert_eq!(progress_percentage(&state, 4), 0);

        let state = factory::new_session(1, Tier::TierA, 5, 1);
        assert_eq!(progress_percentage(&state, 4), 50);

        let state = factory::new_session(1, Tier::TierA, 8, 4);
        assert_eq!(progress_percentage(&state, 4), 96);
    }

    #[test]
    fn pass_count_and_limit() {
        let mut state = factory::new_session(1, Tier::TierA, 1, 1);
        assert!(!is_session_limit_reached(&state, 2));
        increment_pass_count(&mut state);
        increment_pass_count(&mut state);
        assert!(is_session_limit_reached(&state, 2));
    }

    #[test]
    fn transition_summary_names_the_destination() {
        let mut state = factory::new_session(1, Tier::TierA, 1, 2);
        let summary =
            transition_summary(&state, 85, Some(NextPosition { unit: 1, section: 3 }));
        assert!(summary.contains("unit 1 section 2"));
        assert!(summary.contains("unit 1 section 3"));
        assert!(summary.contains("85"));

        record_decision(&mut state, Decision::Retry);
        let summary = transition_summary(&state, 40, None);
        assert!(summary.contains("retrying"));
    }
}
