//! Construction, reset, and portable serialization of [`SessionState`].
//!
//! The factory is the only place a `SessionState` comes into existence or is
//! rebuilt for a new section. Deserialization is deliberately forgiving: a
//! malformed record degrades to sensible defaults instead of erroring, so a
//! corrupt stored blob can never lock a learner out of starting fresh.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::state::{NextPosition, QuizState, SessionState};
use crate::types::{Decision, Intent, Stage, Tier, UiMode, WorkerKind};

/// Build a fresh session at the given curriculum position.
///
/// The session opens in chat mode with the supervisor active, an empty quiz,
/// no drafts, and an empty transcript.
#[must_use]
pub fn new_session(learner_id: i64, tier: Tier, unit: u32, section: u32) -> SessionState {
    SessionState {
        learner_id,
        tier,
        unit: unit.max(1),
        section: section.max(1),
        stage: Stage::SessionStart,
        ui_mode: UiMode::Chat,
        active_worker: WorkerKind::Supervisor,
        previous_worker: None,
        intent: Intent::Advance,
        quiz: QuizState::default(),
        explanation_draft: String::new(),
        quiz_draft: String::new(),
        feedback_draft: String::new(),
        question_draft: String::new(),
        decision: Decision::Undecided,
        transcript: Vec::new(),
        summaries: Vec::new(),
        started_at: Utc::now(),
        pass_count: 0,
        last_response: None,
    }
}

/// Rebuild the state for the next section.
///
/// Identity, tier, and retained summaries survive; everything session-local
/// is cleared and `started_at` is stamped fresh. When `advance` is `None`
/// (a retry) the position stays put and only the session-local slate resets.
#[must_use]
pub fn reset_for_next_section(state: &SessionState, advance: Option<NextPosition>) -> SessionState {
    let (unit, section) = match advance {
        Some(next) => (next.unit, next.section),
        None => (state.unit, state.section),
    };
    SessionState {
        summaries: state.summaries.clone(),
        ..new_session(state.learner_id, state.tier, unit, section)
    }
}

/// Serialize to a JSON value with ISO-8601 timestamps and expanded variant
/// tags. Lossless against [`deserialize`].
#[must_use]
pub fn serialize(state: &SessionState) -> serde_json::Value {
    // Derived Serialize already produces the documented shape; kept behind a
    // named function so the storage format has a single owner.
    serde_json::to_value(state).unwrap_or_else(|e| {
        warn!(error = %e, "session state failed to serialize");
        serde_json::Value::Null
    })
}

/// Rebuild a state from its serialized form.
///
/// Field-level damage degrades rather than errors: a missing or malformed
/// timestamp becomes `Utc::now()`, unknown enum values fall back to their
/// defaults, and a record too broken to read at all becomes a default
/// session for learner 0 (callers treat that as "start over").
#[must_use]
pub fn deserialize(value: &serde_json::Value) -> SessionState {
    match serde_json::from_value::<SessionState>(value.clone()) {
        Ok(state) => state,
        Err(e) => {
            warn!(error = %e, "stored session record malformed, rebuilding piecewise");
            rebuild_lenient(value)
        }
    }
}

/// String forms of [`serialize`]/[`deserialize`].
#[must_use]
pub fn to_json(state: &SessionState) -> String {
    serialize(state).to_string()
}

#[must_use]
pub fn from_json(raw: &str) -> SessionState {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) => deserialize(&value),
        Err(e) => {
            warn!(error = %e, "stored session record is not JSON, starting fresh");
            new_session(0, Tier::Unassigned, 1, 1)
        }
    }
}

/// Best-effort field-by-field recovery for records the strict path rejects.
fn rebuild_lenient(value: &serde_json::Value) -> SessionState {
    let obj = match value.as_object() {
        Some(obj) => obj,
        None => return new_session(0, Tier::Unassigned, 1, 1),
    };

    let learner_id = obj.get("learner_id").and_then(|v| v.as_i64()).unwrap_or(0);
    let tier = obj
        .get("tier")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default();
    let unit = obj
        .get("unit")
        .and_then(|v| v.as_u64())
        .map_or(1, |u| u.max(1) as u32);
    let section = obj
        .get("section")
        .and_then(|v| v.as_u64())
        .map_or(1, |s| s.max(1) as u32);

    let mut state = new_session(learner_id, tier, unit, section);
    state.stage = field_or_default(obj, "stage");
    state.ui_mode = field_or_default(obj, "ui_mode");
    state.active_worker = obj
        .get("active_worker")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or(WorkerKind::Supervisor);
    state.intent = field_or_default(obj, "intent");
    state.quiz = field_or_default(obj, "quiz");
    state.decision = field_or_default(obj, "decision");
    state.transcript = field_or_default(obj, "transcript");
    state.summaries = field_or_default(obj, "summaries");
    state.pass_count = obj
        .get("pass_count")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;
    state.started_at = obj
        .get("started_at")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<DateTime<Utc>>().ok())
        .unwrap_or_else(Utc::now);
    for (field, slot) in [
        ("explanation_draft", &mut state.explanation_draft),
        ("quiz_draft", &mut state.quiz_draft),
        ("feedback_draft", &mut state.feedback_draft),
        ("question_draft", &mut state.question_draft),
    ] {
        if let Some(text) = obj.get(field).and_then(|v| v.as_str()) {
            *slot = text.to_string();
        }
    }
    state
}

fn field_or_default<T: serde::de::DeserializeOwned + Default>(
    obj: &serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> T {
    obj.get(key)
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TranscriptEntry;

    #[test]
    fn new_session_opens_in_chat_with_supervisor() {
        let state = new_session(7, Tier::TierB, 2, 3);
        assert_eq!(state.stage, Stage::SessionStart);
        assert_eq!(state.ui_mode, UiMode::Chat);
        assert_eq!(state.active_worker, WorkerKind::Supervisor);
        assert_eq!((state.unit, state.section), (2, 3));
        assert!(state.transcript.is_empty());
        assert_eq!(state.pass_count, 0);
    }

    #[test]
    fn new_session_clamps_position_to_one() {
        let state = new_session(7, Tier::TierA, 0, 0);
        assert_eq!((state.unit, state.section), (1, 1));
    }

    #[test]
    fn reset_preserves_identity_and_summaries_only() {
        let mut state = new_session(7, Tier::TierA, 1, 4);
        state.stage = Stage::QuizAndFeedbackCompleted;
        state.explanation_draft = "old draft".to_string();
        state
            .transcript
            .push(TranscriptEntry::learner("hello", Stage::SessionStart));
        state.summaries.push(crate::state::SectionSummary {
            unit: 1,
            section: 4,
            topic: "loops".to_string(),
            summary: "did well".to_string(),
            recorded_at: Utc::now(),
        });

        let next = reset_for_next_section(&state, Some(NextPosition { unit: 2, section: 1 }));
        assert_eq!(next.learner_id, 7);
        assert_eq!(next.tier, Tier::TierA);
        assert_eq!((next.unit, next.section), (2, 1));
        assert_eq!(next.stage, Stage::SessionStart);
        assert!(next.explanation_draft.is_empty());
        assert!(next.transcript.is_empty());
        assert_eq!(next.summaries.len(), 1);
        assert!(next.started_at >= state.started_at);
    }

    #[test]
    fn reset_without_advance_keeps_position() {
        let state = new_session(7, Tier::TierA, 3, 2);
        let retried = reset_for_next_section(&state, None);
        assert_eq!((retried.unit, retried.section), (3, 2));
    }

    #[test]
    fn serialization_round_trips_losslessly() {
        let mut state = new_session(42, Tier::TierB, 5, 2);
        state.stage = Stage::ExplanationCompleted;
        state.quiz.prompt = "what is a trait?".to_string();
        state.quiz.sample_answer = "a shared interface".to_string();
        state.quiz.kind = crate::state::QuizKind::OpenForm;
        state
            .transcript
            .push(TranscriptEntry::learner("next please", state.stage));

        let restored = deserialize(&serialize(&state));
        assert_eq!(restored, state);

        let restored = from_json(&to_json(&state));
        assert_eq!(restored, state);
    }

    #[test]
    fn malformed_timestamp_falls_back_to_now() {
        let mut value = serialize(&new_session(9, Tier::TierA, 1, 1));
        value["started_at"] = serde_json::json!("not-a-timestamp");
        let before = Utc::now();
        let restored = deserialize(&value);
        assert_eq!(restored.learner_id, 9);
        assert!(restored.started_at >= before);
    }

    #[test]
    fn garbage_input_degrades_to_defaults() {
        let restored = from_json("this is not json");
        assert_eq!(restored.learner_id, 0);
        assert_eq!(restored.stage, Stage::SessionStart);

        let restored = deserialize(&serde_json::json!([1, 2, 3]));
        assert_eq!(restored.learner_id, 0);
    }

    #[test]
    fn partially_damaged_record_keeps_good_fields() {
        let mut value = serialize(&new_session(11, Tier::TierB, 4, 2));
        value["stage"] = serde_json::json!("no_such_stage");
        value["explanation_draft"] = serde_json::json!("kept text");
        let restored = deserialize(&value);
        assert_eq!(restored.learner_id, 11);
        assert_eq!((restored.unit, restored.section), (4, 2));
        assert_eq!(restored.stage, Stage::SessionStart);
        assert_eq!(restored.explanation_draft, "kept text");
    }
}
