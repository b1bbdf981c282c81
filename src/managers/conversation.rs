//! Transcript, per-worker draft buffers, and retained section summaries.

use rustc_hash::FxHashMap;

use crate::state::{SectionSummary, SessionState, TranscriptEntry, MAX_SUMMARIES};
use crate::types::WorkerKind;

/// Append a prepared entry to the transcript.
pub fn append(state: &mut SessionState, entry: TranscriptEntry) {
    state.transcript.push(entry);
}

/// Append a learner entry stamped with the current stage.
pub fn append_learner(state: &mut SessionState, text: impl Into<String>) {
    let entry = TranscriptEntry::learner(text, state.stage);
    state.transcript.push(entry);
}

/// Append a worker entry stamped with the current stage.
pub fn append_worker(state: &mut SessionState, worker: WorkerKind, text: impl Into<String>) {
    let entry = TranscriptEntry::worker(worker, text, state.stage);
    state.transcript.push(entry);
}

/// Most recent learner-authored text, or the empty string if the learner has
/// not spoken yet.
#[must_use]
pub fn last_learner_message(state: &SessionState) -> &str {
    state
        .transcript
        .iter()
        .rev()
        .find(|entry| entry.is_learner())
        .map_or("", |entry| entry.text.as_str())
}

/// Overwrite the draft buffer owned by the given worker. Supervisor and
/// progression own no buffer; writes addressed to them are dropped.
pub fn set_draft(state: &mut SessionState, worker: WorkerKind, text: impl Into<String>) {
    let slot = match worker {
        WorkerKind::Explanation => &mut state.explanation_draft,
        WorkerKind::Quiz => &mut state.quiz_draft,
        WorkerKind::Feedback => &mut state.feedback_draft,
        WorkerKind::Question => &mut state.question_draft,
        WorkerKind::Progression | WorkerKind::Supervisor => return,
    };
    *slot = text.into();
}

/// Read a worker's draft buffer; empty for bufferless workers.
#[must_use]
pub fn get_draft(state: &SessionState, worker: WorkerKind) -> &str {
    state.draft(worker).unwrap_or("")
}

/// Clear every draft buffer.
pub fn clear_drafts(state: &mut SessionState) {
    state.explanation_draft.clear();
    state.quiz_draft.clear();
    state.feedback_draft.clear();
    state.question_draft.clear();
}

/// Snapshot of all non-empty draft buffers, used by the supervisor finalize
/// step.
#[must_use]
pub fn all_drafts(state: &SessionState) -> FxHashMap<WorkerKind, String> {
    let mut drafts = FxHashMap::default();
    for worker in [
        WorkerKind::Explanation,
        WorkerKind::Quiz,
        WorkerKind::Feedback,
        WorkerKind::Question,
    ] {
        let text = get_draft(state, worker);
        if !text.is_empty() {
            drafts.insert(worker, text.to_string());
        }
    }
    drafts
}

/// Retain a section summary, evicting the oldest once the ring is full.
pub fn add_summary(state: &mut SessionState, summary: SectionSummary) {
    state.summaries.push(summary);
    while state.summaries.len() > MAX_SUMMARIES {
        state.summaries.remove(0);
    }
}

/// Up to `n` most recent summaries, newest last.
#[must_use]
pub fn recent_summaries(state: &SessionState, n: usize) -> &[SectionSummary] {
    let start = state.summaries.len().saturating_sub(n);
    &state.summaries[start..]
}
