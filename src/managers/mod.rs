//! Stateless domain managers over [`crate::state::SessionState`].
//!
//! Each manager is a namespace of functions that take `&mut SessionState`
//! (or `&SessionState` for reads) and enforce one slice of the business
//! rules. Managers never clone the state; exclusive access for the duration
//! of a pass is guaranteed by the orchestrator's per-learner lock.
//!
//! - [`quiz`]: quiz payload ingestion, answer capture, grading, hints.
//! - [`progression`]: stage advancement, rollover, durations, counters.
//! - [`conversation`]: transcript, draft buffers, retained summaries.
//! - [`agent`]: worker transitions, intent normalization, routing.

pub mod agent;
pub mod conversation;
pub mod progression;
pub mod quiz;
