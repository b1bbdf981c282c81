//! # tutorgraph
//!
//! A session state machine and worker-routing orchestrator for a multi-step
//! tutoring interaction. A learner works through curriculum sections in a
//! fixed flow (explanation, quiz, feedback, optional questions, progression)
//! driven by specialized workers, a deterministic router, and an in-memory
//! per-learner session registry.
//!
//! ## Architecture
//!
//! - [`types`]: closed enums for workers, stages, intents, tiers, decisions.
//! - [`state`]: the [`state::SessionState`] record plus its factory and
//!   staged validator.
//! - [`managers`]: stateless functions enforcing the business rules over
//!   `&mut SessionState`.
//! - [`workers`]: the async [`workers::Worker`] implementations the router
//!   selects between.
//! - [`orchestrator`]: the per-action pass
//!   ([`orchestrator::Orchestrator::handle_action`]).
//! - [`registry`]: TTL-evicted per-learner session storage with per-slot
//!   locking.
//! - [`collaborators`]: trait seams for generation, curriculum, and
//!   persistence backends.
//! - [`faults`]: structured fault records attached to every pass report.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tutorgraph::config::OrchestratorConfig;
//! use tutorgraph::orchestrator::{Action, Orchestrator};
//! use tutorgraph::types::Tier;
//!
//! let orchestrator = Orchestrator::new(
//!     Arc::new(my_generation_backend),
//!     Arc::new(my_curriculum_store),
//!     Arc::new(my_database),
//!     OrchestratorConfig::from_env(),
//! );
//! let report = orchestrator
//!     .handle_action(42, Action::StartSession { tier: Tier::TierA, unit: 1, section: 1 })
//!     .await;
//! println!("{}", report.response.content);
//! ```

pub mod collaborators;
pub mod config;
pub mod faults;
pub mod managers;
pub mod orchestrator;
pub mod registry;
pub mod state;
pub mod types;
pub mod workers;
