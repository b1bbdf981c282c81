//! Structured fault records collected during an orchestrator pass.
//!
//! A worker failure, validation finding, or persistence error never escapes a
//! pass as a raw `Err`; it becomes a [`FaultEvent`] on the pass report so the
//! caller always receives a response plus an observable fault trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::WorkerKind;

/// Represents a fault event with scope, error details, tags, and context.
///
/// # JSON Serialization Format
///
/// `FaultEvent` serializes to JSON with the following structure:
///
/// ```json
/// {
///   "when": "2026-08-25T10:30:00Z",
///   "scope": {
///     "scope": "worker",
///     "kind": "quiz_worker",
///     "pass": 3
///   },
///   "error": {
///     "message": "generation timed out",
///     "cause": null,
///     "details": {"timeout_secs": 30}
///   },
///   "tags": ["timeout", "fallback"],
///   "context": {"learner_id": 42}
/// }
/// ```
///
/// The `scope` field uses a tagged union format with a discriminator field
/// named `"scope"`.
///
/// # Examples
///
/// ```
/// use tutorgraph::faults::{FaultEvent, FaultError};
/// use tutorgraph::types::WorkerKind;
/// use serde_json::json;
///
/// let event = FaultEvent::worker(WorkerKind::Quiz, 3, FaultError::msg("generation timed out"))
///     .with_tag("timeout")
///     .with_context(json!({"learner_id": 42}));
/// let json_str = serde_json::to_string(&event).unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FaultEvent {
    #[serde(default = "chrono::Utc::now")]
    pub when: DateTime<Utc>,
    #[serde(default)]
    pub scope: FaultScope,
    #[serde(default)]
    pub error: FaultError,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub context: serde_json::Value,
}

impl FaultEvent {
    /// Create a worker-scoped fault event.
    pub fn worker(kind: WorkerKind, pass: u32, error: FaultError) -> Self {
        Self {
            when: Utc::now(),
            scope: FaultScope::Worker { kind, pass },
            error,
            tags: Vec::new(),
            context: serde_json::Value::Null,
        }
    }

    /// Create a validator-scoped fault event.
    pub fn validator(error: FaultError) -> Self {
        Self {
            when: Utc::now(),
            scope: FaultScope::Validator,
            error,
            tags: Vec::new(),
            context: serde_json::Value::Null,
        }
    }

    /// Create a router-scoped fault event.
    pub fn router(error: FaultError) -> Self {
        Self {
            when: Utc::now(),
            scope: FaultScope::Router,
            error,
            tags: Vec::new(),
            context: serde_json::Value::Null,
        }
    }

    /// Create a registry-scoped fault event.
    pub fn registry(error: FaultError) -> Self {
        Self {
            when: Utc::now(),
            scope: FaultScope::Registry,
            error,
            tags: Vec::new(),
            context: serde_json::Value::Null,
        }
    }

    /// Create a persistence-scoped fault event.
    pub fn persistence(error: FaultError) -> Self {
        Self {
            when: Utc::now(),
            scope: FaultScope::Persistence,
            error,
            tags: Vec::new(),
            context: serde_json::Value::Null,
        }
    }

    /// Add multiple tags to this fault event.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Add a single tag to this fault event.
    pub fn with_tag<S: Into<String>>(mut self, tag: S) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Add context metadata to this fault event.
    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum FaultScope {
    Worker {
        kind: WorkerKind,
        pass: u32,
    },
    #[default]
    Validator,
    Router,
    Registry,
    Persistence,
}

/// Chainable error detail carried by a [`FaultEvent`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FaultError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<FaultError>>,
    #[serde(default)]
    pub details: serde_json::Value,
}

impl Default for FaultError {
    fn default() -> Self {
        FaultError {
            message: String::new(),
            cause: None,
            details: serde_json::Value::Null,
        }
    }
}

impl std::fmt::Display for FaultError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FaultError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_ref().map(|c| c as &dyn std::error::Error)
    }
}

impl FaultError {
    pub fn msg<M: Into<String>>(m: M) -> Self {
        FaultError {
            message: m.into(),
            cause: None,
            details: serde_json::Value::Null,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    pub fn with_cause(mut self, cause: FaultError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn worker_scope_serializes_with_discriminator() {
        let event = FaultEvent::worker(WorkerKind::Quiz, 3, FaultError::msg("boom"))
            .with_tag("timeout")
            .with_context(json!({"learner_id": 42}));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["scope"]["scope"], "worker");
        assert_eq!(value["scope"]["kind"], "quiz");
        assert_eq!(value["scope"]["pass"], 3);
        assert_eq!(value["error"]["message"], "boom");
        assert_eq!(value["tags"][0], "timeout");
    }

    #[test]
    fn fault_error_chains_causes() {
        let err = FaultError::msg("outer").with_cause(FaultError::msg("inner"));
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "inner");
    }
}
