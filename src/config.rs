//! Orchestrator configuration with environment fallbacks.

use std::time::Duration;

/// Tunables for the orchestrator and registry.
///
/// Each field can be supplied directly or resolved from the environment
/// (`.env` files are honored via `dotenvy`):
///
/// - `TUTORGRAPH_SESSION_TTL_SECS` (default 3600)
/// - `TUTORGRAPH_GENERATION_TIMEOUT_SECS` (default 30)
/// - `TUTORGRAPH_SECTIONS_PER_UNIT` (default 4)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Idle lifetime of a registry entry before eviction.
    pub session_ttl: Duration,
    /// Upper bound on one generation call inside a worker.
    pub generation_timeout: Duration,
    /// Fallback section count when the curriculum service has no record.
    pub default_sections_per_unit: u32,
}

impl OrchestratorConfig {
    pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;
    pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_SECTIONS_PER_UNIT: u32 = 4;

    /// Resolve configuration from the environment, falling back to defaults
    /// for anything unset or unparseable.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            session_ttl: Duration::from_secs(env_u64(
                "TUTORGRAPH_SESSION_TTL_SECS",
                Self::DEFAULT_SESSION_TTL_SECS,
            )),
            generation_timeout: Duration::from_secs(env_u64(
                "TUTORGRAPH_GENERATION_TIMEOUT_SECS",
                Self::DEFAULT_GENERATION_TIMEOUT_SECS,
            )),
            default_sections_per_unit: env_u64(
                "TUTORGRAPH_SECTIONS_PER_UNIT",
                u64::from(Self::DEFAULT_SECTIONS_PER_UNIT),
            ) as u32,
        }
    }

    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_sections_per_unit(mut self, sections: u32) -> Self {
        self.default_sections_per_unit = sections.max(1);
        self
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(Self::DEFAULT_SESSION_TTL_SECS),
            generation_timeout: Duration::from_secs(Self::DEFAULT_GENERATION_TIMEOUT_SECS),
            default_sections_per_unit: Self::DEFAULT_SECTIONS_PER_UNIT,
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
