use crate::env_or;

/// Limits applied to audit log queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditConfig {
    /// Rows returned when the caller does not ask for a limit.
    pub default_limit: i64,
    /// Upper bound on any caller-supplied limit.
    pub max_limit: i64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            default_limit: 100,
            max_limit: 1000,
        }
    }
}

impl AuditConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_limit: i64 = env_or("AUDIT_MAX_LIMIT", defaults.max_limit).max(1);
        let default_limit: i64 = env_or("AUDIT_DEFAULT_LIMIT", defaults.default_limit);
        Self {
            default_limit: default_limit.clamp(1, max_limit),
            max_limit,
        }
    }

    /// Resolves a requested limit into `1..=max_limit`.
    pub fn effective_limit(&self, requested: Option<i64>) -> i64 {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit)
    }
}
