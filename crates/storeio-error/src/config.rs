//! Configuration errors.
//!
//! These are surfaced synchronously at pipeline construction time, never
//! after an RPC has been attempted (spec §7 "Configuration" taxonomy).

/// Errors raised while validating connector configuration or input data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("projectId is required")]
    MissingProjectId,

    #[error("query configuration is contradictory: {0}")]
    ContradictoryQuery(String),

    #[error("numQuerySplits must be in [0, 50000], got {0}")]
    InvalidSplitCount(i64),

    #[error("user limit must be positive, got {0}")]
    NonPositiveLimit(i64),

    #[error("key is incomplete: the last path element has neither id nor name")]
    IncompleteKey,

    #[error("query must have exactly one kind, got {0}")]
    WrongKindCount(usize),
}

impl ConfigError {
    /// Stable machine-readable code, mirrored on every error variant in
    /// this workspace so callers can branch without matching on display
    /// strings.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingProjectId => "missing_project_id",
            Self::ContradictoryQuery(_) => "contradictory_query",
            Self::InvalidSplitCount(_) => "invalid_split_count",
            Self::NonPositiveLimit(_) => "non_positive_limit",
            Self::IncompleteKey => "incomplete_key",
            Self::WrongKindCount(_) => "wrong_kind_count",
        }
    }
}
