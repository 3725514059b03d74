//! Store RPC status codes and the transient/permanent taxonomy (spec §4.5.6, §6, §7).

use std::fmt;

/// Status codes the Store's RPC surface can return.
///
/// Named after the standard status codes of a proto-based RPC surface;
/// only the subset this connector inspects is enumerated, plus a catch-all
/// `Unknown` for anything else the transport reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Ok,
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    Unavailable,
    Unauthenticated,
    Internal,
}

impl StatusCode {
    /// The non-retryable set from spec §4.5.6 / §7: everything else is
    /// transient and subject to the shared backoff helper.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        !matches!(
            self,
            Self::FailedPrecondition
                | Self::InvalidArgument
                | Self::PermissionDenied
                | Self::Unauthenticated
        )
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ok => "OK",
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Self::FailedPrecondition => "FAILED_PRECONDITION",
            Self::Aborted => "ABORTED",
            Self::Unavailable => "UNAVAILABLE",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Internal => "INTERNAL",
        };
        f.write_str(s)
    }
}

/// An error returned by a Store RPC (`RunQuery` or `Commit`).
#[derive(Debug, Clone, thiserror::Error)]
#[error("store RPC failed with {code}: {message}")]
pub struct StoreError {
    /// Status code reported by the transport or the Store itself.
    pub code: StatusCode,
    /// Human-readable detail, as returned by the Store or synthesized by
    /// the transport (e.g. on a connection failure).
    pub message: String,
}

impl StoreError {
    #[must_use]
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// See `StatusCode::is_retryable`.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}
