//! Domain-specific errors.

use thiserror::Error;

/// Failures while decoding or constructing fragments.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FragmentError {
    #[error("malformed fragment '{piece}' at position {index}: {reason}")]
    MalformedFragment {
        piece: String,
        index: usize,
        reason: &'static str,
    },
    #[error("invalid fragment range [{begin}, {end}]")]
    InvalidRange { begin: u64, end: u64 },
    #[error("fragment [{begin}, {end}] shifted by {offset} runs past the last segment")]
    ShiftOverflow { begin: u64, end: u64, offset: u64 },
}

/// Failures raised while accounting an excerpt against a quota.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuotaError {
    #[error("quota exceeded: {used} segments requested, limit is {limit}")]
    Exceeded { used: u64, limit: u64 },
    #[error(transparent)]
    Fragment(#[from] FragmentError),
}
