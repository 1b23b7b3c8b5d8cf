//! Identifier Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A naming error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for naming operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The requested maximum identifier length cannot hold any identifier.
    #[display("invalid maximum identifier length: {_0}")]
    InvalidLength(#[error(not(source))] usize),
    /// Every numeric suffix that fits within the length limit is taken.
    #[display("no free name left for {_0:?}")]
    Exhausted(#[error(not(source))] String),
    /// A pre-existing name conflicts with one already recorded.
    #[display("conflicting name: {_0}")]
    Conflict(#[error(not(source))] String),
    /// The name was never recorded.
    #[display("unknown name: {_0}")]
    Unknown(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::InvalidLength(0).to_string(), "invalid maximum identifier length: 0");
        assert_eq!(ErrorKind::Exhausted("Foo".to_string()).to_string(), "no free name left for \"Foo\"");
        assert_eq!(ErrorKind::Conflict("Foo".to_string()).to_string(), "conflicting name: Foo");
    }

    #[test]
    fn nothing_is_retryable() {
        assert!(!ErrorKind::InvalidLength(0).is_retryable());
        assert!(!ErrorKind::Exhausted(String::new()).is_retryable());
    }
}
