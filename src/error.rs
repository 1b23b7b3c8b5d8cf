//! Session Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A session error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Which layer of the session failed.
///
/// The underlying crate error is kept as the child of the raised error, so
/// the full tree still says what went wrong.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Loading or validating configuration failed.
    #[display("configuration error")]
    Config,
    /// Identifier allocation or short-name synthesis failed.
    #[display("naming error")]
    Naming,
    /// Resolving, importing or exporting directories failed.
    #[display("directory error")]
    Directory,
    /// Opening or creating a file failed.
    #[display("I/O error: {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::Naming.to_string(), "naming error");
        assert_eq!(ErrorKind::Io(PathBuf::from("Directory.idt")).to_string(), "I/O error: Directory.idt");
    }

    #[test]
    fn error_kind_retryable() {
        assert!(ErrorKind::Io(PathBuf::new()).is_retryable());
        assert!(!ErrorKind::Config.is_retryable());
        assert!(!ErrorKind::Directory.is_retryable());
    }
}
