//! Directory Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A directory error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for directory operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a directory failure.
///
/// ### Validation Errors
/// - [`ErrorKind::ParentMissing`]
/// - [`ErrorKind::DuplicateRoot`]
/// - [`ErrorKind::DuplicateDirectory`]
/// - [`ErrorKind::NotFound`]
/// - [`ErrorKind::UnknownReference`]
/// - [`ErrorKind::InvalidDefaultDir`]
///
/// ### Configuration Errors
/// - [`ErrorKind::InvalidIdentifier`] - identifier synthesis produced something
///   the installer would reject.
///
/// ### Dependency Errors
/// - [`ErrorKind::Naming`]
/// - [`ErrorKind::Archive`]
/// - [`ErrorKind::Io`]
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A directory was inserted before its parent.
    #[display("parent directory does not exist: {_0}")]
    ParentMissing(#[error(not(source))] String),
    /// A second root was inserted into a tree that already has one.
    #[display("directory tree already has a root: {_0}")]
    DuplicateRoot(#[error(not(source))] String),
    /// The identifier is already used by another directory.
    #[display("directory already exists: {_0}")]
    DuplicateDirectory(#[error(not(source))] String),
    /// No directory with this identifier exists.
    #[display("directory not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// A bracketed `[Reference]` names neither a directory nor a system folder.
    #[display("unknown directory reference: [{_0}]")]
    UnknownReference(#[error(not(source))] String),
    /// Identifier synthesis produced an empty or malformed identifier.
    #[display("invalid directory identifier: {_0:?}")]
    InvalidIdentifier(#[error(not(source))] String),
    /// A `DefaultDir` value could not be parsed.
    #[display("invalid DefaultDir value: {_0:?}")]
    InvalidDefaultDir(#[error(not(source))] String),
    /// Identifier allocation or short-name synthesis failed.
    #[display("naming error")]
    Naming,
    /// A `Directory.idt` archive is malformed.
    #[display("malformed directory archive at line {_0}")]
    Archive(#[error(not(source))] usize),
    /// Reading or writing an archive failed.
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::ParentMissing("MyApp".into()).to_string(), "parent directory does not exist: MyApp");
        assert_eq!(ErrorKind::UnknownReference("FOO".into()).to_string(), "unknown directory reference: [FOO]");
        assert_eq!(ErrorKind::Archive(4).to_string(), "malformed directory archive at line 4");
    }

    #[test]
    fn error_kind_retryable() {
        assert!(ErrorKind::Io.is_retryable());
        assert!(!ErrorKind::Naming.is_retryable());
        assert!(!ErrorKind::ParentMissing(String::new()).is_retryable());
    }
}
