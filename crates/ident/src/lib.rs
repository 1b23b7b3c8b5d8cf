//! Name bookkeeping for Windows Installer databases.
//!
//! Two lookup tables live here, both meant to be owned by a single working
//! session and populated lazily:
//!
//! - [`Namespaces`] allocates table identifiers (primary-key-like tokens)
//!   from human-readable names, unique per context.
//! - [`ShortNames`] pairs long file and directory names with 8.3 short names.
//!
//! Both disambiguate collisions by [bumping](bump) a numeric suffix.

pub mod bump;
mod consts;
pub mod error;
mod namespace;
mod short;

pub use crate::namespace::{DEFAULT_MAX_LENGTH, Namespaces, is_identifier, long_name, normalize_key, sanitize};
pub use crate::short::{ShortNames, is_short_name};
