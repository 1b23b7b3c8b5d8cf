//! Naming bookkeeping for Windows Installer databases.
//!
//! A [`Session`] hands out table identifiers, 8.3 short names and `Directory`
//! rows. The individual pieces live in their own crates and are re-exported
//! here.

pub mod error;
mod session;

pub use crate::session::Session;
pub use msikit_config::Config;
pub use msikit_directory::{DefaultDir, Directory, DirectoryTable, NamePair};
