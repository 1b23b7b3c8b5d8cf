//! `Directory` table modelling for Windows Installer databases.
//!
//! The installer describes the folder layout of a product as a tree of
//! `Directory` rows: an identifier, the identifier of the parent, and a
//! `DefaultDir` name pair. This crate keeps an in-memory mirror of that table
//! ([`DirectoryTable`]), resolves slash-delimited target paths into it
//! ([`Resolver`]), and reads and writes it in the installer's text archive
//! format ([`idt`]).
//!
//! The table is a cache over the real database, not the source of truth.

pub mod error;
pub mod folders;
pub mod idt;
mod models;
mod resolve;
mod table;

pub use crate::models::{DefaultDir, Directory, NamePair};
pub use crate::resolve::{CONTEXT, ResolveOptions, Resolver, register, reserve_system_folders};
pub use crate::table::DirectoryTable;
