//! `Directory` table in Windows Installer text archive (`.idt`) form.
//!
//! This is the format `MsiDatabaseImport` and `MsiDatabaseExport` exchange:
//! tab-separated columns, CRLF line endings, and three header lines giving
//! the column names, the column types, and the table name followed by its
//! primary key columns.
//!
//! ```text
//! Directory	Directory_Parent	DefaultDir
//! s72	S72	l255
//! Directory	Directory
//! TARGETDIR		SourceDir
//! ProgramFilesFolder	TARGETDIR	.
//! ```

use crate::error::{ErrorKind, Result};
use crate::models::{DefaultDir, Directory};
use crate::table::DirectoryTable;
use exn::ResultExt;
use msikit_ident::is_identifier;
use std::io::{BufRead, Write};
use tracing::instrument;

/// File name the installer uses for this table's archive.
pub const FILE_NAME: &str = "Directory.idt";

const HEADER: [&str; 3] = ["Directory\tDirectory_Parent\tDefaultDir", "s72\tS72\tl255", "Directory\tDirectory"];

/// Writes `table` as an archive, rows in insertion order.
#[instrument(skip_all, fields(rows = table.len()))]
pub fn write(table: &DirectoryTable, mut out: impl Write) -> Result<()> {
    for line in HEADER {
        write!(out, "{line}\r\n").or_raise(|| ErrorKind::Io)?;
    }
    for row in table.iter() {
        let parent = row.parent.as_deref().unwrap_or_default();
        write!(out, "{}\t{parent}\t{}\r\n", row.id, row.default_dir).or_raise(|| ErrorKind::Io)?;
    }
    out.flush().or_raise(|| ErrorKind::Io)
}

/// Parses an archive into rows, in file order.
///
/// An empty parent, or a parent equal to the row's own identifier, marks the
/// root. Blank lines are skipped.
///
/// # Errors
/// - [`ErrorKind::Archive`] (with the 1-based line number) for a header that
///   doesn't describe the `Directory` table or a row without three columns.
/// - [`ErrorKind::InvalidIdentifier`] for a malformed identifier.
/// - [`ErrorKind::Io`] if reading fails.
#[instrument(skip_all)]
pub fn read(input: impl BufRead) -> Result<Vec<Directory>> {
    let mut rows = Vec::new();
    let mut lines = 0;
    for (index, line) in input.lines().enumerate() {
        let number = index + 1;
        lines = number;
        let line = line.or_raise(|| ErrorKind::Io)?;
        let line = line.trim_end_matches('\r');
        if let Some(expected) = HEADER.get(index) {
            if !line.eq_ignore_ascii_case(expected) {
                exn::bail!(ErrorKind::Archive(number));
            }
            continue;
        }
        if line.is_empty() {
            continue;
        }
        let [id, parent, default_dir] = line.split('\t').collect::<Vec<_>>()[..] else {
            exn::bail!(ErrorKind::Archive(number));
        };
        for id in [id, parent].into_iter().filter(|id| !id.is_empty()) {
            if !is_identifier(id) {
                exn::bail!(ErrorKind::InvalidIdentifier(id.to_string()));
            }
        }
        let default_dir = default_dir.parse::<DefaultDir>().or_raise(|| ErrorKind::Archive(number))?;
        let parent = (!parent.is_empty() && parent != id).then(|| parent.to_string());
        rows.push(Directory { id: id.to_string(), parent, default_dir });
    }
    if lines < HEADER.len() {
        exn::bail!(ErrorKind::Archive(lines + 1));
    }
    tracing::debug!(rows = rows.len(), "Read directory archive");
    Ok(rows)
}

/// Parses an archive straight into a [`DirectoryTable`].
pub fn read_table(input: impl BufRead) -> Result<DirectoryTable> {
    let mut table = DirectoryTable::new();
    table.insert_unordered(read(input)?)?;
    Ok(table)
}
