//! The session object that owns every lookup table.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use msikit_config::Config;
use msikit_directory::{CONTEXT, DirectoryTable, ResolveOptions, Resolver, idt, register, reserve_system_folders};
use msikit_ident::{Namespaces, ShortNames};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::instrument;

/// Identifier namespaces, short names and the directory tree for one database.
///
/// Sessions are independent of each other: two sessions never share names.
#[derive(Debug, Clone)]
pub struct Session {
    config: Config,
    options: ResolveOptions,
    names: Namespaces,
    shorts: ShortNames,
    directories: DirectoryTable,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Session {
    pub fn new(config: Config) -> Self {
        let options = ResolveOptions {
            root: config.directories.root.clone(),
            source_dir: config.directories.source_dir.clone(),
            max_length: config.identifiers.max_length_for(CONTEXT),
        };
        Self { config, options, names: Namespaces::new(), shorts: ShortNames::new(), directories: DirectoryTable::new() }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Allocates (or returns the previously allocated) identifier for `name` in `context`.
    ///
    /// Without an explicit `max_length`, the configured limit for `context` applies.
    pub fn allocate(
        &mut self,
        context: &str,
        name: &str,
        max_length: Option<usize>,
        disambiguator: Option<&str>,
    ) -> Result<String> {
        let max_length = max_length.unwrap_or_else(|| self.config.identifiers.max_length_for(context));
        self.names.allocate(context, name, max_length, disambiguator).or_raise(|| ErrorKind::Naming)
    }

    /// Returns the 8.3 short name for `long`.
    pub fn shorten(&mut self, long: &str) -> Result<String> {
        self.shorts.shorten(long).or_raise(|| ErrorKind::Naming)
    }

    /// Resolves a target path to a `Directory` identifier, creating rows as needed.
    pub fn resolve(&mut self, path: &str, public: bool) -> Result<String> {
        Resolver::new(&mut self.directories, &mut self.names, &mut self.shorts, &self.options)
            .resolve(path, public)
            .or_raise(|| ErrorKind::Directory)
    }

    pub fn directories(&self) -> &DirectoryTable {
        &self.directories
    }

    /// Adds the rows of a `Directory.idt` archive to the session, returning how many were added.
    ///
    /// Imported identifiers and short names are reserved, so later allocations
    /// avoid them and later resolutions reuse the imported rows. Either every
    /// row is imported or, on error, the session is left as it was.
    #[instrument(skip_all)]
    pub fn import_directories(&mut self, input: impl BufRead) -> Result<usize> {
        let rows = idt::read(input).or_raise(|| ErrorKind::Directory)?;
        let mut directories = self.directories.clone();
        let mut names = self.names.clone();
        let mut shorts = self.shorts.clone();

        let before = directories.len();
        directories.insert_unordered(rows).or_raise(|| ErrorKind::Directory)?;
        for directory in directories.iter().skip(before) {
            register(&mut names, &mut shorts, directory).or_raise(|| ErrorKind::Directory)?;
        }
        if let Some(root) = directories.root() {
            reserve_system_folders(&mut names, &root.id).or_raise(|| ErrorKind::Directory)?;
        }

        let added = directories.len() - before;
        tracing::debug!(added, total = directories.len(), "Imported directories");
        self.directories = directories;
        self.names = names;
        self.shorts = shorts;
        Ok(added)
    }

    /// Writes the directory tree as a `Directory.idt` archive.
    pub fn export_directories(&self, out: impl Write) -> Result<()> {
        idt::write(&self.directories, out).or_raise(|| ErrorKind::Directory)
    }

    /// [`import_directories`](Self::import_directories) from a file.
    pub fn import_file(&mut self, path: &Path) -> Result<usize> {
        let file = File::open(path).or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
        self.import_directories(BufReader::new(file))
    }

    /// [`export_directories`](Self::export_directories) to a file, replacing it if present.
    pub fn export_file(&self, path: &Path) -> Result<()> {
        let file = File::create(path).or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
        self.export_directories(BufWriter::new(file))?;
        tracing::debug!(path = %path.display(), rows = self.directories.len(), "Exported directories");
        Ok(())
    }
}
