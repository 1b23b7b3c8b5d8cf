//! Target path resolution.
//!
//! Turns a path such as `ProgramFilesFolder/My Application/bin` or
//! `[INSTALLDIR]\plugins` into the identifier of its final `Directory` row,
//! creating whatever rows are missing along the way. Existing rows are reused
//! whenever a matching parent/name pair is already present, so resolving the
//! same path twice is a no-op the second time.

use crate::error::{ErrorKind, Result};
use crate::folders;
use crate::models::{DefaultDir, Directory, NamePair};
use crate::table::DirectoryTable;
use exn::{OptionExt, ResultExt};
use msikit_ident::bump::{bump, fit};
use msikit_ident::{Namespaces, ShortNames, is_identifier};
use std::collections::HashSet;
use tracing::instrument;

/// Identifier context shared by every `Directory` row.
pub const CONTEXT: &str = "Directory";

/// Knobs for [`Resolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Identifier of the root directory, used when a path has no `[Reference]`.
    pub root: String,
    /// `DefaultDir` of the root directory.
    pub source_dir: String,
    /// Length limit for generated directory identifiers.
    pub max_length: usize,
}
impl Default for ResolveOptions {
    fn default() -> Self {
        Self { root: "TARGETDIR".to_string(), source_dir: "SourceDir".to_string(), max_length: 72 }
    }
}

/// Key suffix that scopes a directory name to its parent.
///
/// Keys are lowercased but identifiers are case-sensitive, so every upper-case
/// letter of the parent is marked with `^` to keep `MyApp` and `MYAPP` apart.
fn under(parent: &str) -> String {
    let mut scope = String::with_capacity(parent.len() * 2 + 1);
    scope.push('@');
    for c in parent.chars() {
        if c.is_ascii_uppercase() {
            scope.push('^');
        }
        scope.push(c);
    }
    scope
}

/// Reserves every system folder identifier under `root`, so that ordinary
/// directories never claim one of them.
///
/// Identifiers already known to `names` are left alone.
pub fn reserve_system_folders(names: &mut Namespaces, root: &str) -> Result<()> {
    let scope = under(root);
    for folder in folders::SYSTEM_FOLDERS {
        if !names.contains(CONTEXT, folder) {
            names.reserve(CONTEXT, folder, Some(scope.as_str()), folder).or_raise(|| ErrorKind::Naming)?;
        }
    }
    Ok(())
}

/// Records an existing row in the identifier and short-name tables, under the
/// same keys the resolver would have used had it created the row.
///
/// Short names are recorded only while free: a database may legally reuse one
/// in different directories, and the first row to claim it keeps it.
pub fn register(names: &mut Namespaces, shorts: &mut ShortNames, directory: &Directory) -> Result<()> {
    let scope = directory.parent.as_deref().map(under);
    names.reserve(CONTEXT, directory.name(), scope.as_deref(), &directory.id).or_raise(|| ErrorKind::Naming)?;
    // The root's DefaultDir names the source image and `.` names nothing.
    if directory.parent.is_none() || directory.default_dir.is_same_as_parent() {
        return Ok(());
    }
    for pair in std::iter::once(&directory.default_dir.target).chain(&directory.default_dir.source) {
        shorts.try_record(&pair.short, pair.long_name());
    }
    Ok(())
}

/// Walks and extends a [`DirectoryTable`], allocating identifiers and short
/// names from the session's tables as it goes.
pub struct Resolver<'a> {
    table: &'a mut DirectoryTable,
    names: &'a mut Namespaces,
    shorts: &'a mut ShortNames,
    options: &'a ResolveOptions,
}
impl<'a> Resolver<'a> {
    pub fn new(
        table: &'a mut DirectoryTable,
        names: &'a mut Namespaces,
        shorts: &'a mut ShortNames,
        options: &'a ResolveOptions,
    ) -> Self {
        Self { table, names, shorts, options }
    }

    /// Resolves `path` to a directory identifier.
    ///
    /// Components are separated by `/` or `\`; empty and `.` components are
    /// ignored and `..` steps back up to the parent. A leading `[Name]`
    /// component starts the walk at that directory (or system folder) instead
    /// of the root.
    ///
    /// When `public` is set, the directory the path ends at (after any `..`,
    /// or the `[Name]` itself for a bare reference) has its identifier upper-cased
    /// (unless it already is), which makes it a public property a user can
    /// override at install time. The root and system folders keep their names.
    ///
    /// # Errors
    /// - [`ErrorKind::UnknownReference`] for a `[Name]` that doesn't exist.
    /// - [`ErrorKind::ParentMissing`] for a `..` above the root.
    /// - [`ErrorKind::InvalidIdentifier`] if identifier synthesis goes wrong.
    /// - [`ErrorKind::InvalidDefaultDir`] for a root `source_dir` that isn't `short[|long]`.
    /// - [`ErrorKind::Naming`] when identifier or short-name allocation fails.
    #[instrument(skip(self), fields(root = %self.options.root))]
    pub fn resolve(&mut self, path: &str, public: bool) -> Result<String> {
        let mut components = path.split(['/', '\\']).filter(|c| !c.is_empty() && *c != ".").peekable();
        let mut current = match components.next_if(|c| c.len() > 2 && c.starts_with('[') && c.ends_with(']')) {
            Some(reference) => self.reference(&reference[1..reference.len() - 1])?,
            None => self.ensure_root()?,
        };
        for component in components {
            if component == ".." {
                current = self
                    .table
                    .get(&current)
                    .and_then(|directory| directory.parent.clone())
                    .ok_or_raise(|| ErrorKind::ParentMissing(current.clone()))?;
                continue;
            }
            current = self.component(&current, component)?;
        }
        if public {
            current = self.publish(current)?;
        }
        Ok(current)
    }

    /// Creates the root directory if the tree is still empty.
    fn ensure_root(&mut self) -> Result<String> {
        if let Some(root) = self.table.root() {
            return Ok(root.id.clone());
        }
        let root = self.options.root.clone();
        if !is_identifier(&root) {
            exn::bail!(ErrorKind::InvalidIdentifier(root));
        }
        let directory = Directory {
            id: root.clone(),
            parent: None,
            default_dir: DefaultDir::new(self.options.source_dir.parse()?),
        };
        register(self.names, self.shorts, &directory)?;
        reserve_system_folders(self.names, &root)?;
        self.table.insert(directory)?;
        tracing::debug!(%root, "Created root directory");
        Ok(root)
    }

    /// Resolves the `Name` of a leading `[Name]` component.
    fn reference(&mut self, name: &str) -> Result<String> {
        if self.table.contains(name) {
            return Ok(name.to_string());
        }
        let root = self.ensure_root()?;
        if name == root {
            return Ok(root);
        }
        match folders::lookup(name) {
            Some(folder) => self.materialize(folder, &root),
            None => exn::bail!(ErrorKind::UnknownReference(name.to_string())),
        }
    }

    /// Resolves one path component below `parent`, creating it if needed.
    fn component(&mut self, parent: &str, component: &str) -> Result<String> {
        if let Some(existing) = self.table.find_child(parent, component) {
            return Ok(existing.id.clone());
        }
        if let Some(folder) = folders::lookup(component)
            && self.table.root().is_some_and(|root| root.id == parent)
        {
            return self.materialize(folder, parent);
        }

        let id = self
            .names
            .allocate(CONTEXT, component, self.options.max_length, under(parent).as_str())
            .or_raise(|| ErrorKind::Naming)?;
        if !is_identifier(&id) {
            exn::bail!(ErrorKind::InvalidIdentifier(id));
        }
        // 8.3 components are recorded as well.
        let short = self.shorts.shorten(component).or_raise(|| ErrorKind::Naming)?;
        let target = match short.eq_ignore_ascii_case(component) {
            true => NamePair::new(component, None),
            false => NamePair::new(short, Some(component.to_string())),
        };
        let directory = Directory { id: id.clone(), parent: Some(parent.to_string()), default_dir: DefaultDir::new(target) };
        tracing::debug!(%id, %parent, default_dir = %directory.default_dir, "Created directory");
        self.table.insert(directory)?;
        Ok(id)
    }

    /// Adds the row for a system folder unless it already exists.
    fn materialize(&mut self, folder: &str, root: &str) -> Result<String> {
        if self.table.contains(folder) {
            return Ok(folder.to_string());
        }
        let directory =
            Directory { id: folder.to_string(), parent: Some(root.to_string()), default_dir: DefaultDir::same_as_parent() };
        register(self.names, self.shorts, &directory)?;
        self.table.insert(directory)?;
        tracing::debug!(%folder, "Created system folder");
        Ok(folder.to_string())
    }

    /// Upper-cases a directory identifier, turning it into a public property.
    fn publish(&mut self, id: String) -> Result<String> {
        let upper = id.to_uppercase();
        let is_root = self.table.root().is_some_and(|root| root.id == id);
        if upper == id || is_root || folders::is_system_folder(&id) {
            return Ok(id);
        }
        let mut candidate = upper;
        let mut tried = HashSet::new();
        while self.names.contains(CONTEXT, &candidate) || self.table.contains(&candidate) {
            if !tried.insert(candidate.clone()) {
                exn::bail!(ErrorKind::InvalidIdentifier(candidate));
            }
            candidate =
                fit(&bump(&candidate), self.options.max_length).ok_or_raise(|| ErrorKind::InvalidIdentifier(id.clone()))?;
        }
        self.names.rename(CONTEXT, &id, &candidate).or_raise(|| ErrorKind::Naming)?;
        self.table.rename(&id, &candidate)?;
        // Children are keyed by their parent's identifier, which just changed.
        let scope = under(&candidate);
        let children: Vec<(String, String)> =
            self.table.children(&candidate).map(|child| (child.id.clone(), child.name().to_string())).collect();
        for (child, name) in children {
            self.names.rekey(CONTEXT, &child, &name, Some(scope.as_str())).or_raise(|| ErrorKind::Naming)?;
        }
        tracing::debug!(%id, public = %candidate, "Published directory");
        Ok(candidate)
    }
}
