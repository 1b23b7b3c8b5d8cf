//! In-memory mirror of the `Directory` table.

use crate::error::{ErrorKind, Result};
use crate::models::Directory;
use exn::OptionExt;
use std::collections::HashMap;

/// The rows of a `Directory` table, kept in insertion order.
///
/// Two structural rules are enforced on every insert: a tree has exactly one
/// root (a row without a parent), and a row's parent must already exist.
/// Iterating therefore always yields parents before their children.
#[derive(Debug, Default, Clone)]
pub struct DirectoryTable {
    rows: Vec<Directory>,
    index: HashMap<String, usize>,
    root: Option<usize>,
}
impl DirectoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a row.
    ///
    /// # Errors
    /// - [`ErrorKind::DuplicateDirectory`] if the identifier is taken.
    /// - [`ErrorKind::DuplicateRoot`] for a second parentless row.
    /// - [`ErrorKind::ParentMissing`] if the parent hasn't been inserted yet.
    pub fn insert(&mut self, directory: Directory) -> Result<()> {
        if self.index.contains_key(&directory.id) {
            exn::bail!(ErrorKind::DuplicateDirectory(directory.id));
        }
        match &directory.parent {
            None => {
                if let Some(root) = self.root() {
                    exn::bail!(ErrorKind::DuplicateRoot(root.id.clone()));
                }
                self.root = Some(self.rows.len());
            },
            Some(parent) if !self.index.contains_key(parent) => {
                exn::bail!(ErrorKind::ParentMissing(parent.clone()));
            },
            Some(_) => {},
        }
        tracing::trace!(id = %directory.id, parent = ?directory.parent, "Inserted directory");
        self.index.insert(directory.id.clone(), self.rows.len());
        self.rows.push(directory);
        Ok(())
    }

    /// Inserts rows given in any order, holding each back until its parent exists.
    ///
    /// # Errors
    /// As [`insert`](Self::insert); rows whose parent never shows up (or that
    /// form a cycle) fail with [`ErrorKind::ParentMissing`].
    pub fn insert_unordered(&mut self, rows: impl IntoIterator<Item = Directory>) -> Result<()> {
        let mut pending: Vec<Directory> = rows.into_iter().collect();
        while !pending.is_empty() {
            let before = pending.len();
            let (ready, waiting): (Vec<_>, Vec<_>) = pending.into_iter().partition(|row| {
                row.parent.as_ref().is_none_or(|parent| self.index.contains_key(parent))
            });
            for row in ready {
                self.insert(row)?;
            }
            pending = waiting;
            if pending.len() == before {
                let parent = pending[0].parent.clone().unwrap_or_default();
                exn::bail!(ErrorKind::ParentMissing(parent));
            }
        }
        Ok(())
    }

    /// Changes a directory's identifier, re-pointing its children at the new one.
    ///
    /// # Errors
    /// - [`ErrorKind::NotFound`] if `old` doesn't exist.
    /// - [`ErrorKind::DuplicateDirectory`] if `new` is taken.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        if old == new {
            return Ok(());
        }
        if self.index.contains_key(new) {
            exn::bail!(ErrorKind::DuplicateDirectory(new.to_string()));
        }
        let position = self.index.remove(old).ok_or_raise(|| ErrorKind::NotFound(old.to_string()))?;
        self.rows[position].id = new.to_string();
        self.index.insert(new.to_string(), position);
        for row in &mut self.rows {
            if row.parent.as_deref() == Some(old) {
                row.parent = Some(new.to_string());
            }
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Directory> {
        self.index.get(id).map(|position| &self.rows[*position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn root(&self) -> Option<&Directory> {
        self.root.map(|position| &self.rows[position])
    }

    pub fn children<'a>(&'a self, parent: &'a str) -> impl Iterator<Item = &'a Directory> + 'a {
        self.rows.iter().filter(move |row| row.parent.as_deref() == Some(parent))
    }

    /// Finds the child of `parent` that `component` refers to.
    pub fn find_child<'a>(&'a self, parent: &'a str, component: &str) -> Option<&'a Directory> {
        self.children(parent).find(|row| row.matches(component))
    }

    /// Rows in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Directory> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
