//! Per-context identifier allocation.
//!
//! Windows Installer tables key their rows on identifiers: ASCII letters,
//! digits, underscores and periods, never starting with a digit or period, and
//! capped at a column-specific length. [`Namespaces`] hands out such
//! identifiers from arbitrary human-readable names and remembers every
//! allocation, so asking for the same name twice yields the same identifier.
//!
//! Each context (`"Directory"`, `"Component"`, `"File"`, ...) is an isolated
//! namespace: `Foo` can be both a component and a file.

use crate::bump::{bump, fit};
use crate::consts::IDENTIFIER_REGEX;
use crate::error::{ErrorKind, Result};
use exn::OptionExt;
use std::collections::{HashMap, HashSet};
use tracing::instrument;

/// Length limit used when the caller doesn't ask for one.
pub const DEFAULT_MAX_LENGTH: usize = 38;

/// Returns `true` if `name` is a syntactically valid identifier.
///
/// ```
/// use msikit_ident::is_identifier;
/// assert!(is_identifier("ProgramFilesFolder"));
/// assert!(is_identifier("_1"));
/// assert!(!is_identifier("1st"));
/// assert!(!is_identifier("My App"));
/// assert!(!is_identifier(""));
/// ```
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER_REGEX.is_match(name)
}

/// Drops a leading `SHORT~1|` prefix from a `short|long` name pair.
pub fn long_name(name: &str) -> &str {
    name.split_once('|').map(|(_, long)| long).unwrap_or(name)
}

/// Builds the lookup key that makes allocation idempotent.
///
/// The short-name prefix is dropped, the disambiguator appended, and the
/// result lowercased.
///
/// ```
/// use msikit_ident::normalize_key;
/// assert_eq!(normalize_key("MYAPPL~1|My Application", None), "my application");
/// assert_eq!(normalize_key("bin", Some("@MyApp")), "bin@myapp");
/// ```
pub fn normalize_key(name: &str, disambiguator: Option<&str>) -> String {
    let mut key = long_name(name).to_string();
    if let Some(extra) = disambiguator {
        key.push_str(extra);
    }
    key.to_lowercase()
}

/// Reduces `name` to identifier characters and truncates it to `max_length`.
///
/// May return an empty string when nothing usable is left.
///
/// ```
/// use msikit_ident::sanitize;
/// assert_eq!(sanitize("My App (x64)", 38), "MyAppx64");
/// assert_eq!(sanitize("7-Zip.exe", 38), "Zip.exe");
/// assert_eq!(sanitize("LongName", 4), "Long");
/// ```
pub fn sanitize(name: &str, max_length: usize) -> String {
    let kept: String =
        name.chars().filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.')).collect();
    let mut identifier = kept.trim_start_matches(|c: char| c.is_ascii_digit() || c == '.').to_string();
    identifier.truncate(max_length);
    identifier
}

#[derive(Debug, Default, Clone)]
struct Namespace {
    by_key: HashMap<String, String>,
    by_id: HashMap<String, String>,
}
impl Namespace {
    fn bind(&mut self, key: String, id: String) {
        self.by_key.insert(key.clone(), id.clone());
        self.by_id.insert(id, key);
    }
}

/// Identifier tables for every context seen during a session.
///
/// Within one context the key → identifier and identifier → key maps are
/// always mutual inverses.
#[derive(Debug, Default, Clone)]
pub struct Namespaces {
    contexts: HashMap<String, Namespace>,
}
impl Namespaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates (or recalls) the identifier for `name` within `context`.
    ///
    /// `max_length` defaults to [`DEFAULT_MAX_LENGTH`]. The `disambiguator`
    /// only takes part in the lookup key: two names that sanitize to the same
    /// identifier but differ in disambiguator get distinct identifiers via
    /// [`bump`].
    ///
    /// # Errors
    /// - [`ErrorKind::InvalidLength`] for a zero `max_length`.
    /// - [`ErrorKind::Exhausted`] when no suffix fits within `max_length`.
    #[instrument(level = "trace", skip(self, max_length, disambiguator))]
    pub fn allocate<'a>(
        &mut self,
        context: &str,
        name: &str,
        max_length: impl Into<Option<usize>>,
        disambiguator: impl Into<Option<&'a str>>,
    ) -> Result<String> {
        let max_length = max_length.into().unwrap_or(DEFAULT_MAX_LENGTH);
        if max_length == 0 {
            exn::bail!(ErrorKind::InvalidLength(max_length));
        }
        let key = normalize_key(name, disambiguator.into());
        let namespace = self.contexts.entry(context.to_string()).or_default();
        if let Some(id) = namespace.by_key.get(&key) {
            return Ok(id.clone());
        }

        let mut candidate = sanitize(long_name(name), max_length);
        let mut tried = HashSet::new();
        while candidate.is_empty() || namespace.by_id.contains_key(&candidate) {
            // Trimming a bumped candidate back under the limit can land on a
            // name we've already tried; at that point there's nowhere left to go.
            if !tried.insert(candidate.clone()) {
                exn::bail!(ErrorKind::Exhausted(key));
            }
            let next = bump(&candidate);
            tracing::trace!(context, taken = %candidate, next = %next, "Identifier collision");
            candidate = fit(&next, max_length).ok_or_raise(|| ErrorKind::Exhausted(key.clone()))?;
        }
        tracing::debug!(context, key = %key, id = %candidate, "Allocated identifier");
        namespace.bind(key, candidate.clone());
        Ok(candidate)
    }

    /// Records an identifier that already exists elsewhere (an imported table
    /// row, for example) under the key `name` + `disambiguator` would produce.
    ///
    /// Re-reserving an identical pair is a no-op.
    ///
    /// # Errors
    /// [`ErrorKind::Conflict`] if either the key or the identifier is already
    /// bound to something else.
    pub fn reserve(&mut self, context: &str, name: &str, disambiguator: Option<&str>, id: &str) -> Result<()> {
        let key = normalize_key(name, disambiguator);
        let namespace = self.contexts.entry(context.to_string()).or_default();
        if let Some(existing) = namespace.by_key.get(&key)
            && existing != id
        {
            exn::bail!(ErrorKind::Conflict(key));
        }
        if let Some(existing) = namespace.by_id.get(id)
            && *existing != key
        {
            exn::bail!(ErrorKind::Conflict(id.to_string()));
        }
        namespace.bind(key, id.to_string());
        Ok(())
    }

    /// Rebinds the key that currently maps to `old` so that it maps to `new`.
    ///
    /// # Errors
    /// - [`ErrorKind::Unknown`] if `old` was never allocated in `context`.
    /// - [`ErrorKind::Conflict`] if `new` is already taken.
    pub fn rename(&mut self, context: &str, old: &str, new: &str) -> Result<()> {
        let namespace = self.contexts.entry(context.to_string()).or_default();
        if old == new {
            return Ok(());
        }
        if namespace.by_id.contains_key(new) {
            exn::bail!(ErrorKind::Conflict(new.to_string()));
        }
        let key = namespace.by_id.remove(old).ok_or_raise(|| ErrorKind::Unknown(old.to_string()))?;
        tracing::debug!(context, %old, %new, "Renamed identifier");
        namespace.bind(key, new.to_string());
        Ok(())
    }

    /// Moves `id` to the key that `name` + `disambiguator` would produce,
    /// dropping the key it was bound to before.
    ///
    /// # Errors
    /// - [`ErrorKind::Unknown`] if `id` was never allocated in `context`.
    /// - [`ErrorKind::Conflict`] if the new key belongs to another identifier.
    pub fn rekey(&mut self, context: &str, id: &str, name: &str, disambiguator: Option<&str>) -> Result<()> {
        let key = normalize_key(name, disambiguator);
        let namespace = self.contexts.entry(context.to_string()).or_default();
        if let Some(existing) = namespace.by_key.get(&key)
            && existing != id
        {
            exn::bail!(ErrorKind::Conflict(key));
        }
        let old = namespace.by_id.get(id).cloned().ok_or_raise(|| ErrorKind::Unknown(id.to_string()))?;
        namespace.by_key.remove(&old);
        tracing::trace!(context, %id, %old, %key, "Rekeyed identifier");
        namespace.bind(key, id.to_string());
        Ok(())
    }

    /// Looks up a previous allocation without allocating.
    pub fn lookup(&self, context: &str, name: &str, disambiguator: Option<&str>) -> Option<&str> {
        let key = normalize_key(name, disambiguator);
        self.contexts.get(context)?.by_key.get(&key).map(String::as_str)
    }

    /// Returns the normalized key an identifier was allocated for.
    pub fn key_of(&self, context: &str, id: &str) -> Option<&str> {
        self.contexts.get(context)?.by_id.get(id).map(String::as_str)
    }

    /// Returns `true` if `id` is taken within `context`.
    pub fn contains(&self, context: &str, id: &str) -> bool {
        self.contexts.get(context).is_some_and(|namespace| namespace.by_id.contains_key(id))
    }

    /// Number of identifiers allocated within `context`.
    pub fn len(&self, context: &str) -> usize {
        self.contexts.get(context).map_or(0, |namespace| namespace.by_id.len())
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.values().all(|namespace| namespace.by_id.is_empty())
    }
}
