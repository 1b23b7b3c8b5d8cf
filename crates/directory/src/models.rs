use crate::error::{Error, ErrorKind, Result};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// `DefaultDir` value meaning "same location as the parent directory".
const SAME_AS_PARENT: &str = ".";

/// Case-insensitive name comparison, as Windows does it.
pub(crate) fn same_name(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

/// A `short[|long]` name pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePair {
    pub short: String,
    pub long: Option<String>,
}
impl NamePair {
    pub fn new(short: impl Into<String>, long: impl Into<Option<String>>) -> Self {
        Self { short: short.into(), long: long.into() }
    }

    /// The long name, falling back to the short one.
    pub fn long_name(&self) -> &str {
        self.long.as_deref().unwrap_or(&self.short)
    }

    fn parse(s: &str, whole: &str) -> Result<Self> {
        let (short, long) = match s.split_once('|') {
            Some((short, long)) => (short, Some(long)),
            None => (s, None),
        };
        if short.is_empty() || long.is_some_and(str::is_empty) {
            exn::bail!(ErrorKind::InvalidDefaultDir(whole.to_string()));
        }
        Ok(Self::new(short, long.map(str::to_string)))
    }
}
impl Display for NamePair {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.long {
            Some(long) => write!(f, "{}|{long}", self.short),
            None => write!(f, "{}", self.short),
        }
    }
}

impl FromStr for NamePair {
    type Err = Error;

    /// Parses one side of a `DefaultDir` value on its own.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.contains(['\t', '\r', '\n', ':']) {
            exn::bail!(ErrorKind::InvalidDefaultDir(s.to_string()));
        }
        Self::parse(s, s)
    }
}

/// Value of the `Directory` table's `DefaultDir` column.
///
/// Encoded as `target[:source]`, each side a [`NamePair`]. The target side
/// names the directory on the installed machine; the optional source side
/// names it within the installation source when the two differ.
///
/// ```
/// use msikit_directory::DefaultDir;
/// let value: DefaultDir = "MYAPPL~1|My Application:src".parse().unwrap();
/// assert_eq!(value.target.long_name(), "My Application");
/// assert_eq!(value.source.as_ref().unwrap().short, "src");
/// assert_eq!(value.to_string(), "MYAPPL~1|My Application:src");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultDir {
    pub target: NamePair,
    pub source: Option<NamePair>,
}
impl DefaultDir {
    pub fn new(target: NamePair) -> Self {
        Self { target, source: None }
    }

    /// The `.` value used by system folders that sit at their parent's location.
    pub fn same_as_parent() -> Self {
        Self::new(NamePair::new(SAME_AS_PARENT, None))
    }

    pub fn is_same_as_parent(&self) -> bool {
        self.source.is_none() && self.target.long.is_none() && self.target.short == SAME_AS_PARENT
    }
}
impl Display for DefaultDir {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.source {
            Some(source) => write!(f, "{}:{source}", self.target),
            None => write!(f, "{}", self.target),
        }
    }
}
impl FromStr for DefaultDir {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        // Row and column separators of the text archive format can never appear inside a value.
        if s.contains(['\t', '\r', '\n']) {
            exn::bail!(ErrorKind::InvalidDefaultDir(s.to_string()));
        }
        let (target, source) = match s.split_once(':') {
            Some((target, source)) => (target, Some(NamePair::parse(source, s)?)),
            None => (s, None),
        };
        Ok(Self { target: NamePair::parse(target, s)?, source })
    }
}

/// One row of the `Directory` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    pub id: String,
    /// `None` only for the root of the tree.
    pub parent: Option<String>,
    pub default_dir: DefaultDir,
}
impl Directory {
    /// The name this directory is matched by when walking a path.
    ///
    /// Directories at their parent's location (`.`) have no name of their own
    /// and are matched by identifier instead.
    pub fn name(&self) -> &str {
        match self.default_dir.is_same_as_parent() {
            true => &self.id,
            false => self.default_dir.target.long_name(),
        }
    }

    /// Returns `true` if a path component refers to this directory, by either
    /// its long or its short target name.
    pub fn matches(&self, component: &str) -> bool {
        same_name(self.name(), component) || same_name(&self.default_dir.target.short, component)
    }
}
