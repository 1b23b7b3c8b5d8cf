//! 8.3 short-name synthesis.
//!
//! The `File` and `Directory` tables store names as `SHORT|Long Name` pairs,
//! where the short half must be a DOS-compatible 8.3 name. [`ShortNames`]
//! derives those short names and guarantees a stable one-to-one pairing: a
//! long name always gets the short name it got the first time, and a short
//! name is never handed to a second long name.

use crate::bump::increment_digits;
use crate::consts::{SHORT_NAME_DISALLOWED, SHORT_NAME_REGEX};
use crate::error::{ErrorKind, Result};
use std::collections::HashMap;
use tracing::instrument;

/// Longest numeral that still leaves one stem character in front of `~`.
const MAX_NUMERAL_DIGITS: usize = 6;

/// Returns `true` if `name` is already a valid 8.3 name.
///
/// ```
/// use msikit_ident::is_short_name;
/// assert!(is_short_name("README.TXT"));
/// assert!(is_short_name("readme.txt"));
/// assert!(is_short_name("LONGFI~1"));
/// assert!(!is_short_name("LongFileName.txt"));
/// assert!(!is_short_name("two.dots.txt"));
/// assert!(!is_short_name("a b.txt"));
/// assert!(!is_short_name("file.html"));
/// ```
pub fn is_short_name(name: &str) -> bool {
    SHORT_NAME_REGEX.is_match(name)
}

/// Bidirectional long ↔ short name table.
///
/// Lookups are case-insensitive on both sides; the stored values keep the case
/// they were recorded with.
#[derive(Debug, Default, Clone)]
pub struct ShortNames {
    by_long: HashMap<String, String>,
    by_short: HashMap<String, String>,
}
impl ShortNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the 8.3 name for `long`, generating and recording one on first use.
    ///
    /// Names that already are 8.3 come back unchanged (case included).
    /// Generated names are upper-cased, stripped of disallowed characters,
    /// keep at most one period, and take the form `STEMXX~N.EXT`; `N` is
    /// bumped with carry until the name is free.
    ///
    /// ```
    /// use msikit_ident::ShortNames;
    /// let mut names = ShortNames::new();
    /// assert_eq!(names.shorten("LongFile1.txt").unwrap(), "LONGFI~1.TXT");
    /// assert_eq!(names.shorten("LongFile2.txt").unwrap(), "LONGFI~2.TXT");
    /// assert_eq!(names.shorten("LongFile1.txt").unwrap(), "LONGFI~1.TXT");
    /// ```
    ///
    /// # Errors
    /// [`ErrorKind::Exhausted`] once every numeral up to six digits is taken.
    #[instrument(level = "trace", skip(self))]
    pub fn shorten(&mut self, long: &str) -> Result<String> {
        if let Some(short) = self.by_long.get(&long.to_lowercase()) {
            return Ok(short.clone());
        }
        if is_short_name(long) {
            match self.by_short.get(&long.to_uppercase()) {
                Some(owner) => {
                    tracing::warn!(name = long, %owner, "Short name already paired with another long name");
                },
                None => self.insert(long, long),
            }
            return Ok(long.to_string());
        }

        let (stem, ext) = split_cleaned(long);
        let mut numeral = String::from("1");
        let mut short = assemble(&stem, &numeral, &ext);
        while self.by_short.contains_key(&short) {
            numeral = increment_digits(&numeral);
            if numeral.len() > MAX_NUMERAL_DIGITS {
                exn::bail!(ErrorKind::Exhausted(long.to_string()));
            }
            short = assemble(&stem, &numeral, &ext);
        }
        tracing::debug!(%long, %short, "Generated short name");
        self.insert(&short, long);
        Ok(short)
    }

    /// Records an existing `short`/`long` pairing, e.g. from an imported table.
    ///
    /// Recording the same pair twice is a no-op.
    ///
    /// # Errors
    /// [`ErrorKind::Conflict`] if either side is already paired differently.
    pub fn record(&mut self, short: &str, long: &str) -> Result<()> {
        if let Some(name) = self.conflict(short, long) {
            exn::bail!(ErrorKind::Conflict(name.to_string()));
        }
        self.insert(short, long);
        Ok(())
    }

    /// Like [`record`](Self::record), but leaves the table alone on a conflict
    /// instead of failing. Returns whether the pair is now recorded.
    ///
    /// Real databases may reuse a short name in different directories, so
    /// imported pairs go through here.
    pub fn try_record(&mut self, short: &str, long: &str) -> bool {
        if self.conflict(short, long).is_some() {
            let owner = self.long_for(short).unwrap_or_default();
            tracing::warn!(%short, %long, %owner, "Short name already paired differently, not recorded");
            return false;
        }
        self.insert(short, long);
        true
    }

    /// The side of a `short`/`long` pair that is already paired with something else.
    fn conflict<'a>(&self, short: &'a str, long: &'a str) -> Option<&'a str> {
        if let Some(existing) = self.by_long.get(&long.to_lowercase())
            && !existing.eq_ignore_ascii_case(short)
        {
            return Some(long);
        }
        if let Some(existing) = self.by_short.get(&short.to_uppercase())
            && existing.to_lowercase() != long.to_lowercase()
        {
            return Some(short);
        }
        None
    }

    /// The short name previously recorded for `long`, if any.
    pub fn short_for(&self, long: &str) -> Option<&str> {
        self.by_long.get(&long.to_lowercase()).map(String::as_str)
    }

    /// The long name `short` is paired with, if any.
    pub fn long_for(&self, short: &str) -> Option<&str> {
        self.by_short.get(&short.to_uppercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_short.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_short.is_empty()
    }

    fn insert(&mut self, short: &str, long: &str) {
        self.by_long.insert(long.to_lowercase(), short.to_string());
        self.by_short.insert(short.to_uppercase(), long.to_string());
    }
}

/// Upper-cases and strips `long`, then splits it at the last remaining period.
///
/// A leading-period name (`.profile`) has no stem of its own, so its extension
/// becomes the stem.
fn split_cleaned(long: &str) -> (String, String) {
    let cleaned: String = long
        .chars()
        .filter(|c| c.is_ascii_graphic() && !SHORT_NAME_DISALLOWED.contains(c))
        .map(|c| c.to_ascii_uppercase())
        .collect();
    let (stem, ext) = match cleaned.rsplit_once('.') {
        Some((stem, ext)) => (stem.replace('.', ""), ext.to_string()),
        None => (cleaned, String::new()),
    };
    let (mut stem, mut ext) = match stem.is_empty() {
        true => (ext, String::new()),
        false => (stem, ext),
    };
    if stem.is_empty() {
        stem.push('_');
    }
    ext.truncate(3);
    (stem, ext)
}

fn assemble(stem: &str, numeral: &str, ext: &str) -> String {
    let keep = 8 - 1 - numeral.len();
    let stem = &stem[..stem.len().min(keep)];
    match ext.is_empty() {
        true => format!("{stem}~{numeral}"),
        false => format!("{stem}~{numeral}.{ext}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("README.TXT")]
    #[case("readme.txt")]
    #[case("Setup.exe")]
    #[case("A")]
    #[case("ABCDEFGH.ABC")]
    #[case("bin")]
    fn test_short_names_unchanged(#[case] name: &str) {
        let mut names = ShortNames::new();
        assert_eq!(names.shorten(name).unwrap(), name);
        assert_eq!(names.long_for(name), Some(name));
    }

    #[rstest]
    #[case("LongFileName.txt", "LONGFI~1.TXT")]
    #[case("My Application", "MYAPPL~1")]
    #[case("a b.txt", "AB~1.TXT")]
    #[case("archive.tar.gz", "ARCHIV~1.GZ")]
    #[case("index.html", "INDEX~1.HTM")]
    #[case(".profile", "PROFIL~1")]
    #[case("Über.txt", "BER~1.TXT")]
    #[case("[x]=y;z.dat", "XYZ~1.DAT")]
    #[case("???", "_~1")]
    fn test_generated_short_names(#[case] long: &str, #[case] expected: &str) {
        let mut names = ShortNames::new();
        let short = names.shorten(long).unwrap();
        assert_eq!(short, expected);
        assert!(is_short_name(&short), "{short} is not 8.3");
    }

    #[test]
    fn test_shared_stem_gets_distinct_numerals() {
        let mut names = ShortNames::new();
        assert_eq!(names.shorten("LongFile1.txt").unwrap(), "LONGFI~1.TXT");
        assert_eq!(names.shorten("LongFile2.txt").unwrap(), "LONGFI~2.TXT");
        // Different extension, no collision.
        assert_eq!(names.shorten("LongFile3.doc").unwrap(), "LONGFI~1.DOC");
    }

    #[test]
    fn test_idempotent_case_insensitive() {
        let mut names = ShortNames::new();
        let first = names.shorten("Program Data").unwrap();
        let second = names.shorten("PROGRAM DATA").unwrap();
        assert_eq!(first, second);
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn test_numeral_carry_shrinks_stem() {
        let mut names = ShortNames::new();
        let shorts: Vec<_> = (0..11).map(|i| names.shorten(&format!("LongFileName{i}.txt")).unwrap()).collect();
        assert_eq!(shorts[0], "LONGFI~1.TXT");
        assert_eq!(shorts[8], "LONGFI~9.TXT");
        assert_eq!(shorts[9], "LONGF~10.TXT");
        assert_eq!(shorts[10], "LONGF~11.TXT");
        assert!(shorts.iter().all(|short| is_short_name(short)));
    }

    #[test]
    fn test_existing_short_name_is_avoided() {
        let mut names = ShortNames::new();
        assert_eq!(names.shorten("LONGFI~1.TXT").unwrap(), "LONGFI~1.TXT");
        assert_eq!(names.shorten("LongFiles.txt").unwrap(), "LONGFI~2.TXT");
    }

    #[test]
    fn test_short_name_never_reassigned() {
        let mut names = ShortNames::new();
        assert_eq!(names.shorten("LongFiles.txt").unwrap(), "LONGFI~1.TXT");
        // Valid 8.3 comes back unchanged, but the pairing stays with the first owner.
        assert_eq!(names.shorten("longfi~1.txt").unwrap(), "longfi~1.txt");
        assert_eq!(names.long_for("LONGFI~1.TXT"), Some("LongFiles.txt"));
        assert_eq!(names.short_for("longfi~1.txt"), None);
    }

    #[test]
    fn test_try_record() {
        let mut names = ShortNames::new();
        assert!(names.try_record("MYAPPL~1", "My Application"));
        assert!(names.try_record("MYAPPL~1", "MY APPLICATION"));
        // Same short name, different long name: left with its first owner.
        assert!(!names.try_record("MYAPPL~1", "My Applause"));
        assert_eq!(names.long_for("MYAPPL~1"), Some("My Application"));
        assert_eq!(names.short_for("My Applause"), None);
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn test_record() {
        let mut names = ShortNames::new();
        names.record("MYAPPL~1", "My Application").unwrap();
        names.record("MYAPPL~1", "my application").unwrap();
        assert_eq!(names.shorten("My Application").unwrap(), "MYAPPL~1");
        assert_eq!(names.shorten("My Applications").unwrap(), "MYAPPL~2");

        let err = names.record("MYAPPL~3", "My Application").unwrap_err();
        assert!(matches!(&*err, ErrorKind::Conflict(_)));
        let err = names.record("MYAPPL~1", "Someone Else").unwrap_err();
        assert!(matches!(&*err, ErrorKind::Conflict(_)));
    }
}
