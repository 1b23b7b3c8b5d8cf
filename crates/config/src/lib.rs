//! Configuration loading and validation.
//!
//! Sources are layered with [`figment`], later ones overriding earlier ones:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. `config.toml` in the user's configuration directory, if present.
//! 3. An explicitly requested file (TOML, YAML or JSON, by extension).
//! 4. `MSIKIT_`-prefixed environment variables, with `__` separating nested
//!    keys (`MSIKIT_IDENTIFIERS__MAX_LENGTH=50`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use msikit_directory::NamePair;
use msikit_ident::is_identifier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "MSIKIT_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub identifiers: Identifiers,
    pub directories: Directories,
}

/// Identifier length limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identifiers {
    /// Limit for any context without its own entry in `max_lengths`.
    pub max_length: usize,
    /// Per-context limits, keyed by context name (case-insensitive).
    pub max_lengths: BTreeMap<String, usize>,
}
impl Default for Identifiers {
    fn default() -> Self {
        Self { max_length: msikit_ident::DEFAULT_MAX_LENGTH, max_lengths: BTreeMap::from([("Directory".to_string(), 72)]) }
    }
}
impl Identifiers {
    /// The length limit that applies to `context`.
    pub fn max_length_for(&self, context: &str) -> usize {
        self.max_lengths
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(context))
            .map_or(self.max_length, |(_, length)| *length)
    }
}

/// Shape of the directory tree root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Directories {
    /// Identifier of the root directory.
    pub root: String,
    /// `DefaultDir` of the root directory.
    pub source_dir: String,
}
impl Default for Directories {
    fn default() -> Self {
        Self { root: "TARGETDIR".to_string(), source_dir: "SourceDir".to_string() }
    }
}

/// Location of the per-user configuration file.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "msikit").map(|dirs| dirs.config_dir().join("config.toml"))
}

impl Config {
    /// Loads the configuration from every source, with `explicit` (if given)
    /// layered over the per-user file.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_from(default_path().as_deref(), explicit)
    }

    /// Like [`load`](Self::load), but with the per-user file location supplied.
    ///
    /// # Errors
    /// - [`ErrorKind::NotFound`] if `explicit` doesn't exist.
    /// - [`ErrorKind::UnsupportedFormat`] if `explicit` isn't TOML, YAML or JSON.
    /// - [`ErrorKind::Load`] if any source fails to parse.
    /// - [`ErrorKind::Invalid`] if the merged result fails [`validate`](Self::validate).
    pub fn load_from(user: Option<&Path>, explicit: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(user) = user.filter(|path| path.is_file()) {
            tracing::debug!(path = %user.display(), "Loading user configuration");
            figment = figment.merge(Toml::file(user));
        }
        if let Some(path) = explicit {
            if !path.is_file() {
                exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
            }
            tracing::debug!(path = %path.display(), "Loading configuration file");
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
            };
        }
        let config: Config = figment.merge(Env::prefixed(ENV_PREFIX).split("__")).extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that could never produce a usable table.
    pub fn validate(&self) -> Result<()> {
        if self.identifiers.max_length == 0 {
            exn::bail!(ErrorKind::Invalid("identifiers.max_length must be positive".to_string()));
        }
        if let Some((context, _)) = self.identifiers.max_lengths.iter().find(|(_, length)| **length == 0) {
            exn::bail!(ErrorKind::Invalid(format!("identifiers.max_lengths.{context} must be positive")));
        }
        if !is_identifier(&self.directories.root) {
            exn::bail!(ErrorKind::Invalid(format!("directories.root {:?} is not an identifier", self.directories.root)));
        }
        // Written verbatim as the root's DefaultDir, so it has to read back as one.
        let source_dir = &self.directories.source_dir;
        source_dir
            .parse::<NamePair>()
            .or_raise(|| ErrorKind::Invalid(format!("directories.source_dir {source_dir:?} is not a short[|long] name")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    // Every test that reads configuration runs inside a `Jail`, which
    // serializes access to the process environment and working directory.

    fn load(jail: &mut Jail, name: &str, contents: &str) -> Result<Config> {
        jail.create_file(name, contents).unwrap();
        Config::load_from(None, Some(Path::new(name)))
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.identifiers.max_length_for("Component"), 38);
        assert_eq!(config.identifiers.max_length_for("Directory"), 72);
        assert_eq!(config.identifiers.max_length_for("directory"), 72);
        assert_eq!(config.directories.root, "TARGETDIR");
        config.validate().unwrap();

        let mut config = Config::default();
        config.directories.source_dir = "SRC~1|Source Files".to_string();
        config.validate().unwrap();
    }

    #[test]
    fn test_no_sources() {
        Jail::expect_with(|_| {
            assert_eq!(Config::load_from(None, None).unwrap(), Config::default());
            Ok(())
        });
    }

    #[rstest]
    #[case("config.toml", "[identifiers]\nmax_length = 50\n\n[directories]\nroot = \"ROOTDIR\"\n")]
    #[case("config.yaml", "identifiers:\n  max_length: 50\ndirectories:\n  root: ROOTDIR\n")]
    #[case("config.json", r#"{"identifiers": {"max_length": 50}, "directories": {"root": "ROOTDIR"}}"#)]
    fn test_load_file(#[case] name: &str, #[case] contents: &str) {
        Jail::expect_with(|jail| {
            let config = load(jail, name, contents).unwrap();
            assert_eq!(config.identifiers.max_length, 50);
            assert_eq!(config.directories.root, "ROOTDIR");
            // Untouched values keep their defaults.
            assert_eq!(config.identifiers.max_length_for("Directory"), 72);
            assert_eq!(config.directories.source_dir, "SourceDir");
            Ok(())
        });
    }

    #[test]
    fn test_explicit_overrides_user() {
        Jail::expect_with(|jail| {
            jail.create_file("user.toml", "[identifiers]\nmax_length = 20\n\n[directories]\nsource_dir = \"Src\"\n")?;
            jail.create_file("explicit.toml", "[identifiers]\nmax_length = 30\n")?;
            let config = Config::load_from(Some(Path::new("user.toml")), Some(Path::new("explicit.toml"))).unwrap();
            assert_eq!(config.identifiers.max_length, 30);
            assert_eq!(config.directories.source_dir, "Src");
            Ok(())
        });
    }

    #[test]
    fn test_missing_file() {
        Jail::expect_with(|_| {
            let err = Config::load_from(None, Some(Path::new("missing.toml"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::NotFound(_)));
            Ok(())
        });
    }

    #[test]
    fn test_unsupported_format() {
        Jail::expect_with(|jail| {
            let err = load(jail, "config.ini", "max_length=1").unwrap_err();
            assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_)));
            Ok(())
        });
    }

    #[test]
    fn test_malformed_file() {
        Jail::expect_with(|jail| {
            let err = load(jail, "config.toml", "[identifiers\nmax_length = ").unwrap_err();
            assert_eq!(*err, ErrorKind::Load);
            Ok(())
        });
    }

    #[rstest]
    #[case("[identifiers]\nmax_length = 0\n")]
    #[case("[identifiers.max_lengths]\nFile = 0\n")]
    #[case("[directories]\nroot = \"1ROOT\"\n")]
    #[case("[directories]\nsource_dir = \"\"\n")]
    #[case("[directories]\nsource_dir = \"Src|\"\n")]
    #[case("[directories]\nsource_dir = \"Src:Other\"\n")]
    #[case("[directories]\nsource_dir = \"Src\\tOther\"\n")]
    fn test_invalid_values(#[case] contents: &str) {
        Jail::expect_with(|jail| {
            let err = load(jail, "config.toml", contents).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Invalid(_)));
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides() {
        Jail::expect_with(|jail| {
            jail.set_env("MSIKIT_IDENTIFIERS__MAX_LENGTH", "44");
            jail.set_env("MSIKIT_DIRECTORIES__ROOT", "APPROOT");
            let config = load(jail, "config.toml", "[identifiers]\nmax_length = 30\n").unwrap();
            assert_eq!(config.identifiers.max_length, 44);
            assert_eq!(config.directories.root, "APPROOT");
            Ok(())
        });
    }
}
