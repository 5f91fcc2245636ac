use phrasekit_template::ParseOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_LOCALE: &str = "en";
const DEFAULT_LOCALE_DIR: &str = "locales";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse configuration {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Runtime settings, usually read from a JSON file next to the locale packs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_locale")]
    pub default_locale: String,
    #[serde(default = "default_locale_dirs")]
    pub locale_dirs: Vec<PathBuf>,
    /// Collapse empty fields of parsed templates.
    #[serde(default = "default_true")]
    pub optimize: bool,
    /// Register `uppercase`, `lowercase`, `capitalize` and `trim`.
    #[serde(default = "default_true")]
    pub builtin_formatters: bool,
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_locale_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from(DEFAULT_LOCALE_DIR)]
}

fn default_true() -> bool {
    true
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            locale_dirs: default_locale_dirs(),
            optimize: true,
            builtin_formatters: true,
        }
    }
}

impl RuntimeConfig {
    /// Reads the configuration, returning defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let mut config: RuntimeConfig =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.sanitize();
        Ok(config)
    }

    pub fn sanitize(&mut self) {
        if self.default_locale.trim().is_empty() {
            self.default_locale = default_locale();
        }
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            optimize: self.optimize,
        }
    }

    /// Resolves relative locale directories against `base`.
    pub fn resolve_dirs(&self, base: &Path) -> Vec<PathBuf> {
        self.locale_dirs
            .iter()
            .map(|dir| {
                if dir.is_absolute() {
                    dir.clone()
                } else {
                    base.join(dir)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempdir().expect("tempdir");
        let config = RuntimeConfig::load(temp.path().join("phrasekit.json")).expect("load");
        assert_eq!(config, RuntimeConfig::default());
        assert!(config.parse_options().optimize);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("phrasekit.json");
        fs::write(&path, r#"{ "default_locale": "", "optimize": false }"#).expect("write");
        let config = RuntimeConfig::load(&path).expect("load");
        assert_eq!(config.default_locale, "en");
        assert!(!config.optimize);
        assert!(config.builtin_formatters);
        assert_eq!(config.locale_dirs, vec![PathBuf::from("locales")]);
    }

    #[test]
    fn invalid_json_is_reported() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("phrasekit.json");
        fs::write(&path, "{ nope").expect("write");
        assert!(matches!(
            RuntimeConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn relative_dirs_resolve_against_base() {
        let config = RuntimeConfig {
            locale_dirs: vec![PathBuf::from("langs"), PathBuf::from("/abs/langs")],
            ..RuntimeConfig::default()
        };
        let dirs = config.resolve_dirs(Path::new("/work"));
        assert_eq!(dirs[0], PathBuf::from("/work/langs"));
        assert_eq!(dirs[1], PathBuf::from("/abs/langs"));
    }
}
