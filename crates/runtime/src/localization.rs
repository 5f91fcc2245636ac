use icu_locid::ParserError as LocaleParserError;
use phrasekit_template::{Formatters, ParseOptions, TemplateError};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::config::RuntimeConfig;
use crate::formatters::builtin_formatters;
use crate::messages::{BoundMessage, LocaleMessages};
use crate::translator::Translator;

#[derive(Debug, Error)]
pub enum LocalizationError {
    #[error("failed to enumerate locale directory {0}: {1}")]
    ReadDir(PathBuf, io::Error),
    #[error("failed to read locale file {0}: {1}")]
    ReadFile(PathBuf, io::Error),
    #[error("failed to parse locale file {0}: {1}")]
    ParseFile(PathBuf, serde_json::Error),
    #[error("duplicate locale code {0}")]
    DuplicateLocale(String),
    #[error("locale {locale} message '{key}' has a malformed template: {source}")]
    Template {
        locale: String,
        key: String,
        #[source]
        source: TemplateError,
    },
    #[error("locale {locale} message '{key}' uses unsupported type '{kind}'")]
    UnsupportedMessageType {
        locale: String,
        key: String,
        kind: String,
    },
    #[error("locale identifier '{locale}' is invalid: {error}")]
    InvalidLocaleIdentifier {
        locale: String,
        error: LocaleParserError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSummary {
    pub code: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleCatalogStats {
    pub code: String,
    pub display_name: String,
    pub total_entries: usize,
    pub plural_entries: usize,
}

#[derive(Debug, Clone)]
struct LocaleCatalog {
    summary: LocaleSummary,
    messages: LocaleMessages,
}

/// Loaded locale packs with an active locale and a fallback locale.
#[derive(Debug, Clone)]
pub struct LocalizationManager {
    catalogs: Vec<LocaleCatalog>,
    active: Option<usize>,
    fallback: Option<usize>,
    formatters: Formatters,
    options: ParseOptions,
}

#[derive(Debug, Deserialize)]
struct LocaleFile {
    locale: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    strings: Map<String, Value>,
}

impl Default for LocalizationManager {
    fn default() -> Self {
        Self::new(Formatters::new(), ParseOptions::default())
    }
}

impl LocalizationManager {
    /// Creates a manager without locales; every lookup returns its key.
    pub fn new(formatters: Formatters, options: ParseOptions) -> Self {
        Self {
            catalogs: Vec::new(),
            active: None,
            fallback: None,
            formatters,
            options,
        }
    }

    /// Loads every configured locale directory (relative paths resolve against `base`).
    pub fn from_config(config: &RuntimeConfig, base: &Path) -> Result<Self, LocalizationError> {
        let formatters = if config.builtin_formatters {
            builtin_formatters()
        } else {
            Formatters::new()
        };
        let mut manager = Self::new(formatters, config.parse_options());
        for dir in config.resolve_dirs(base) {
            manager.load_directory(&dir)?;
        }
        manager.apply_default_locale(&config.default_locale);
        Ok(manager)
    }

    /// Builds a manager from the `*.json` packs in `path`, falling back to `default_locale`.
    pub fn load_from_dir(
        path: impl AsRef<Path>,
        default_locale: &str,
        formatters: Formatters,
    ) -> Result<Self, LocalizationError> {
        Self::load_from_dirs(std::iter::once(path), default_locale, formatters)
    }

    /// Like [`Self::load_from_dir`] over several directories; a locale may appear only once.
    pub fn load_from_dirs<I, P>(
        paths: I,
        default_locale: &str,
        formatters: Formatters,
    ) -> Result<Self, LocalizationError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut manager = Self::new(formatters, ParseOptions::default());
        for path in paths {
            manager.load_directory(path.as_ref())?;
        }
        manager.apply_default_locale(default_locale);
        Ok(manager)
    }

    /// Registers a locale from an in-memory string table, using the manager's formatters.
    pub fn add_locale(
        &mut self,
        code: &str,
        display_name: Option<String>,
        strings: &Map<String, Value>,
    ) -> Result<(), LocalizationError> {
        let formatters = self.formatters.clone();
        self.add_locale_with_formatters(code, display_name, strings, formatters)
    }

    /// Registers a locale whose templates see only `formatters`.
    pub fn add_locale_with_formatters(
        &mut self,
        code: &str,
        display_name: Option<String>,
        strings: &Map<String, Value>,
        formatters: Formatters,
    ) -> Result<(), LocalizationError> {
        if self.position(code).is_some() {
            return Err(LocalizationError::DuplicateLocale(code.to_string()));
        }
        let translator = Translator::with_options(code, formatters, self.options)?;
        let messages = LocaleMessages::new(Arc::new(translator), strings)?;
        tracing::debug!(locale = code, messages = messages.len(), "locale loaded");
        self.catalogs.push(LocaleCatalog {
            summary: LocaleSummary {
                code: code.to_string(),
                display_name: display_name.unwrap_or_else(|| code.to_string()),
            },
            messages,
        });
        if self.fallback.is_none() {
            self.fallback = Some(self.catalogs.len() - 1);
            self.active = self.fallback;
        }
        Ok(())
    }

    /// Rebinds every message of a loaded locale to `formatters`.
    ///
    /// Returns `Ok(false)` when `code` is not loaded.
    pub fn set_locale_formatters(
        &mut self,
        code: &str,
        formatters: Formatters,
    ) -> Result<bool, LocalizationError> {
        let Some(index) = self.position(code) else {
            return Ok(false);
        };
        let translator = Arc::new(Translator::with_options(code, formatters, self.options)?);
        let catalog = &mut self.catalogs[index];
        let entries: Vec<(String, String)> = catalog
            .messages
            .messages()
            .map(|message| (message.key().to_string(), message.template().to_string()))
            .collect();
        catalog.messages = LocaleMessages::from_flat(translator, entries)?;
        tracing::debug!(locale = code, "locale formatters replaced");
        Ok(true)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_code(&self) -> Option<&str> {
        self.active
            .map(|index| self.catalogs[index].summary.code.as_str())
    }

    pub fn fallback_code(&self) -> Option<&str> {
        self.fallback
            .map(|index| self.catalogs[index].summary.code.as_str())
    }

    /// Loaded locales in load order.
    pub fn locale_summaries(&self) -> Vec<LocaleSummary> {
        self.catalogs
            .iter()
            .map(|catalog| catalog.summary.clone())
            .collect()
    }

    /// Message and plural-message counts per locale.
    pub fn catalog_stats(&self) -> Vec<LocaleCatalogStats> {
        self.catalogs
            .iter()
            .map(|catalog| LocaleCatalogStats {
                code: catalog.summary.code.clone(),
                display_name: catalog.summary.display_name.clone(),
                total_entries: catalog.messages.len(),
                plural_entries: catalog
                    .messages
                    .messages()
                    .filter(|message| message.is_plural())
                    .count(),
            })
            .collect()
    }

    /// Returns keys present in the fallback locale but absent from `code`.
    pub fn missing_keys(&self, code: &str) -> Option<Vec<String>> {
        let catalog = &self.catalogs[self.position(code)?];
        let fallback = &self.catalogs[self.fallback?];
        Some(
            fallback
                .messages
                .keys()
                .filter(|key| !catalog.messages.contains(key))
                .map(str::to_string)
                .collect(),
        )
    }

    /// Makes the locale at `index` active; `false` when out of range.
    pub fn set_active_by_index(&mut self, index: usize) -> bool {
        if index < self.catalogs.len() {
            self.active = Some(index);
            true
        } else {
            false
        }
    }

    /// Makes `code` active; `false` when no such locale is loaded.
    pub fn set_active_by_code(&mut self, code: &str) -> bool {
        match self.position(code) {
            Some(index) => {
                self.active = Some(index);
                true
            }
            None => false,
        }
    }

    /// Message tree of one locale.
    pub fn messages(&self, code: &str) -> Option<&LocaleMessages> {
        self.position(code)
            .map(|index| &self.catalogs[index].messages)
    }

    pub fn active_messages(&self) -> Option<&LocaleMessages> {
        self.active.map(|index| &self.catalogs[index].messages)
    }

    /// Looks `key` up in the active locale, then the fallback locale.
    pub fn message(&self, key: &str) -> Option<&BoundMessage> {
        [self.active, self.fallback]
            .into_iter()
            .flatten()
            .find_map(|index| self.catalogs[index].messages.get(key))
    }

    /// Renders `key` in the active locale, then the fallback locale; returns the key itself
    /// when neither provides it.
    pub fn text(&self, key: &str, args: &[Value]) -> String {
        match self.message(key) {
            Some(message) => message.call(args),
            None => {
                tracing::warn!(key, locale = self.active_code(), "missing localization key");
                key.to_string()
            }
        }
    }

    /// Whether `code` defines a message at `key`, ignoring the fallback.
    pub fn locale_has_key(&self, code: &str, key: &str) -> bool {
        self.messages(code)
            .is_some_and(|messages| messages.contains(key))
    }

    fn position(&self, code: &str) -> Option<usize> {
        self.catalogs
            .iter()
            .position(|catalog| catalog.summary.code == code)
    }

    fn load_directory(&mut self, dir: &Path) -> Result<(), LocalizationError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(dir = %dir.display(), "locale directory missing; skipped");
                return Ok(());
            }
            Err(err) => return Err(LocalizationError::ReadDir(dir.to_path_buf(), err)),
        };

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| LocalizationError::ReadDir(dir.to_path_buf(), err))?;
            let path = entry.path();
            let metadata = entry
                .metadata()
                .map_err(|err| LocalizationError::ReadFile(path.clone(), err))?;
            if metadata.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("json")
            {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let contents = fs::read_to_string(&path)
                .map_err(|err| LocalizationError::ReadFile(path.clone(), err))?;
            let file: LocaleFile = serde_json::from_str(&contents)
                .map_err(|err| LocalizationError::ParseFile(path.clone(), err))?;
            self.add_locale(&file.locale, file.display_name, &file.strings)?;
        }
        Ok(())
    }

    fn apply_default_locale(&mut self, default_locale: &str) {
        if let Some(index) = self.position(default_locale) {
            self.fallback = Some(index);
        }
        self.active = self.fallback;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn manager() -> LocalizationManager {
        let mut manager = LocalizationManager::new(builtin_formatters(), ParseOptions::default());
        manager
            .add_locale(
                "en",
                Some("English".into()),
                &table(json!({
                    "greeting": "Hello {name|capitalize}",
                    "inbox": { "count": "{n:{no mail|one mail|?? mails}}" }
                })),
            )
            .unwrap();
        manager
            .add_locale("de", None, &table(json!({ "greeting": "Hallo {name}" })))
            .unwrap();
        manager
    }

    #[test]
    fn first_locale_becomes_fallback() {
        let manager = manager();
        assert_eq!(manager.fallback_code(), Some("en"));
        assert_eq!(manager.active_code(), Some("en"));
        assert_eq!(
            manager.text("greeting", &[json!({ "name": "ada" })]),
            "Hello Ada"
        );
    }

    #[test]
    fn active_locale_falls_back_per_key() {
        let mut manager = manager();
        assert!(manager.set_active_by_code("de"));
        assert_eq!(manager.text("greeting", &[json!({ "name": "ada" })]), "Hallo ada");
        assert_eq!(manager.text("inbox.count", &[json!({ "n": 0 })]), "no mail");
        assert_eq!(manager.text("nope", &[]), "nope");
        assert!(!manager.set_active_by_code("fr"));
        assert!(!manager.set_active_by_index(7));
    }

    #[test]
    fn stats_and_missing_keys() {
        let manager = manager();
        let stats = manager.catalog_stats();
        assert_eq!(stats[0].total_entries, 2);
        assert_eq!(stats[0].plural_entries, 1);
        assert_eq!(stats[1].display_name, "de");
        assert_eq!(manager.missing_keys("de"), Some(vec!["inbox.count".to_string()]));
        assert_eq!(manager.missing_keys("fr"), None);
        assert!(manager.locale_has_key("en", "inbox.count"));
    }

    #[test]
    fn duplicate_locale_is_rejected() {
        let mut manager = manager();
        let error = manager.add_locale("de", None, &Map::new()).unwrap_err();
        assert!(matches!(error, LocalizationError::DuplicateLocale(code) if code == "de"));
    }

    #[test]
    fn empty_manager_returns_keys() {
        let manager = LocalizationManager::default();
        assert_eq!(manager.text("menu.file", &[]), "menu.file");
        assert_eq!(manager.active_code(), None);
        assert!(manager.active_messages().is_none());
    }
}
