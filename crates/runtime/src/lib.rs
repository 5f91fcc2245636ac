pub mod config;
pub mod formatters;
pub mod localization;
pub mod messages;
pub mod plural;
pub mod translator;

pub use config::{ConfigError, RuntimeConfig};
pub use formatters::builtin_formatters;
pub use localization::{LocaleCatalogStats, LocaleSummary, LocalizationError, LocalizationManager};
pub use messages::{BoundMessage, LocaleMessages};
pub use plural::IcuPluralSelector;
pub use translator::Translator;

pub use phrasekit_template::{Formatters, ParseOptions, PluralCategory, TemplateError};
