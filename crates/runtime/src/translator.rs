use phrasekit_template::{
    render, Formatters, ParseOptions, ParsedTemplate, PluralSelector, TemplateCache,
    TemplateError,
};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::localization::LocalizationError;
use crate::plural::IcuPluralSelector;

/// Per-locale translation function: plural rules, formatters and a template cache.
pub struct Translator {
    locale: String,
    selector: Box<dyn PluralSelector>,
    formatters: Formatters,
    cache: TemplateCache,
}

impl Translator {
    /// Creates a translator using ICU plural rules for `locale`.
    pub fn new(locale: &str, formatters: Formatters) -> Result<Self, LocalizationError> {
        Self::with_options(locale, formatters, ParseOptions::default())
    }

    pub fn with_options(
        locale: &str,
        formatters: Formatters,
        options: ParseOptions,
    ) -> Result<Self, LocalizationError> {
        let selector = IcuPluralSelector::for_locale(locale)?;
        Ok(Self::with_selector(locale, selector, formatters, options))
    }

    /// Creates a translator with host-supplied plural rules.
    pub fn with_selector(
        locale: impl Into<String>,
        selector: impl PluralSelector + 'static,
        formatters: Formatters,
        options: ParseOptions,
    ) -> Self {
        Self {
            locale: locale.into(),
            selector: Box::new(selector),
            formatters,
            cache: TemplateCache::with_options(options),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn formatters(&self) -> &Formatters {
        &self.formatters
    }

    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }

    /// Parses `text` into the cache without rendering it.
    pub fn prepare(&self, text: &str) -> Result<Arc<ParsedTemplate>, TemplateError> {
        self.cache.resolve(text)
    }

    pub fn try_translate(&self, text: &str, args: &[Value]) -> Result<String, TemplateError> {
        render(
            &self.cache,
            text,
            self.selector.as_ref(),
            &self.formatters,
            args,
        )
    }

    /// Renders `text`; a malformed template is returned unchanged.
    pub fn translate(&self, text: &str, args: &[Value]) -> String {
        match self.try_translate(text, args) {
            Ok(rendered) => rendered,
            Err(error) => {
                tracing::warn!(
                    locale = %self.locale,
                    template = text,
                    %error,
                    "template left unrendered"
                );
                text.to_string()
            }
        }
    }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("locale", &self.locale)
            .field("formatters", &self.formatters)
            .field("cached_templates", &self.cache.len())
            .finish()
    }
}
