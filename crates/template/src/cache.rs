use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use crate::error::TemplateError;
use crate::formatter::Formatters;
use crate::interpolate::interpolate;
use crate::parser::{parse_with, ParseOptions, ParsedTemplate};
use crate::plural::PluralSelector;

/// Parsed templates keyed by their source text.
///
/// Entries are never evicted. Two threads missing on the same text may both
/// parse it; the later insert replaces an identical entry.
#[derive(Debug, Default)]
pub struct TemplateCache {
    options: ParseOptions,
    entries: RwLock<HashMap<String, Arc<ParsedTemplate>>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self {
            options,
            entries: RwLock::default(),
        }
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Returns the parsed form of `text`, parsing it on first use.
    ///
    /// Parse faults are returned to the caller and are not cached.
    pub fn resolve(&self, text: &str) -> Result<Arc<ParsedTemplate>, TemplateError> {
        if let Some(parsed) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(text)
        {
            return Ok(Arc::clone(parsed));
        }

        let parsed = Arc::new(parse_with(text, self.options)?);
        tracing::debug!(template = text, parts = parsed.parts().len(), "template cached");
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(text.to_string(), Arc::clone(&parsed));
        Ok(parsed)
    }

    pub fn contains(&self, text: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(text)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Looks `text` up in `cache` (parsing on a miss) and interpolates it.
pub fn render<S>(
    cache: &TemplateCache,
    text: &str,
    selector: &S,
    formatters: &Formatters,
    args: &[Value],
) -> Result<String, TemplateError>
where
    S: PluralSelector + ?Sized,
{
    let parsed = cache.resolve(text)?;
    Ok(interpolate(&parsed, selector, formatters, args))
}
