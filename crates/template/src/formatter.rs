use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::lexer::{split_top_level, strip_outer_braces};
use crate::value::{display_value, is_empty_result};

/// A named one-argument transformation. Returning `Value::Null` means "no result".
pub type FormatterFn = dyn Fn(&Value) -> Value + Send + Sync;

/// Named formatters supplied by the host application.
#[derive(Clone, Default)]
pub struct Formatters {
    entries: HashMap<String, Arc<FormatterFn>>,
}

impl Formatters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<F>(&mut self, name: impl Into<String>, formatter: F)
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.entries.insert(name.into(), Arc::new(formatter));
    }

    /// Builder form of [`Formatters::insert`].
    pub fn with<F>(mut self, name: impl Into<String>, formatter: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.insert(name, formatter);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FormatterFn> {
        self.entries.get(name).map(|formatter| formatter.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Adds every formatter from `other`, replacing same-named entries.
    pub fn extend(&mut self, other: &Formatters) {
        for (name, formatter) in &other.entries {
            self.entries.insert(name.clone(), Arc::clone(formatter));
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Formatters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("Formatters").field("names", &names).finish()
    }
}

/// Inline lookup table written as a formatter step, e.g. `{red:Rouge,*:Unknown}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitchCases {
    cases: Vec<(String, String)>,
}

impl SwitchCases {
    pub const WILDCARD: &'static str = "*";

    /// Parses a brace-wrapped `label:text` list; `None` when `text` is not braced.
    ///
    /// A comma-separated fragment without `:` continues the previous case's text.
    pub fn parse(text: &str) -> Option<Self> {
        let inner = strip_outer_braces(text.trim())?;
        let mut cases: Vec<(String, String)> = Vec::new();
        for fragment in split_top_level(inner, ',') {
            match fragment.split_once(':') {
                Some((label, value)) => {
                    cases.push((label.trim().to_string(), value.trim().to_string()))
                }
                None => {
                    if let Some((_, previous)) = cases.last_mut() {
                        previous.push(',');
                        previous.push_str(fragment);
                    }
                }
            }
        }
        Some(Self { cases })
    }

    /// Text for `label`, else the wildcard case.
    pub fn lookup(&self, label: &str) -> Option<&str> {
        self.get(label).or_else(|| self.get(Self::WILDCARD))
    }

    fn get(&self, label: &str) -> Option<&str> {
        self.cases
            .iter()
            .find(|(case, _)| case == label)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Runs `chain` over `initial` left to right.
///
/// A step that yields nothing (unknown formatter, unmatched switch without a
/// wildcard, or a `null`/`false`/`""` result) leaves the value unchanged.
pub fn apply_chain(formatters: &Formatters, chain: &[String], initial: Value) -> Value {
    chain.iter().fold(initial, |value, step| {
        match apply_step(formatters, step, &value) {
            Some(next) if !is_empty_result(&next) => next,
            _ => value,
        }
    })
}

fn apply_step(formatters: &Formatters, step: &str, value: &Value) -> Option<Value> {
    if let Some(cases) = SwitchCases::parse(step) {
        return cases
            .lookup(&display_value(value))
            .map(|text| Value::String(text.to_string()));
    }
    match formatters.get(step) {
        Some(formatter) => Some(formatter(value)),
        None => {
            tracing::trace!(formatter = step, "unknown formatter skipped");
            None
        }
    }
}
