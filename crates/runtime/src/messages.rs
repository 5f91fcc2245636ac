use phrasekit_template::{Part, TemplateError};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::localization::LocalizationError;
use crate::translator::Translator;

const PATH_SEPARATOR: char = '.';

/// A message template bound to the translator of its locale.
#[derive(Clone)]
pub struct BoundMessage {
    key: String,
    template: Arc<str>,
    translator: Arc<Translator>,
}

impl BoundMessage {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn call(&self, args: &[Value]) -> String {
        self.translator.translate(&self.template, args)
    }

    pub fn try_call(&self, args: &[Value]) -> Result<String, TemplateError> {
        self.translator.try_translate(&self.template, args)
    }

    /// Whether the template contains a plural block.
    pub fn is_plural(&self) -> bool {
        self.translator
            .prepare(&self.template)
            .map(|parsed| {
                parsed
                    .parts()
                    .iter()
                    .any(|part| matches!(part, Part::Plural(_)))
            })
            .unwrap_or(false)
    }

    /// Argument keys the template reads.
    pub fn argument_keys(&self) -> Vec<String> {
        self.translator
            .prepare(&self.template)
            .map(|parsed| parsed.keys().into_iter().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

impl fmt::Debug for BoundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundMessage")
            .field("key", &self.key)
            .field("template", &self.template)
            .field("locale", &self.translator.locale())
            .finish()
    }
}

/// Every message of one locale, addressed by dotted key path.
///
/// Nested objects in a locale file become paths (`{"menu": {"file": "File"}}`
/// is reachable as `menu.file`). All templates are parsed when the tree is
/// built, so syntax errors surface at load time.
#[derive(Debug, Clone, Default)]
pub struct LocaleMessages {
    translator: Option<Arc<Translator>>,
    messages: BTreeMap<String, BoundMessage>,
}

impl LocaleMessages {
    /// A tree without a locale; every lookup renders as empty text.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(
        translator: Arc<Translator>,
        strings: &Map<String, Value>,
    ) -> Result<Self, LocalizationError> {
        let mut flat = Vec::new();
        flatten_strings(translator.locale(), "", strings, &mut flat)?;
        Self::from_flat(translator, flat)
    }

    /// Builds the tree from already-flattened `(path, template)` pairs.
    pub fn from_flat<I, K, T>(
        translator: Arc<Translator>,
        entries: I,
    ) -> Result<Self, LocalizationError>
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<String>,
    {
        let mut messages = BTreeMap::new();
        for (key, template) in entries {
            let key = key.into();
            let template: String = template.into();
            translator
                .prepare(&template)
                .map_err(|source| LocalizationError::Template {
                    locale: translator.locale().to_string(),
                    key: key.clone(),
                    source,
                })?;
            messages.insert(
                key.clone(),
                BoundMessage {
                    key,
                    template: Arc::from(template),
                    translator: Arc::clone(&translator),
                },
            );
        }
        Ok(Self {
            translator: Some(translator),
            messages,
        })
    }

    pub fn locale(&self) -> Option<&str> {
        self.translator.as_deref().map(Translator::locale)
    }

    pub fn translator(&self) -> Option<&Arc<Translator>> {
        self.translator.as_ref()
    }

    pub fn get(&self, path: &str) -> Option<&BoundMessage> {
        self.messages.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.messages.contains_key(path)
    }

    /// Renders the message at `path`; unknown paths render as empty text.
    pub fn text(&self, path: &str, args: &[Value]) -> String {
        self.get(path)
            .map(|message| message.call(args))
            .unwrap_or_default()
    }

    /// Messages directly below `prefix` (not in deeper groups), in key order.
    /// An empty prefix lists the top-level messages.
    pub fn children<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a BoundMessage> + 'a {
        self.messages.values().filter(move |message| {
            let rest = if prefix.is_empty() {
                Some(message.key.as_str())
            } else {
                message
                    .key
                    .strip_prefix(prefix)
                    .and_then(|rest| rest.strip_prefix(PATH_SEPARATOR))
            };
            rest.is_some_and(|rest| !rest.contains(PATH_SEPARATOR))
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(String::as_str)
    }

    pub fn messages(&self) -> impl Iterator<Item = &BoundMessage> {
        self.messages.values()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

fn flatten_strings(
    locale: &str,
    prefix: &str,
    strings: &Map<String, Value>,
    out: &mut Vec<(String, String)>,
) -> Result<(), LocalizationError> {
    for (name, value) in strings {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}{PATH_SEPARATOR}{name}")
        };
        match value {
            Value::String(template) => out.push((path, template.clone())),
            Value::Object(nested) => flatten_strings(locale, &path, nested, out)?,
            other => {
                return Err(LocalizationError::UnsupportedMessageType {
                    locale: locale.to_string(),
                    key: path,
                    kind: json_kind(other).to_string(),
                })
            }
        }
    }
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
