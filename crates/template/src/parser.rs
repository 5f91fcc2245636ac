use crate::error::TemplateError;
use crate::lexer::{split, split_top_level, strip_outer_braces, Segment};

const MAX_PLURAL_ALTERNATIVES: usize = 6;
const DEFAULT_KEY: &str = "0";
const ZERO_FIELD: &str = "0";

/// Parser switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Collapse empty optional fields (`Some("")` becomes `None`).
    pub optimize: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { optimize: true }
    }
}

/// A placeholder resolving to a single argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentPart {
    pub key: String,
    pub type_tag: Option<String>,
    pub optional: bool,
    /// Formatter names, applied left to right.
    pub formatters: Vec<String>,
}

/// Alternatives of a plural block, by CLDR slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluralForms {
    pub zero: Option<String>,
    pub one: Option<String>,
    pub two: Option<String>,
    pub few: Option<String>,
    pub many: Option<String>,
    pub other: Option<String>,
}

impl PluralForms {
    /// Assigns alternatives to slots by how many were written.
    ///
    /// | count | slots |
    /// |---|---|
    /// | 1 | other |
    /// | 2 | one, other |
    /// | 3 | zero, one, other |
    /// | 4 | zero, one, two, other |
    /// | 5, 6 | zero, one, two, few, many, other |
    fn from_alternatives(alternatives: Vec<String>) -> Self {
        let count = alternatives.len();
        let mut written = alternatives.into_iter();
        let [a, b, c, d, e, f]: [Option<String>; 6] = std::array::from_fn(|_| written.next());
        match count {
            1 => Self {
                other: a,
                ..Default::default()
            },
            2 => Self {
                one: a,
                other: b,
                ..Default::default()
            },
            3 => Self {
                zero: a,
                one: b,
                other: c,
                ..Default::default()
            },
            4 => Self {
                zero: a,
                one: b,
                two: c,
                other: d,
                ..Default::default()
            },
            _ => Self {
                zero: a,
                one: b,
                two: c,
                few: d,
                many: e,
                other: f,
            },
        }
    }

    fn slots_mut(&mut self) -> impl Iterator<Item = &mut Option<String>> {
        [
            &mut self.zero,
            &mut self.one,
            &mut self.two,
            &mut self.few,
            &mut self.many,
            &mut self.other,
        ]
        .into_iter()
    }
}

/// A placeholder choosing one of several literal alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralPart {
    pub key: String,
    pub forms: PluralForms,
}

/// One element of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Literal(String),
    Argument(ArgumentPart),
    Plural(PluralPart),
}

impl Part {
    /// Resolved argument key; `None` for literals.
    pub fn key(&self) -> Option<&str> {
        match self {
            Part::Literal(_) => None,
            Part::Argument(argument) => Some(&argument.key),
            Part::Plural(plural) => Some(&plural.key),
        }
    }
}

/// Parsed form of a template string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTemplate {
    parts: Vec<Part>,
}

impl ParsedTemplate {
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Whether rendering needs arguments at all.
    pub fn is_literal(&self) -> bool {
        self.parts.iter().all(|part| matches!(part, Part::Literal(_)))
    }

    /// Argument keys referenced by the template, in first-use order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for key in self.parts.iter().filter_map(Part::key) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}

/// Parses a template with default options.
pub fn parse(text: &str) -> Result<ParsedTemplate, TemplateError> {
    parse_with(text, ParseOptions::default())
}

/// Parses a template.
///
/// Keyless parts are resolved once the whole text has been scanned: a plural
/// block takes the key of the closest preceding placeholder, and anything
/// still keyless takes the first key seen, else `"0"`.
pub fn parse_with(text: &str, options: ParseOptions) -> Result<ParsedTemplate, TemplateError> {
    let mut first_key = String::new();
    let mut last_key = String::new();
    let mut parts = Vec::new();

    for segment in split(text)? {
        let part = match segment {
            Segment::Literal(literal) => Part::Literal(literal.to_string()),
            Segment::Expression(content) => match plural_body(content) {
                Some((key, values)) => {
                    let key = key.trim();
                    let key = if key.is_empty() {
                        last_key.as_str()
                    } else {
                        key
                    };
                    Part::Plural(PluralPart {
                        key: key.to_string(),
                        forms: parse_plural_forms(values, content)?,
                    })
                }
                None => {
                    let argument = parse_argument(content);
                    if !argument.key.is_empty() {
                        last_key.clone_from(&argument.key);
                    }
                    if first_key.is_empty() {
                        first_key.clone_from(&last_key);
                    }
                    Part::Argument(argument)
                }
            },
        };
        parts.push(part);
    }

    let fallback_key = if first_key.is_empty() {
        DEFAULT_KEY
    } else {
        first_key.as_str()
    };
    for part in &mut parts {
        normalize(part, fallback_key, options);
    }
    Ok(ParsedTemplate { parts })
}

/// Recognises `{{key:alts}}` and `{key:{alts}}`, returning the raw key and
/// value list.
fn plural_body(content: &str) -> Option<(&str, &str)> {
    if let Some(inner) = strip_outer_braces(content.trim()) {
        let head_end = inner.find(['|', ',', '{']).unwrap_or(inner.len());
        return match inner[..head_end].find(':') {
            Some(colon) => Some((&inner[..colon], &inner[colon + 1..])),
            None => Some(("", inner)),
        };
    }
    let (key, rest) = content.split_once(':')?;
    if key.contains(['|', '{', '}']) {
        return None;
    }
    strip_outer_braces(rest.trim()).map(|values| (key, values))
}

fn parse_plural_forms(values: &str, body: &str) -> Result<PluralForms, TemplateError> {
    let alternatives = split_alternatives(values);
    let count = alternatives.len();
    if count == 0 || count > MAX_PLURAL_ALTERNATIVES {
        return Err(TemplateError::PluralArity {
            body: body.to_string(),
            count,
        });
    }
    Ok(PluralForms::from_alternatives(alternatives))
}

/// A comma list whose first fragment opens with `label:` is read as
/// `label:text` pairs; labels only mark where an alternative starts, the text
/// may contain `|`, and a fragment without `:` belongs to the previous
/// alternative. Anything else is split on top-level pipes.
fn split_alternatives(values: &str) -> Vec<String> {
    if values.trim().is_empty() {
        return Vec::new();
    }
    let fragments = split_top_level(values, ',');
    if fragments.len() == 1 || !has_label(fragments[0]) {
        return split_top_level(values, '|')
            .into_iter()
            .map(str::to_string)
            .collect();
    }

    let mut alternatives: Vec<String> = Vec::new();
    for fragment in fragments {
        if let Some((_label, text)) = fragment.split_once(':') {
            alternatives.push(text.to_string());
        } else if let Some(previous) = alternatives.last_mut() {
            previous.push(',');
            previous.push_str(fragment);
        } else {
            alternatives.push(fragment.to_string());
        }
    }
    alternatives
}

fn has_label(fragment: &str) -> bool {
    match (fragment.find(':'), fragment.find('|')) {
        (Some(colon), Some(pipe)) => colon < pipe,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

fn parse_argument(content: &str) -> ArgumentPart {
    let mut pieces = split_top_level(content, '|').into_iter();
    let key_part = pieces.next().unwrap_or_default();
    let formatters = pieces.map(str::to_string).collect();

    let mut typed = key_part.split(':');
    let key_without_type = typed.next().unwrap_or_default();
    let type_tag = typed.next().map(str::to_string);

    let mut marked = key_without_type.split('?');
    let key = marked.next().unwrap_or_default().trim().to_string();
    let optional = marked.next() == Some("");

    ArgumentPart {
        key,
        type_tag,
        optional,
        formatters,
    }
}

fn normalize(part: &mut Part, fallback_key: &str, options: ParseOptions) {
    match part {
        Part::Literal(_) => {}
        Part::Argument(argument) => {
            resolve_key(&mut argument.key, fallback_key);
            trim_slot(&mut argument.type_tag);
            for name in &mut argument.formatters {
                trim_in_place(name);
            }
            if options.optimize {
                if is_blank(&argument.type_tag) {
                    argument.type_tag = None;
                }
                argument.formatters.retain(|name| !name.is_empty());
            }
        }
        Part::Plural(plural) => {
            resolve_key(&mut plural.key, fallback_key);
            for slot in plural.forms.slots_mut() {
                trim_slot(slot);
                if options.optimize && is_blank(slot) {
                    *slot = None;
                }
            }
        }
    }
}

/// Empty and `"0"` fields carry nothing once optimized.
fn is_blank(slot: &Option<String>) -> bool {
    slot.as_deref()
        .map_or(true, |text| text.is_empty() || text == ZERO_FIELD)
}

fn resolve_key(key: &mut String, fallback_key: &str) {
    trim_in_place(key);
    if key.is_empty() {
        fallback_key.clone_into(key);
    }
}

fn trim_slot(slot: &mut Option<String>) {
    if let Some(text) = slot {
        trim_in_place(text);
    }
}

fn trim_in_place(text: &mut String) {
    let trimmed = text.trim();
    if trimmed.len() != text.len() {
        *text = trimmed.to_string();
    }
}
