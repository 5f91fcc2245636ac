use serde_json::Value;

use crate::formatter::{apply_chain, Formatters};
use crate::parser::{ArgumentPart, ParsedTemplate, Part, PluralForms, PluralPart};
use crate::plural::{PluralCategory, PluralSelector};
use crate::value::{display_value, is_zero, plural_operand, Arguments};

/// Token inside a plural alternative that is replaced with the argument value.
pub const VALUE_TOKEN: &str = "??";

/// Renders a parsed template against `args`.
///
/// A single object argument supplies named fields; otherwise arguments are
/// addressed by position. Missing arguments and missing plural forms render
/// as empty text.
pub fn interpolate<S>(
    template: &ParsedTemplate,
    selector: &S,
    formatters: &Formatters,
    args: &[Value],
) -> String
where
    S: PluralSelector + ?Sized,
{
    let source = Arguments::from_slice(args);
    let mut output = String::new();
    for part in template.parts() {
        match part {
            Part::Literal(text) => output.push_str(text),
            Part::Plural(plural) => {
                output.push_str(&render_plural(plural, selector, source.get(&plural.key)))
            }
            Part::Argument(argument) => output.push_str(&render_argument(
                argument,
                formatters,
                source.get(&argument.key),
            )),
        }
    }
    output
}

fn render_plural<S>(plural: &PluralPart, selector: &S, value: Option<&Value>) -> String
where
    S: PluralSelector + ?Sized,
{
    let forms = &plural.forms;
    let selected = match value {
        Some(Value::Bool(true)) => forms.one.as_deref(),
        Some(Value::Bool(false)) => forms.other.as_deref(),
        _ if has_text(&forms.zero) && is_zero(value) => forms.zero.as_deref(),
        _ => form_for(forms, selector.select(plural_operand(value))),
    };
    let Some(selected) = selected else {
        return String::new();
    };
    if selected.contains(VALUE_TOKEN) {
        selected.replace(VALUE_TOKEN, &value.map(display_value).unwrap_or_default())
    } else {
        selected.to_string()
    }
}

fn form_for(forms: &PluralForms, category: PluralCategory) -> Option<&str> {
    match category {
        PluralCategory::Zero => forms.zero.as_deref(),
        PluralCategory::One => forms.one.as_deref(),
        PluralCategory::Two => forms.two.as_deref(),
        PluralCategory::Few => forms.few.as_deref().or(forms.other.as_deref()),
        PluralCategory::Many => forms.many.as_deref().or(forms.other.as_deref()),
        PluralCategory::Other => forms.other.as_deref(),
    }
}

fn has_text(slot: &Option<String>) -> bool {
    slot.as_deref().is_some_and(|text| !text.is_empty())
}

fn render_argument(
    argument: &ArgumentPart,
    formatters: &Formatters,
    value: Option<&Value>,
) -> String {
    let value = value.cloned().unwrap_or(Value::Null);
    let value = if argument.formatters.is_empty() {
        value
    } else {
        apply_chain(formatters, &argument.formatters, value)
    };
    display_value(&value).trim().to_string()
}
