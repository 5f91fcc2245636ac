use phrasekit_template::{display_value, Formatters};
use serde_json::Value;

/// Text formatters available to every locale unless disabled in configuration.
pub fn builtin_formatters() -> Formatters {
    Formatters::new()
        .with("uppercase", |value| map_text(value, str::to_uppercase))
        .with("lowercase", |value| map_text(value, str::to_lowercase))
        .with("capitalize", |value| map_text(value, capitalize))
        .with("trim", |value| map_text(value, |text| text.trim().to_string()))
}

fn map_text(value: &Value, transform: impl Fn(&str) -> String) -> Value {
    if value.is_null() {
        return Value::Null;
    }
    Value::String(transform(&display_value(value)))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
