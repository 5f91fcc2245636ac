use serde_json::{Map, Value};

/// Source that placeholder keys are resolved against.
#[derive(Debug, Clone, Copy)]
pub enum Arguments<'a> {
    /// Fields of a single object argument.
    Named(&'a Map<String, Value>),
    /// The argument list itself, addressed by index (`"0"`, `"1"`, ...).
    Positional(&'a [Value]),
}

impl<'a> Arguments<'a> {
    /// A single object argument supplies named fields; anything else is positional.
    pub fn from_slice(args: &'a [Value]) -> Self {
        match args {
            [Value::Object(fields)] => Arguments::Named(fields),
            _ => Arguments::Positional(args),
        }
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        match self {
            Arguments::Named(fields) => fields.get(key),
            Arguments::Positional(values) => key
                .parse::<usize>()
                .ok()
                .and_then(|index| values.get(index)),
        }
    }
}

/// Renders a value the way it is spliced into translated text.
///
/// `null` renders as the empty string and integral numbers drop the
/// fractional part.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => {
            if number.is_i64() || number.is_u64() {
                number.to_string()
            } else {
                number.as_f64().map(display_float).unwrap_or_default()
            }
        }
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn display_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Numeric reading of a value for plural selection; `NaN` when not numeric.
pub(crate) fn plural_operand(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(text)) => text.trim().parse::<f64>().unwrap_or(f64::NAN),
        Some(Value::Bool(flag)) => f64::from(u8::from(*flag)),
        _ => f64::NAN,
    }
}

/// Numeric zero or the string `"0"`.
pub(crate) fn is_zero(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Number(number)) => number.as_f64() == Some(0.0),
        Some(Value::String(text)) => text == "0",
        _ => false,
    }
}

/// Values a formatter step may yield without replacing the accumulated value.
pub(crate) fn is_empty_result(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_object_argument_is_named() {
        let args = [json!({ "name": "Ada" })];
        let source = Arguments::from_slice(&args);
        assert_eq!(source.get("name"), Some(&json!("Ada")));
        assert_eq!(source.get("0"), None);
    }

    #[test]
    fn other_argument_lists_are_positional() {
        let args = [json!("Ada"), json!(3)];
        let source = Arguments::from_slice(&args);
        assert_eq!(source.get("1"), Some(&json!(3)));
        assert_eq!(source.get("name"), None);

        let single_array = [json!(["a", "b"])];
        assert!(matches!(
            Arguments::from_slice(&single_array),
            Arguments::Positional(_)
        ));
    }

    #[test]
    fn display_matches_script_host_formatting() {
        assert_eq!(display_value(&json!(5)), "5");
        assert_eq!(display_value(&json!(5.0)), "5");
        assert_eq!(display_value(&json!(1.5)), "1.5");
        assert_eq!(display_value(&Value::Null), "");
        assert_eq!(display_value(&json!(true)), "true");
    }

    #[test]
    fn zero_check_accepts_number_and_string() {
        assert!(is_zero(Some(&json!(0))));
        assert!(is_zero(Some(&json!(0.0))));
        assert!(is_zero(Some(&json!("0"))));
        assert!(!is_zero(Some(&json!(""))));
        assert!(!is_zero(Some(&json!(false))));
        assert!(!is_zero(None));
    }

    #[test]
    fn plural_operand_parses_numeric_strings() {
        assert_eq!(plural_operand(Some(&json!("3"))), 3.0);
        assert!(plural_operand(Some(&json!("three"))).is_nan());
        assert!(plural_operand(None).is_nan());
    }
}
