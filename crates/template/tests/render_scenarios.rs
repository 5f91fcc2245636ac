use phrasekit_template::{
    interpolate, parse, render, Formatters, PluralCategory, TemplateCache, TemplateError,
};
use serde_json::{json, Value};

fn english(value: f64) -> PluralCategory {
    if value.abs() == 1.0 {
        PluralCategory::One
    } else {
        PluralCategory::Other
    }
}

fn formatters() -> Formatters {
    Formatters::new()
        .with("upper", |value| match value {
            Value::String(text) => json!(text.to_uppercase()),
            _ => Value::Null,
        })
        .with("exclaim", |value| match value {
            Value::String(text) => json!(format!("{text}!")),
            _ => Value::Null,
        })
        .with("double", |value| match value.as_f64() {
            Some(number) => json!(number * 2.0),
            None => Value::Null,
        })
}

fn cached(text: &str, args: &[Value]) -> String {
    let cache = TemplateCache::new();
    render(&cache, text, &english, &formatters(), args).expect("render")
}

#[test]
fn item_count_scenario() {
    let text = "You have {n:{no items|one item|?? items}}";
    assert_eq!(cached(text, &[json!({ "n": 3 })]), "You have 3 items");
    assert_eq!(cached(text, &[json!({ "n": 0 })]), "You have no items");
    assert_eq!(cached(text, &[json!({ "n": 1 })]), "You have one item");
}

#[test]
fn formatter_order_changes_result() {
    let args = [json!({ "word": "hey" })];
    assert_eq!(cached("{word|upper|exclaim}", &args), "HEY!");

    let numbers = [json!({ "n": 3 })];
    assert_eq!(cached("{n|double|{6:six,*:many}}", &numbers), "six");
    assert_eq!(cached("{n|{6:six,*:many}|double}", &numbers), "many");
}

#[test]
fn switch_case_wildcard() {
    let text = "Color: {color|{red:Rouge,*:Unknown}}";
    assert_eq!(cached(text, &[json!({ "color": "red" })]), "Color: Rouge");
    assert_eq!(cached(text, &[json!({ "color": "blue" })]), "Color: Unknown");
}

#[test]
fn plural_value_may_be_formatted_separately() {
    let text = "{count|double} {count:{file|files}}";
    assert_eq!(cached(text, &[json!({ "count": 1 })]), "2 file");
    assert_eq!(cached(text, &[json!({ "count": 2 })]), "4 files");
}

#[test]
fn positional_arguments_fill_numbered_slots() {
    assert_eq!(
        cached("{0} sent {1} {{message|messages}}", &[json!("Ada"), json!(2)]),
        "Ada sent 2 messages"
    );
}

#[test]
fn key_inheritance_with_two_arguments() {
    let text = "Hello {name}, you have {:{1 message|?? messages}}";
    // The plural inherits `name`, which positional arguments cannot supply.
    assert_eq!(
        cached(text, &[json!("Ada"), json!(3)]),
        "Hello , you have  messages"
    );
    assert_eq!(
        cached(text, &[json!({ "name": 1 })]),
        "Hello 1, you have 1 message"
    );
}

#[test]
fn cached_and_fresh_paths_agree() {
    let text = "{user} has {n:{no|one|?? new}} {n:{message|messages}}";
    let args = [json!({ "user": "Ada", "n": 7 })];
    let fresh = interpolate(&parse(text).unwrap(), &english, &formatters(), &args);
    assert_eq!(cached(text, &args), fresh);
    assert_eq!(fresh, "Ada has 7 new messages");
}

#[test]
fn malformed_templates_fault() {
    let cache = TemplateCache::new();
    let error = render(&cache, "{n:{a|b|c|d|e|f|g}}", &english, &formatters(), &[]).unwrap_err();
    assert!(matches!(error, TemplateError::PluralArity { count: 7, .. }));
    let error = render(&cache, "Hi {name", &english, &formatters(), &[]).unwrap_err();
    assert_eq!(error, TemplateError::UnclosedBrace { offset: 3 });
    assert_eq!(error.to_string(), "unclosed '{' opened at byte 3");
}
