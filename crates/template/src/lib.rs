//! Message template engine: splits `{...}` expressions out of translation
//! strings, parses placeholders, plural blocks and formatter chains, and
//! renders them against runtime arguments.
//!
//! ```
//! use phrasekit_template::{parse, interpolate, Formatters, PluralCategory};
//! use serde_json::json;
//!
//! let english = |n: f64| if n == 1.0 { PluralCategory::One } else { PluralCategory::Other };
//! let template = parse("You have {n:{no items|one item|?? items}}").unwrap();
//! let text = interpolate(&template, &english, &Formatters::new(), &[json!({ "n": 3 })]);
//! assert_eq!(text, "You have 3 items");
//! ```

pub mod cache;
pub mod error;
pub mod formatter;
pub mod interpolate;
pub mod lexer;
pub mod parser;
pub mod plural;
pub mod value;

pub use cache::{render, TemplateCache};
pub use error::TemplateError;
pub use formatter::{apply_chain, FormatterFn, Formatters, SwitchCases};
pub use interpolate::interpolate;
pub use lexer::{split, Segment};
pub use parser::{
    parse, parse_with, ArgumentPart, ParseOptions, ParsedTemplate, Part, PluralForms, PluralPart,
};
pub use plural::{PluralCategory, PluralSelector};
pub use value::{Arguments, display_value};
