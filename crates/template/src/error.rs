use thiserror::Error;

/// Faults raised while parsing a message template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unclosed '{{' opened at byte {offset}")]
    UnclosedBrace { offset: usize },
    #[error("unexpected '}}' at byte {offset}")]
    UnexpectedClosingBrace { offset: usize },
    #[error("plural block '{body}' has {count} alternatives (expected 1 to 6)")]
    PluralArity { body: String, count: usize },
}
