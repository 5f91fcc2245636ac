use crate::error::TemplateError;

/// A piece of raw template text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text emitted verbatim.
    Literal(&'a str),
    /// Content between an outer `{` and its matching `}` (braces excluded).
    Expression(&'a str),
}

/// Splits template text into literal runs and brace-delimited expressions.
///
/// Nested braces stay inside the enclosing expression, so
/// `{n:{one item|?? items}}` yields a single expression. Empty literal runs
/// are not emitted.
pub fn split(text: &str) -> Result<Vec<Segment<'_>>, TemplateError> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut literal_start = 0usize;
    let mut expression_start = 0usize;

    for (offset, byte) in text.bytes().enumerate() {
        match byte {
            b'{' => {
                if depth == 0 {
                    if offset > literal_start {
                        segments.push(Segment::Literal(&text[literal_start..offset]));
                    }
                    expression_start = offset;
                }
                depth += 1;
            }
            b'}' => {
                if depth == 0 {
                    return Err(TemplateError::UnexpectedClosingBrace { offset });
                }
                depth -= 1;
                if depth == 0 {
                    segments.push(Segment::Expression(&text[expression_start + 1..offset]));
                    literal_start = offset + 1;
                }
            }
            _ => {}
        }
    }

    if depth > 0 {
        return Err(TemplateError::UnclosedBrace {
            offset: expression_start,
        });
    }
    if literal_start < text.len() {
        segments.push(Segment::Literal(&text[literal_start..]));
    }
    Ok(segments)
}

/// Splits `text` on `separator` occurrences that are not nested inside braces.
pub(crate) fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (offset, ch) in text.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            _ if ch == separator && depth == 0 => {
                pieces.push(&text[start..offset]);
                start = offset + ch.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push(&text[start..]);
    pieces
}

/// Returns the inside of `text` when its first `{` is matched by its last `}`.
pub(crate) fn strip_outer_braces(text: &str) -> Option<&str> {
    let inner = text.strip_prefix('{')?.strip_suffix('}')?;
    let mut depth = 0usize;
    for ch in inner.chars() {
        match ch {
            '{' => depth += 1,
            '}' => {
                if depth == 0 {
                    // The leading brace closed before the end of the text.
                    return None;
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    (depth == 0).then_some(inner)
}
