//! Splitting of composite literals `(f1,f2,...)` into raw field tokens.

use crate::error::{CompositeError, Result};
use crate::escape::unescape;

/// Splits a composite literal into its raw, still-escaped field tokens.
///
/// Commas inside a quoted span do not split, and a backslash always escapes the
/// following character so `\"` never closes a span. Tokens are returned
/// exactly as they appear between the delimiters; run them through
/// [`unescape`] before use.
///
/// ```
/// use drizzle_composite_core::parser::split_fields;
///
/// let tokens = split_fields(r#"(1,"a,b",NULL)"#).unwrap();
/// assert_eq!(tokens, vec!["1", r#""a,b""#, "NULL"]);
/// assert!(split_fields("()").unwrap().is_empty());
/// ```
pub fn split_fields(literal: &str) -> Result<Vec<&str>> {
    if !literal.starts_with('(') {
        return Err(CompositeError::parse(literal, 0, "expected '('"));
    }
    if literal.len() < 2 || !literal.ends_with(')') {
        return Err(CompositeError::parse(literal, literal.len(), "expected ')'"));
    }

    let inner = &literal[1..literal.len() - 1];
    if inner.is_empty() {
        return Ok(Vec::new());
    }

    // offset of `inner` within `literal`, for error positions
    const BASE: usize = 1;
    let bytes = inner.as_bytes();
    let mut tokens = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                if i + 1 >= bytes.len() {
                    return Err(CompositeError::parse(literal, BASE + i, "dangling backslash"));
                }
                i += 2;
                continue;
            }
            b'"' => in_quotes = !in_quotes,
            b'(' | b')' if !in_quotes => {
                return Err(CompositeError::parse(
                    literal,
                    BASE + i,
                    "unquoted parenthesis inside field",
                ));
            }
            b',' if !in_quotes => {
                if i == start {
                    return Err(CompositeError::parse(literal, BASE + i, "empty field"));
                }
                tokens.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    if in_quotes {
        return Err(CompositeError::parse(
            literal,
            literal.len() - 1,
            "unterminated quoted field",
        ));
    }
    if start == inner.len() {
        return Err(CompositeError::parse(literal, BASE + start, "trailing comma"));
    }
    tokens.push(&inner[start..]);

    Ok(tokens)
}

/// Splits `literal` and unescapes every token; `None` marks a NULL field.
pub fn parse_fields(literal: &str) -> Result<Vec<Option<String>>> {
    split_fields(literal)?.into_iter().map(unescape).collect()
}
