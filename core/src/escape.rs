//! Quoting rules for a single composite field token.
//!
//! Only an *unquoted* `NULL` (any case) is the SQL NULL sentinel; a quoted
//! `"NULL"` is the four character string.

use crate::error::{CompositeError, Result};

const NULL_TOKEN: &str = "NULL";

/// Wraps `token` in double quotes, backslash-escaping `"` and `\`.
///
/// Always quotes, so an empty string or the text `NULL` stays distinguishable
/// from an absent value.
///
/// ```
/// use drizzle_composite_core::escape::escape;
///
/// assert_eq!(escape(r#"say "hi""#), r#""say \"hi\"""#);
/// assert_eq!(escape(""), r#""""#);
/// assert_eq!(escape("NULL"), r#""NULL""#);
/// ```
pub fn escape(token: &str) -> String {
    let mut out = String::with_capacity(token.len() + 2);
    out.push('"');
    for ch in token.chars() {
        if matches!(ch, '"' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

/// Reverses [`escape`] for one raw token as produced by
/// [`split_fields`](crate::parser::split_fields).
///
/// Returns `Ok(None)` for the unquoted NULL sentinel. Quoted tokens accept both
/// backslash escapes and doubled quotes (`""`), which is what PostgreSQL emits.
/// Bare tokens such as `3` or `-4` are returned verbatim.
///
/// ```
/// use drizzle_composite_core::escape::unescape;
///
/// assert_eq!(unescape("NULL").unwrap(), None);
/// assert_eq!(unescape(r#""NULL""#).unwrap().as_deref(), Some("NULL"));
/// assert_eq!(unescape(r#""a\"b""#).unwrap().as_deref(), Some("a\"b"));
/// assert_eq!(unescape("-4").unwrap().as_deref(), Some("-4"));
/// ```
pub fn unescape(raw: &str) -> Result<Option<String>> {
    if raw.starts_with('"') {
        return unescape_quoted(raw).map(Some);
    }

    if raw.eq_ignore_ascii_case(NULL_TOKEN) {
        return Ok(None);
    }
    if raw.is_empty() {
        return Err(CompositeError::parse(raw, 0, "empty field token"));
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.char_indices();
    while let Some((pos, ch)) = chars.next() {
        match ch {
            '"' => return Err(CompositeError::parse(raw, pos, "quote inside unquoted token")),
            '\\' => match chars.next() {
                Some((_, escaped)) => out.push(escaped),
                None => return Err(CompositeError::parse(raw, pos, "dangling backslash")),
            },
            _ => out.push(ch),
        }
    }
    Ok(Some(out))
}

fn unescape_quoted(raw: &str) -> Result<String> {
    let mut out = String::with_capacity(raw.len().saturating_sub(2));
    // skip the opening quote
    let mut chars = raw.char_indices().skip(1).peekable();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some((_, escaped)) => out.push(escaped),
                None => return Err(CompositeError::parse(raw, pos, "dangling backslash")),
            },
            '"' => {
                if matches!(chars.peek(), Some((_, '"'))) {
                    chars.next();
                    out.push('"');
                    continue;
                }
                if pos + 1 != raw.len() {
                    return Err(CompositeError::parse(
                        raw,
                        pos + 1,
                        "unexpected text after closing quote",
                    ));
                }
                return Ok(out);
            }
            _ => out.push(ch),
        }
    }

    Err(CompositeError::parse(raw, raw.len(), "unterminated quoted token"))
}

/// Reports whether `text` must be quoted to survive a round trip as a field.
///
/// Mirrors PostgreSQL's own output rule: empty text, the NULL sentinel,
/// whitespace and any of `"\(),` force quoting.
pub fn needs_quotes(text: &str) -> bool {
    text.is_empty()
        || text.eq_ignore_ascii_case(NULL_TOKEN)
        || text
            .chars()
            .any(|ch| matches!(ch, '"' | '\\' | '(' | ')' | ',') || ch.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_quotes_and_backslashes() {
        assert_eq!(escape(r"a\b"), r#""a\\b""#);
        assert_eq!(escape("x,y"), r#""x,y""#);
        assert_eq!(escape("(1)"), r#""(1)""#);
    }

    #[test]
    fn unescape_null_sentinel_any_case() {
        assert_eq!(unescape("NULL").unwrap(), None);
        assert_eq!(unescape("null").unwrap(), None);
        assert_eq!(unescape("NuLl").unwrap(), None);
    }

    #[test]
    fn quoted_null_is_text() {
        assert_eq!(unescape(r#""NULL""#).unwrap(), Some("NULL".to_string()));
        assert_eq!(unescape(r#""""#).unwrap(), Some(String::new()));
    }

    #[test]
    fn unescape_reverses_escape() {
        for text in ["", "plain", r#"a"b"#, r"c:\dir\", "x, (y)", "NULL", "héllo wörld"] {
            assert_eq!(unescape(&escape(text)).unwrap().as_deref(), Some(text));
        }
    }

    #[test]
    fn doubled_quotes_inside_quoted_token() {
        assert_eq!(unescape(r#""say ""hi""""#).unwrap().as_deref(), Some(r#"say "hi""#));
    }

    #[test]
    fn bare_token_backslash_escape() {
        assert_eq!(unescape(r"a\,b").unwrap().as_deref(), Some("a,b"));
    }

    #[test]
    fn malformed_tokens() {
        assert!(matches!(unescape(r#""open"#), Err(CompositeError::Parse { .. })));
        assert!(matches!(unescape(r#""a"b"#), Err(CompositeError::Parse { .. })));
        assert!(matches!(unescape(r#"ab"c"#), Err(CompositeError::Parse { .. })));
        assert!(matches!(unescape(r#""a\"#), Err(CompositeError::Parse { .. })));
        assert!(matches!(unescape(r"ab\"), Err(CompositeError::Parse { .. })));
        assert!(matches!(unescape(""), Err(CompositeError::Parse { .. })));
        assert!(matches!(unescape(r#"""#), Err(CompositeError::Parse { .. })));
    }

    #[test]
    fn needs_quotes_rules() {
        assert!(!needs_quotes("42"));
        assert!(!needs_quotes("-4.5e10"));
        assert!(!needs_quotes("true"));
        assert!(needs_quotes(""));
        assert!(needs_quotes("null"));
        assert!(needs_quotes("a b"));
        assert!(needs_quotes("a,b"));
        assert!(needs_quotes("(a)"));
        assert!(needs_quotes(r#"a"b"#));
        assert!(needs_quotes(r"a\b"));
    }
}
