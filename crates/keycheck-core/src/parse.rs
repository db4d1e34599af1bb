//! # Document Parsing — Raw Bytes to a Value Tree
//!
//! Every check starts by parsing the raw JSON bytes into a
//! `serde_json::Value`. Objects keep document key order.
//!
//! When the parser rejects the input it reports a line and column; that
//! position is turned back into a byte offset so the error can carry the
//! `"key":value` text leading up to the failure. In large documents this
//! is the difference between "expected value at line 1 column 4711" and
//! knowing which key was being read.

use serde_json::Value;

use crate::error::CheckError;

/// Parse a JSON document into a value tree.
///
/// # Errors
///
/// Returns [`CheckError::Parse`] with the surrounding input fragment
/// attached when the bytes are not well-formed JSON.
pub fn parse_document(data: &[u8]) -> Result<Value, CheckError> {
    serde_json::from_slice(data).map_err(|e| resolve_parse_error(data, &e))
}

/// Convert a parser error into a [`CheckError::Parse`], locating the
/// nearby `"key":value` fragment in `data` when the error has a position.
pub fn resolve_parse_error(data: &[u8], err: &serde_json::Error) -> CheckError {
    let context = byte_offset(data, err.line(), err.column())
        .map(|offset| surrounding_fragment(data, offset))
        .filter(|fragment| !fragment.is_empty());
    CheckError::Parse {
        message: err.to_string(),
        context,
    }
}

/// Translate a 1-based line and a byte column into an exclusive end offset
/// covering the byte the parser stopped at.
fn byte_offset(data: &[u8], line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let mut line_start = 0;
    for _ in 1..line {
        let newline = data[line_start..].iter().position(|&b| b == b'\n')?;
        line_start += newline + 1;
    }
    Some((line_start + column).min(data.len()))
}

/// Walk backwards from `offset` past the nearest `:` to the delimiter that
/// opens its key, and return the text in between.
fn surrounding_fragment(data: &[u8], offset: usize) -> String {
    let mut seen_colon = false;
    let mut begin = 0;
    for i in (0..offset).rev() {
        match data[i] {
            b':' => seen_colon = true,
            b'\n' | b'{' | b'[' | b',' | b' ' if seen_colon => {
                begin = i + 1;
                break;
            }
            _ => {}
        }
    }
    String::from_utf8_lossy(&data[begin..offset])
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_err(src: &str) -> CheckError {
        parse_document(src.as_bytes()).unwrap_err()
    }

    #[test]
    fn test_parse_valid_document_keeps_key_order() {
        let v = parse_document(br#"{"zeta":1,"alpha":2}"#).unwrap();
        let keys: Vec<&String> = v.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_unquoted_value_reports_key_context() {
        let err = parse_err(r#"{"this":{"of":"x", "with":"a","quote":missing}}"#);
        match err {
            CheckError::Parse { context, .. } => {
                assert_eq!(context.as_deref(), Some("\"quote\":m"));
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn test_context_on_later_line() {
        let src = "{\n  \"id\": \"expos\",\n  \"startup\": nope\n}";
        let err = parse_err(src);
        let CheckError::Parse { context, message } = err else {
            panic!("expected Parse");
        };
        assert!(message.contains("line 3"), "{message}");
        let context = context.expect("context located");
        assert!(context.starts_with("\"startup\":"), "{context}");
    }

    #[test]
    fn test_empty_input_has_no_context() {
        let err = parse_err("");
        assert!(matches!(err, CheckError::Parse { context: None, .. }));
        assert_eq!(err.code(), 40);
    }

    #[test]
    fn test_byte_offset_clamps_to_input() {
        assert_eq!(byte_offset(b"{}", 1, 10), Some(2));
        assert_eq!(byte_offset(b"{}", 0, 1), None);
        assert_eq!(byte_offset(b"{}", 3, 1), None);
    }

    #[test]
    fn test_fragment_without_colon_spans_to_start() {
        assert_eq!(surrounding_fragment(b"  [1, 2", 7), "[1, 2");
    }
}
