//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout keycheck. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Parse failures carry the parser message plus, when the parser reports
//!   a position, the nearby `"key":value` fragment of the raw input.
//! - Fail-fast check errors nest: every struct or array level the failure
//!   passed through adds one [`Frame`], so the rendered message reads as a
//!   breadcrumb trail from the document root down to the offending key.
//! - Accumulating checks never produce [`CheckError::UnknownKey`],
//!   [`CheckError::TagMismatch`], [`CheckError::ShapeMismatch`] or
//!   [`CheckError::Nested`]; they only surface [`CheckError::Parse`].

use std::fmt;

use thiserror::Error;

/// Error returned by the four check operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// The input bytes are not well-formed JSON.
    #[error("{}", render_parse(.message, .context))]
    Parse {
        /// Message reported by the JSON parser.
        message: String,
        /// Raw input text leading up to the failure, when it can be located.
        context: Option<String>,
    },

    /// A value does not have the shape its schema requires.
    #[error("value is not {expected} for member: {type_name}")]
    ShapeMismatch {
        /// Name of the struct or list type that was expected.
        type_name: String,
        /// The JSON shape the schema required.
        expected: Expected,
    },

    /// A JSON key has no corresponding schema field.
    #[error("no member for key: {key}")]
    UnknownKey {
        /// The key as it appears in the document.
        key: String,
    },

    /// A JSON key names a field whose declared rename tag was not used.
    #[error("key: {key} - does not match tag: {tag}")]
    TagMismatch {
        /// The key as it appears in the document.
        key: String,
        /// The tag the field must be addressed by.
        tag: String,
    },

    /// A failure inside a nested struct or array element.
    #[error("{}", render_nested(.frame, .source))]
    Nested {
        /// The enclosing location.
        frame: Frame,
        /// The failure found beneath it.
        #[source]
        source: Box<CheckError>,
    },
}

impl CheckError {
    /// Wrap this error in one more level of location context.
    pub fn nested(self, frame: Frame) -> Self {
        Self::Nested {
            frame,
            source: Box::new(self),
        }
    }

    /// The innermost error beneath any [`CheckError::Nested`] frames.
    pub fn root_cause(&self) -> &CheckError {
        let mut current = self;
        while let Self::Nested { source, .. } = current {
            current = source;
        }
        current
    }

    /// The location frames from the outermost to the innermost.
    pub fn frames(&self) -> Vec<&Frame> {
        let mut frames = Vec::new();
        let mut current = self;
        while let Self::Nested { frame, source } = current {
            frames.push(frame);
            current = source;
        }
        frames
    }

    /// Error code for structured error reporting.
    ///
    /// Nested errors report the code of their root cause.
    pub fn code(&self) -> u32 {
        match self {
            Self::Parse { .. } => 40,
            Self::ShapeMismatch { .. } => 41,
            Self::UnknownKey { .. } => 42,
            Self::TagMismatch { .. } => 43,
            Self::Nested { source, .. } => source.code(),
        }
    }
}

fn render_parse(message: &str, context: &Option<String>) -> String {
    match context {
        Some(at) if !at.is_empty() => format!("{message} - at: {at}"),
        _ => message.to_string(),
    }
}

fn render_nested(frame: &Frame, source: &CheckError) -> String {
    match frame {
        Frame::Field(_) => format!("{frame} - {source}"),
        Frame::Element(_) => format!("{frame} {source}"),
    }
}

/// The JSON shape a schema node requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    /// A JSON object, for struct-typed schema nodes.
    Object,
    /// A JSON array, for list-typed schema nodes.
    Array,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object => f.write_str("key:value shaped"),
            Self::Array => f.write_str("an array"),
        }
    }
}

/// One level of location context in a nested check failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Descent into the value of a JSON key.
    Field(String),
    /// Descent into an array element, 1-based.
    Element(usize),
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(key) => write!(f, "checking subkeys of field: {key}"),
            Self::Element(ordinal) => write!(f, "[array element #{ordinal}]"),
        }
    }
}

/// Error loading [`CheckOptions`](crate::CheckOptions) from configuration text.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The YAML text could not be parsed into options.
    #[error("invalid options YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The JSON text could not be parsed into options.
    #[error("invalid options JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error scanning a text stream for JSON objects.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The stream could not be read.
    #[error("reading {source_name}: {source}")]
    Io {
        /// File path or other description of the stream.
        source_name: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The stream ended while an object was still open.
    #[error("object #{object}: EOF with unmatched braces: {partial}")]
    UnmatchedBraces {
        /// 1-based ordinal of the incomplete object in the stream.
        object: usize,
        /// The compacted bytes collected before the stream ended.
        partial: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breadcrumb_display() {
        let err = CheckError::UnknownKey {
            key: "add".to_string(),
        }
        .nested(Frame::Element(2))
        .nested(Frame::Field("failover".to_string()));
        assert_eq!(
            err.to_string(),
            "checking subkeys of field: failover - [array element #2] no member for key: add"
        );
    }

    #[test]
    fn test_root_cause_and_frames() {
        let err = CheckError::TagMismatch {
            key: "why".to_string(),
            tag: "whynot".to_string(),
        }
        .nested(Frame::Field("more".to_string()));
        assert!(matches!(err.root_cause(), CheckError::TagMismatch { .. }));
        assert_eq!(err.frames(), vec![&Frame::Field("more".to_string())]);
        assert_eq!(err.code(), 43);
    }

    #[test]
    fn test_parse_display_with_and_without_context() {
        let bare = CheckError::Parse {
            message: "expected value at line 1 column 9".to_string(),
            context: None,
        };
        assert_eq!(bare.to_string(), "expected value at line 1 column 9");

        let located = CheckError::Parse {
            message: "expected value at line 1 column 9".to_string(),
            context: Some("\"quote\":m".to_string()),
        };
        assert!(located.to_string().ends_with(" - at: \"quote\":m"));
    }

    #[test]
    fn test_shape_mismatch_display() {
        let err = CheckError::ShapeMismatch {
            type_name: "Home".to_string(),
            expected: Expected::Object,
        };
        assert_eq!(
            err.to_string(),
            "value is not key:value shaped for member: Home"
        );
        assert_eq!(err.code(), 41);
    }
}
