//! # Ingestion — JSON Objects from Annotated Text
//!
//! Configuration files often carry prose around, and comments inside,
//! their JSON objects. [`JsonObjects`] scans such a stream and yields each
//! top-level `{...}` object as compact bytes ready for parsing:
//!
//! - Text before an object's opening brace is skipped.
//! - Outside string literals, `#` starts a comment that runs to the end of
//!   the line, and whitespace is dropped.
//! - Braces inside string literals do not count toward nesting, and an
//!   escaped quote does not end a literal.
//!
//! ```text
//! This file contains some test data ...
//! {
//!   "author": "B. Dylan",
//!   "title" : "Ballad of a Thin Man"  # one of my favorites
//! }
//! ```
//!
//! yields `{"author":"B. Dylan","title":"Ballad of a Thin Man"}`.

use std::fs::File;
use std::io::{BufRead, BufReader, Bytes};
use std::path::Path;

use crate::error::IngestError;

/// Iterator over the JSON objects embedded in a byte stream.
pub struct JsonObjects<R> {
    bytes: Bytes<R>,
    source_name: String,
    ordinal: usize,
    done: bool,
}

impl<R: BufRead> JsonObjects<R> {
    /// Scan `reader`; `source_name` labels I/O errors.
    pub fn new(reader: R, source_name: impl Into<String>) -> Self {
        Self {
            bytes: reader.bytes(),
            source_name: source_name.into(),
            ordinal: 0,
            done: false,
        }
    }

    fn next_object(&mut self) -> Result<Option<Vec<u8>>, IngestError> {
        let mut out = Vec::new();
        let mut depth = 0usize;
        let mut started = false;
        let mut in_string = false;
        let mut escaped = false;
        let mut in_comment = false;

        for byte in self.bytes.by_ref() {
            let b = byte.map_err(|source| IngestError::Io {
                source_name: self.source_name.clone(),
                source,
            })?;

            if !started && b != b'{' {
                continue;
            }
            if in_comment {
                if b == b'\n' {
                    in_comment = false;
                }
                continue;
            }
            if in_string {
                out.push(b);
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == b'"' {
                    in_string = false;
                }
                continue;
            }

            match b {
                b'#' => {
                    in_comment = true;
                    continue;
                }
                b'{' => {
                    depth += 1;
                    started = true;
                }
                b'}' => depth = depth.saturating_sub(1),
                b'"' => in_string = true,
                b if is_blank(b) => continue,
                _ => {}
            }
            out.push(b);
            if depth == 0 {
                return Ok(Some(out));
            }
        }

        if started {
            return Err(IngestError::UnmatchedBraces {
                object: self.ordinal,
                partial: String::from_utf8_lossy(&out).into_owned(),
            });
        }
        Ok(None)
    }
}

impl<R: BufRead> Iterator for JsonObjects<R> {
    type Item = Result<Vec<u8>, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        self.ordinal += 1;
        match self.next_object() {
            Ok(Some(object)) => Some(Ok(object)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

fn is_blank(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x07 | 0x08 | 0x0b | 0x0c)
}

/// Collect every JSON object in `reader`.
///
/// # Errors
///
/// Returns the first [`IngestError`] encountered; objects before it are lost.
pub fn read_json_objects<R: BufRead>(reader: R) -> Result<Vec<Vec<u8>>, IngestError> {
    JsonObjects::new(reader, "<reader>").collect()
}

/// Collect every JSON object in the file at `path`.
///
/// # Errors
///
/// Returns [`IngestError::Io`] if the file cannot be opened or read, and
/// [`IngestError::UnmatchedBraces`] if it ends inside an object.
pub fn read_json_file(path: impl AsRef<Path>) -> Result<Vec<Vec<u8>>, IngestError> {
    let path = path.as_ref();
    let source_name = path.display().to_string();
    let file = File::open(path).map_err(|source| IngestError::Io {
        source_name: source_name.clone(),
        source,
    })?;
    let objects: Vec<Vec<u8>> =
        JsonObjects::new(BufReader::new(file), source_name.as_str()).collect::<Result<_, _>>()?;
    tracing::debug!(source = %source_name, count = objects.len(), "read JSON objects");
    Ok(objects)
}
