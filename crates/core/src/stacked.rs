//! Decoding for stacked (concatenated) JSON streams.
//!
//! Labeling job manifests are a run of JSON values separated by arbitrary
//! whitespace. They are usually one value per line, but nothing guarantees it,
//! so the decoder never splits on newlines.

use serde_json::{Deserializer, StreamDeserializer, Value, de::StrRead};
use thiserror::Error;

const JSON_WHITESPACE: [char; 4] = [' ', '\t', '\n', '\r'];

/// Errors from decoding a stacked JSON stream.
#[derive(Debug, Error)]
pub enum DecodeError {
  #[error("Invalid JSON value at byte {offset}: {source}")]
  Json {
    offset: usize,
    #[source]
    source: serde_json::Error,
  },

  #[error("Invalid UTF-8 at byte {offset}")]
  Utf8 { offset: usize },
}

impl DecodeError {
  /// Byte offset into the input where decoding failed.
  pub fn offset(&self) -> usize {
    match self {
      DecodeError::Json { offset, .. } | DecodeError::Utf8 { offset } => *offset,
    }
  }
}

/// Lazy iterator over the values of a stacked JSON stream.
///
/// Yields values in stream order. The first malformed value is reported as an
/// error and ends the iteration.
pub struct StackedValues<'a> {
  input: &'a str,
  stream: StreamDeserializer<'a, StrRead<'a>, Value>,
  failed: bool,
}

impl<'a> StackedValues<'a> {
  pub fn new(input: &'a str) -> Self {
    Self {
      input,
      stream: Deserializer::from_str(input).into_iter(),
      failed: false,
    }
  }
}

impl Iterator for StackedValues<'_> {
  type Item = Result<Value, DecodeError>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.failed {
      return None;
    }

    let start = self.stream.byte_offset();
    match self.stream.next()? {
      Ok(value) => Some(Ok(value)),
      Err(source) => {
        self.failed = true;
        let rest = &self.input[start..];
        let skipped = rest.len() - rest.trim_start_matches(JSON_WHITESPACE).len();
        Some(Err(DecodeError::Json {
          offset: start + skipped,
          source,
        }))
      }
    }
  }
}

/// Decode every value of a stacked JSON stream.
pub fn decode_stacked(input: &str) -> Result<Vec<Value>, DecodeError> {
  StackedValues::new(input).collect()
}

/// Decode a stacked JSON stream from raw bytes (e.g. an object download).
pub fn decode_stacked_bytes(bytes: &[u8]) -> Result<Vec<Value>, DecodeError> {
  let input = std::str::from_utf8(bytes).map_err(|e| DecodeError::Utf8 {
    offset: e.valid_up_to(),
  })?;
  decode_stacked(input)
}
