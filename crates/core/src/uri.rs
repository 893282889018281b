//! S3 object locations.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const SCHEME: &str = "s3";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UriError {
  #[error("'{uri}' is not a URI (expected s3://bucket/key)")]
  MissingScheme { uri: String },

  #[error("'{uri}' uses scheme '{scheme}', only s3:// is supported")]
  UnsupportedScheme { uri: String, scheme: String },

  #[error("'{uri}' has no bucket name")]
  MissingBucket { uri: String },

  #[error("'{uri}' has no object key")]
  MissingKey { uri: String },
}

/// A parsed `s3://bucket/key` location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct S3Uri {
  bucket: String,
  key: String,
}

impl S3Uri {
  pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
    Self {
      bucket: bucket.into(),
      key: key.into(),
    }
  }

  /// Parse an `s3://bucket/key` URI.
  ///
  /// The bucket and key must both be non-empty. The key keeps any further
  /// slashes verbatim.
  pub fn parse(uri: &str) -> Result<Self, UriError> {
    let (scheme, rest) = uri.split_once("://").ok_or_else(|| UriError::MissingScheme { uri: uri.to_string() })?;

    if !scheme.eq_ignore_ascii_case(SCHEME) {
      return Err(UriError::UnsupportedScheme {
        uri: uri.to_string(),
        scheme: scheme.to_string(),
      });
    }

    let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
    if bucket.is_empty() {
      return Err(UriError::MissingBucket { uri: uri.to_string() });
    }
    if key.is_empty() {
      return Err(UriError::MissingKey { uri: uri.to_string() });
    }

    Ok(Self::new(bucket, key))
  }

  /// Parse a location that may name a prefix rather than an object
  /// (e.g. `s3://bucket` or `s3://bucket/output/`), then append `path` to it.
  ///
  /// Exactly one `/` separates the prefix from `path`.
  pub fn join(prefix: &str, path: &str) -> Result<Self, UriError> {
    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    Self::parse(&format!("{}/{}", prefix, path))
  }

  pub fn bucket(&self) -> &str {
    &self.bucket
  }

  pub fn key(&self) -> &str {
    &self.key
  }
}

impl fmt::Display for S3Uri {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}://{}/{}", SCHEME, self.bucket, self.key)
  }
}

impl FromStr for S3Uri {
  type Err = UriError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}

impl Serialize for S3Uri {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for S3Uri {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Self::parse(&raw).map_err(serde::de::Error::custom)
  }
}
