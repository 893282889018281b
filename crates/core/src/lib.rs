//! Shared building blocks for gtscore: configuration, stacked JSON decoding,
//! labeling manifest records, S3 URIs and answer similarity.

pub mod config;
pub mod manifest;
pub mod similarity;
pub mod stacked;
pub mod uri;

pub use config::{AwsConfig, Config, ConfigError, LabelingConfig, LoggingConfig, ReportConfig, ReportFormat};
pub use manifest::{Annotation, AnnotationEntity, LabelRecord, ManifestError};
pub use similarity::{Match, SequenceMatcher, ratio};
pub use stacked::{DecodeError, StackedValues, decode_stacked, decode_stacked_bytes};
pub use uri::{S3Uri, UriError};
