//! Clients for the external services gtscore scores against.
//!
//! Three collaborators are modeled as traits so the index builder and
//! evaluator never depend on a concrete backend:
//! - [`LabelingJobs`]: resolves a labeling job to its output location
//! - [`ObjectStore`]: downloads manifests and annotation payloads
//! - [`DocumentAnalysis`]: answers a natural-language query against a document
//!
//! The `aws` feature (default) provides SageMaker Ground Truth, S3 and
//! Textract implementations. [`memory`] holds in-process implementations.

use std::sync::Arc;

use gtscore_core::{AwsConfig, DecodeError, S3Uri};
use serde::{Deserialize, Serialize};

pub mod memory;
mod service;

#[cfg(feature = "aws")]
mod aws;

#[cfg(feature = "aws")]
pub use aws::AwsServices;
pub use service::{DocumentAnalysis, LabelingJobs, ObjectStore, Result};

/// A single-query analysis request against one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
  /// Document to analyze
  pub document: S3Uri,
  /// Natural-language query text sent to the service
  pub query_text: String,
  /// Alias the service echoes back to correlate the answer
  pub alias: String,
}

impl AnalysisRequest {
  pub fn new(document: S3Uri, query_text: impl Into<String>, alias: impl Into<String>) -> Self {
    Self {
      document,
      query_text: query_text.into(),
      alias: alias.into(),
    }
  }
}

/// One block of an analysis response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseBlock {
  /// Service block type (e.g. "PAGE", "QUERY", "QUERY_RESULT")
  pub block_type: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub text: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub confidence: Option<f32>,
}

impl ResponseBlock {
  pub fn new(block_type: impl Into<String>, text: Option<&str>) -> Self {
    Self {
      block_type: block_type.into(),
      text: text.map(str::to_string),
      confidence: None,
    }
  }
}

/// Structured analysis response, blocks in service order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
  pub blocks: Vec<ResponseBlock>,
}

impl AnalysisResponse {
  /// Response shaped like a query answer: the query block followed by its result.
  pub fn answer(alias: &str, text: &str) -> Self {
    Self {
      blocks: vec![
        ResponseBlock::new("QUERY", Some(alias)),
        ResponseBlock::new("QUERY_RESULT", Some(text)),
      ],
    }
  }
}

/// Errors from external service calls
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
  #[error("Labeling job service error for '{job_name}': {message}")]
  Labeling { job_name: String, message: String },

  #[error("Labeling job '{job_name}' has no output location")]
  MissingOutputPath { job_name: String },

  #[error("Object storage error for {uri}: {message}")]
  Storage { uri: String, message: String },

  #[error("Document analysis error for {document}: {message}")]
  Analysis { document: String, message: String },

  #[error("Failed to decode stacked JSON from {uri}: {source}")]
  StackedJson {
    uri: String,
    #[source]
    source: DecodeError,
  },

  #[error("Failed to parse JSON from {uri}: {source}")]
  Json {
    uri: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("Invalid request: {0}")]
  InvalidRequest(String),

  #[error("No service backend available. Enable a backend feature (e.g., 'aws').")]
  NoBackendAvailable,
}

/// The three service clients an evaluation session needs.
#[derive(Clone)]
pub struct Services {
  pub labeling: Arc<dyn LabelingJobs>,
  pub store: Arc<dyn ObjectStore>,
  pub analysis: Arc<dyn DocumentAnalysis>,
}

/// Create the default service backends.
///
/// Returns an error if no backend feature is enabled.
pub async fn create_services(config: &AwsConfig) -> Result<Services> {
  #[cfg(feature = "aws")]
  {
    let aws = Arc::new(AwsServices::from_config(config).await);
    Ok(Services {
      labeling: aws.clone(),
      store: aws.clone(),
      analysis: aws,
    })
  }

  #[cfg(not(feature = "aws"))]
  {
    let _ = config;
    Err(ServiceError::NoBackendAvailable)
  }
}
