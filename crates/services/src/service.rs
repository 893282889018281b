//! Service traits
//!
//! Each trait covers one external collaborator. Implementations report
//! failures as [`ServiceError`] and never retry.

use async_trait::async_trait;
use gtscore_core::{S3Uri, decode_stacked_bytes};
use serde_json::Value;

use crate::{AnalysisRequest, AnalysisResponse, ServiceError};

/// Result type for service calls
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Labeling job metadata (e.g. SageMaker Ground Truth)
#[async_trait]
pub trait LabelingJobs: Send + Sync {
  /// The name of this backend (for logging/identification)
  fn name(&self) -> &str;

  /// Output location prefix of a labeling job (e.g. `s3://bucket/output/`)
  async fn output_path(&self, job_name: &str) -> Result<String>;
}

/// Object storage retrieval (e.g. S3)
#[async_trait]
pub trait ObjectStore: Send + Sync {
  fn name(&self) -> &str;

  /// Download an object's raw bytes
  async fn get_object(&self, location: &S3Uri) -> Result<Vec<u8>>;

  /// Download an object holding a single JSON value
  async fn get_json(&self, location: &S3Uri) -> Result<Value> {
    let bytes = self.get_object(location).await?;
    serde_json::from_slice(&bytes).map_err(|source| ServiceError::Json {
      uri: location.to_string(),
      source,
    })
  }

  /// Download an object holding stacked JSON values, e.g. a labeling manifest
  async fn get_stacked_json(&self, location: &S3Uri) -> Result<Vec<Value>> {
    let bytes = self.get_object(location).await?;
    decode_stacked_bytes(&bytes).map_err(|source| ServiceError::StackedJson {
      uri: location.to_string(),
      source,
    })
  }
}

/// Query-based document analysis (e.g. Textract AnalyzeDocument with QUERIES)
#[async_trait]
pub trait DocumentAnalysis: Send + Sync {
  fn name(&self) -> &str;

  /// Ask a single query against a document
  async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResponse>;
}
