//! Query accuracy evaluation against labeling job ground truth.
//!
//! ## Key Concepts
//!
//! - **Ground Truth Index**: query → documents and document → truth text, built
//!   from a labeling job's output manifest
//! - **Hypothesis**: a query plus the phrasing sent to the analysis service
//! - **Evaluator**: asks the phrasing on every labeled document and scores the
//!   answers against the truth with a sequence-matching ratio
//! - **Reports**: JSON (machine-readable) and Markdown (human-readable)

pub mod evaluator;
pub mod ground_truth;
pub mod hypothesis;
pub mod reports;

pub use evaluator::{DocumentResult, Evaluation, Evaluator};
pub use ground_truth::{GroundTruthIndex, GroundTruthSource, IndexStats, QueryStats};
pub use hypothesis::Hypothesis;
pub use reports::{
  ComparisonReport, EvaluationReport, MarkdownReport, PhrasingComparison, RankedPhrasing, generate_comparison_reports,
  generate_reports,
};

use gtscore_core::{ManifestError, UriError};
use services::ServiceError;
use thiserror::Error;

/// Evaluation errors
#[derive(Debug, Error)]
pub enum EvalError {
  #[error("Invalid hypothesis: {0}")]
  InvalidState(String),

  #[error(
    "No documents contain a ground truth for query '{query}'. Rebuild the ground truth index, and check that \
     the labeling job has labels for this query."
  )]
  NoGroundTruth { query: String },

  #[error("No document labeled with query '{query}' has a ground truth text to score against")]
  NoScorableDocuments { query: String },

  #[error("Analysis of {document} returned no blocks")]
  EmptyResponse { document: String },

  #[error("Invalid URI: {0}")]
  Uri(#[from] UriError),

  #[error("Manifest error: {0}")]
  Manifest(#[from] ManifestError),

  #[error("Service error: {0}")]
  Service(#[from] ServiceError),

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EvalError>;
