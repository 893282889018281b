//! JSON report format for evaluation results.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PhrasingComparison;
use crate::{DocumentResult, Evaluation, Result};

/// Complete evaluation report in JSON format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
  /// Report metadata
  pub metadata: ReportMetadata,
  /// Summary statistics
  pub summary: ReportSummary,
  /// Per-document results
  pub results: Vec<DocumentResult>,
}

/// Report metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
  /// Report generation timestamp
  pub timestamp: DateTime<Utc>,
  /// gtscore version
  pub version: String,
  /// Labeling job the ground truth came from
  #[serde(skip_serializing_if = "Option::is_none")]
  pub job_name: Option<String>,
}

impl ReportMetadata {
  pub fn new(job_name: Option<&str>) -> Self {
    Self {
      timestamp: Utc::now(),
      version: env!("CARGO_PKG_VERSION").to_string(),
      job_name: job_name.map(str::to_string),
    }
  }
}

/// Summary of one evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
  /// Ground truth query
  pub query: String,
  /// Phrasing sent to the analysis service
  pub phrasing: String,
  /// Mean similarity over scored documents (0.0-1.0)
  pub mean_score: f64,
  /// Documents analyzed
  pub documents: usize,
  /// Documents that contributed to the mean
  pub scored: usize,
  /// Documents without a ground truth text
  pub unscored: usize,
  /// Answers identical to the truth
  pub exact_matches: usize,
  /// Lowest document score
  #[serde(skip_serializing_if = "Option::is_none")]
  pub min_score: Option<f64>,
  /// Highest document score
  #[serde(skip_serializing_if = "Option::is_none")]
  pub max_score: Option<f64>,
}

impl EvaluationReport {
  /// Create a report from an evaluation.
  pub fn from_evaluation(evaluation: &Evaluation, job_name: Option<&str>) -> Self {
    let scores: Vec<f64> = evaluation.results.iter().filter_map(|r| r.score).collect();

    Self {
      metadata: ReportMetadata::new(job_name),
      summary: ReportSummary {
        query: evaluation.query.clone(),
        phrasing: evaluation.truth.clone(),
        mean_score: evaluation.mean_score,
        documents: evaluation.results.len(),
        scored: scores.len(),
        unscored: evaluation.unscored(),
        exact_matches: evaluation.exact_matches(),
        min_score: scores.iter().copied().reduce(f64::min),
        max_score: scores.iter().copied().reduce(f64::max),
      },
      results: evaluation.results.clone(),
    }
  }

  /// Save report to a JSON file.
  pub async fn save(&self, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(self)?;
    tokio::fs::write(path, json).await?;
    Ok(())
  }

  /// Load report from a JSON file.
  pub async fn load(path: &Path) -> Result<Self> {
    let json = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&json)?)
  }
}

/// Phrasing comparison in JSON format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
  pub metadata: ReportMetadata,
  #[serde(flatten)]
  pub comparison: PhrasingComparison,
}

impl ComparisonReport {
  pub fn from_comparison(comparison: &PhrasingComparison, job_name: Option<&str>) -> Self {
    Self {
      metadata: ReportMetadata::new(job_name),
      comparison: comparison.clone(),
    }
  }

  pub async fn save(&self, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(self)?;
    tokio::fs::write(path, json).await?;
    Ok(())
  }
}
