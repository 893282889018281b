//! Report generation for evaluation results.
//!
//! - JSON: machine-readable results, one object per run
//! - Markdown: human-readable summary and per-document table
//! - Comparison: phrasings of one query ranked by mean score

mod comparison;
mod json;
mod markdown;

use std::path::{Path, PathBuf};

pub use comparison::{PhrasingComparison, RankedPhrasing};
use gtscore_core::ReportFormat;
pub use json::{ComparisonReport, EvaluationReport, ReportMetadata, ReportSummary};
pub use markdown::MarkdownReport;
use tracing::info;

use crate::Evaluation;

/// Write the requested formats for an evaluation to `<output_dir>/<run_name>.<ext>`.
///
/// Returns the paths written.
pub async fn generate_reports(
  evaluation: &Evaluation,
  job_name: Option<&str>,
  output_dir: &Path,
  run_name: &str,
  formats: &[ReportFormat],
) -> crate::Result<Vec<PathBuf>> {
  tokio::fs::create_dir_all(output_dir).await?;

  let mut written = Vec::new();
  for format in dedup(formats) {
    let path = report_path(output_dir, run_name, format);
    match format {
      ReportFormat::Json => {
        EvaluationReport::from_evaluation(evaluation, job_name)
          .save(&path)
          .await?
      }
      ReportFormat::Markdown => {
        MarkdownReport::from_evaluation(evaluation, job_name)
          .save(&path)
          .await?
      }
    }
    info!(path = %path.display(), "Wrote report");
    written.push(path);
  }

  Ok(written)
}

/// Write the requested formats for a phrasing comparison.
pub async fn generate_comparison_reports(
  comparison: &PhrasingComparison,
  job_name: Option<&str>,
  output_dir: &Path,
  run_name: &str,
  formats: &[ReportFormat],
) -> crate::Result<Vec<PathBuf>> {
  tokio::fs::create_dir_all(output_dir).await?;

  let mut written = Vec::new();
  for format in dedup(formats) {
    let path = report_path(output_dir, run_name, format);
    match format {
      ReportFormat::Json => {
        ComparisonReport::from_comparison(comparison, job_name)
          .save(&path)
          .await?
      }
      ReportFormat::Markdown => {
        MarkdownReport::from_comparison(comparison, job_name)
          .save(&path)
          .await?
      }
    }
    info!(path = %path.display(), "Wrote report");
    written.push(path);
  }

  Ok(written)
}

fn report_path(output_dir: &Path, run_name: &str, format: ReportFormat) -> PathBuf {
  let ext = match format {
    ReportFormat::Json => "json",
    ReportFormat::Markdown => "md",
  };
  output_dir.join(format!("{}.{}", run_name, ext))
}

fn dedup(formats: &[ReportFormat]) -> Vec<ReportFormat> {
  let mut unique = Vec::with_capacity(formats.len());
  for format in formats {
    if !unique.contains(format) {
      unique.push(*format);
    }
  }
  unique
}
