//! Markdown report generation.

use std::fmt::Write as _;
use std::path::Path;

use chrono::Utc;

use super::PhrasingComparison;
use crate::{Evaluation, Result};

/// Answers longer than this are cut in tables
const MAX_CELL_CHARS: usize = 60;

/// Markdown report generator.
pub struct MarkdownReport {
  content: String,
}

impl MarkdownReport {
  /// Create a markdown report for one evaluation.
  pub fn from_evaluation(evaluation: &Evaluation, job_name: Option<&str>) -> Self {
    let mut content = String::new();

    Self::write_header(&mut content, "gtscore Evaluation Report", job_name);
    Self::write_summary(&mut content, evaluation);
    Self::write_results_table(&mut content, evaluation);

    Self { content }
  }

  /// Create a markdown report ranking several phrasings of a query.
  pub fn from_comparison(comparison: &PhrasingComparison, job_name: Option<&str>) -> Self {
    let mut content = String::new();

    Self::write_header(&mut content, "gtscore Phrasing Comparison", job_name);

    let _ = writeln!(content, "**Query:** {}", escape(&comparison.query));
    let _ = writeln!(content);
    let _ = writeln!(content, "## Ranking");
    let _ = writeln!(content);
    let _ = writeln!(content, "| Rank | Phrasing | Mean Score | Scored | Exact |");
    let _ = writeln!(content, "|------|----------|------------|--------|-------|");
    for (rank, phrasing) in comparison.ranked.iter().enumerate() {
      let _ = writeln!(
        content,
        "| {} | {} | {:.1}% | {} | {} |",
        rank + 1,
        escape(&phrasing.phrasing),
        phrasing.mean_score * 100.0,
        phrasing.scored,
        phrasing.exact_matches
      );
    }
    let _ = writeln!(content);

    for evaluation in &comparison.evaluations {
      let _ = writeln!(content, "## {}", escape(&evaluation.truth));
      let _ = writeln!(content);
      Self::write_results_table(&mut content, evaluation);
    }

    Self { content }
  }

  fn write_header(out: &mut String, title: &str, job_name: Option<&str>) {
    let _ = writeln!(out, "# {}", title);
    let _ = writeln!(out);
    let _ = writeln!(out, "**Generated:** {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out, "**Version:** {}", env!("CARGO_PKG_VERSION"));
    if let Some(job_name) = job_name {
      let _ = writeln!(out, "**Labeling Job:** {}", job_name);
    }
    let _ = writeln!(out);
  }

  fn write_summary(out: &mut String, evaluation: &Evaluation) {
    let _ = writeln!(out, "## Summary");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Metric | Value |");
    let _ = writeln!(out, "|--------|-------|");
    let _ = writeln!(out, "| **Query** | {} |", escape(&evaluation.query));
    let _ = writeln!(out, "| **Phrasing** | {} |", escape(&evaluation.truth));
    let _ = writeln!(out, "| **Mean Score** | {:.1}% |", evaluation.mean_score * 100.0);
    let _ = writeln!(out, "| **Documents** | {} |", evaluation.results.len());
    let _ = writeln!(out, "| **Scored** | {} |", evaluation.scored());
    let _ = writeln!(out, "| **Exact Matches** | {} |", evaluation.exact_matches());
    let _ = writeln!(out);
  }

  fn write_results_table(out: &mut String, evaluation: &Evaluation) {
    let _ = writeln!(out, "| Document | Predicted | Truth | Score |");
    let _ = writeln!(out, "|----------|-----------|-------|-------|");

    for result in &evaluation.results {
      let truth = result.truth.as_deref().map(cell).unwrap_or_else(|| "➖".to_string());
      let score = result
        .score
        .map(|s| {
          let icon = if s >= 1.0 { "✅" } else if s >= 0.5 { "⚠️" } else { "❌" };
          format!("{} {:.1}%", icon, s * 100.0)
        })
        .unwrap_or_else(|| "N/A".to_string());

      let _ = writeln!(
        out,
        "| {} | {} | {} | {} |",
        escape(&result.document),
        cell(&result.predicted),
        truth,
        score
      );
    }
    let _ = writeln!(out);
  }

  /// Save to a markdown file.
  pub async fn save(&self, path: &Path) -> Result<()> {
    tokio::fs::write(path, &self.content).await?;
    Ok(())
  }

  /// Get the markdown content.
  pub fn content(&self) -> &str {
    &self.content
  }
}

/// Table-safe text: pipes escaped, newlines flattened.
fn escape(text: &str) -> String {
  text.replace('|', "\\|").replace(['\n', '\r'], " ")
}

fn cell(text: &str) -> String {
  if text.chars().count() > MAX_CELL_CHARS {
    let cut: String = text.chars().take(MAX_CELL_CHARS - 3).collect();
    escape(&format!("{}...", cut))
  } else {
    escape(text)
  }
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;
  use crate::{DocumentResult, RankedPhrasing};

  fn sample_evaluation(phrasing: &str) -> Evaluation {
    Evaluation {
      query: "Vendor".to_string(),
      truth: phrasing.to_string(),
      mean_score: 1.0,
      results: vec![
        DocumentResult {
          document: "s3://docs/a.pdf".to_string(),
          predicted: "Acme | Corp".to_string(),
          truth: Some("Acme | Corp".to_string()),
          score: Some(1.0),
        },
        DocumentResult {
          document: "s3://docs/b.pdf".to_string(),
          predicted: "x".repeat(100),
          truth: None,
          score: None,
        },
      ],
    }
  }

  #[test]
  fn test_evaluation_markdown() {
    let report = MarkdownReport::from_evaluation(&sample_evaluation("Who is the vendor?"), Some("invoices"));
    let content = report.content();

    assert!(content.contains("# gtscore Evaluation Report"));
    assert!(content.contains("**Labeling Job:** invoices"));
    assert!(content.contains("## Summary"));
    assert!(content.contains("| **Mean Score** | 100.0% |"));
    assert!(content.contains("Acme \\| Corp"));
    assert!(content.contains("✅ 100.0%"));
    assert!(content.contains("N/A"));
    assert!(!content.contains(&"x".repeat(100)));
  }

  #[test]
  fn test_comparison_markdown() {
    let evaluations = vec![sample_evaluation("first"), sample_evaluation("second")];
    let comparison = PhrasingComparison {
      query: "Vendor".to_string(),
      ranked: evaluations.iter().map(RankedPhrasing::from_evaluation).collect(),
      evaluations,
    };

    let report = MarkdownReport::from_comparison(&comparison, None);
    let content = report.content();

    assert!(content.contains("# gtscore Phrasing Comparison"));
    assert!(content.contains("| 1 | first | 100.0% | 1 | 1 |"));
    assert!(content.contains("## second"));
    assert!(!content.contains("Labeling Job"));
  }

  #[tokio::test]
  async fn test_save_markdown() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("report.md");

    let report = MarkdownReport::from_evaluation(&sample_evaluation("phrasing"), None);
    report.save(&path).await.unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("# gtscore Evaluation Report"));
  }
}
