//! Ranking of several phrasings of the same query.

use serde::{Deserialize, Serialize};

use crate::Evaluation;

/// One phrasing and how it scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPhrasing {
  /// Phrasing sent to the analysis service
  pub phrasing: String,
  /// Mean similarity over scored documents
  pub mean_score: f64,
  /// Documents that contributed to the mean
  pub scored: usize,
  /// Documents whose answer matched the truth exactly
  pub exact_matches: usize,
}

impl RankedPhrasing {
  pub fn from_evaluation(evaluation: &Evaluation) -> Self {
    Self {
      phrasing: evaluation.truth.clone(),
      mean_score: evaluation.mean_score,
      scored: evaluation.scored(),
      exact_matches: evaluation.exact_matches(),
    }
  }
}

/// Phrasings of one query, best first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhrasingComparison {
  /// Ground truth query
  pub query: String,
  /// Phrasings sorted by mean score, descending
  pub ranked: Vec<RankedPhrasing>,
  /// Full evaluations, in the order the phrasings were given
  pub evaluations: Vec<Evaluation>,
}

impl PhrasingComparison {
  /// Highest scoring phrasing
  pub fn best(&self) -> Option<&RankedPhrasing> {
    self.ranked.first()
  }

  /// Score gap between the best and the worst phrasing
  pub fn spread(&self) -> f64 {
    match (self.ranked.first(), self.ranked.last()) {
      (Some(best), Some(worst)) => best.mean_score - worst.mean_score,
      _ => 0.0,
    }
  }
}
