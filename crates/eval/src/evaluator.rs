//! Scores a hypothesis against the ground truth index.
//!
//! For every document labeled with the hypothesis query, the phrasing is sent
//! to the analysis service and the answer (text of the last response block)
//! is compared to the stored truth with a sequence-matching ratio.

use std::collections::{BTreeMap, HashSet};

use gtscore_core::{S3Uri, similarity};
use serde::{Deserialize, Serialize};
use services::{AnalysisRequest, DocumentAnalysis};
use tracing::{debug, info, warn};

use crate::{EvalError, GroundTruthIndex, Hypothesis, PhrasingComparison, RankedPhrasing, Result};

/// Outcome for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
  /// Document URI
  pub document: String,
  /// Answer returned by the analysis service
  pub predicted: String,
  /// Ground truth text, if the annotation had one
  pub truth: Option<String>,
  /// Similarity in [0, 1]; `None` when there is no truth to compare against
  pub score: Option<f64>,
}

/// Result of evaluating one hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
  /// Ground truth query
  pub query: String,
  /// Phrasing sent to the analysis service
  pub truth: String,
  /// Mean similarity over scored documents
  pub mean_score: f64,
  /// Per-document results, in manifest order
  pub results: Vec<DocumentResult>,
}

impl Evaluation {
  /// Documents that contributed to the mean
  pub fn scored(&self) -> usize {
    self.results.iter().filter(|r| r.score.is_some()).count()
  }

  /// Documents skipped for lack of a ground truth text
  pub fn unscored(&self) -> usize {
    self.results.len() - self.scored()
  }

  /// Documents whose answer matched the truth exactly
  pub fn exact_matches(&self) -> usize {
    self
      .results
      .iter()
      .filter(|r| r.truth.as_deref() == Some(r.predicted.as_str()))
      .count()
  }
}

/// Evaluates hypotheses against one index with one analysis backend.
pub struct Evaluator<'a> {
  index: &'a GroundTruthIndex,
  analysis: &'a dyn DocumentAnalysis,
}

impl<'a> Evaluator<'a> {
  pub fn new(index: &'a GroundTruthIndex, analysis: &'a dyn DocumentAnalysis) -> Self {
    Self { index, analysis }
  }

  /// Evaluate a hypothesis.
  ///
  /// Fails without calling the analysis service when the hypothesis is
  /// incomplete or its query has no labeled documents. Documents listed more
  /// than once are analyzed once. `hypothesis.responses` is replaced with the
  /// answers received, including when a later call fails.
  pub async fn evaluate(&self, hypothesis: &mut Hypothesis) -> Result<Evaluation> {
    let (query, phrasing) = hypothesis.ready()?;

    let mut seen = HashSet::new();
    let documents: Vec<&str> = self
      .index
      .documents_for(&query)
      .iter()
      .map(String::as_str)
      .filter(|document| seen.insert(*document))
      .collect();

    if documents.is_empty() {
      return Err(EvalError::NoGroundTruth { query });
    }

    info!(
      query = %query,
      phrasing = %phrasing,
      documents = documents.len(),
      backend = self.analysis.name(),
      "Evaluating hypothesis"
    );

    let mut responses = BTreeMap::new();
    let mut results = Vec::with_capacity(documents.len());

    for document in documents {
      let predicted = match self.answer(document, &query, &phrasing).await {
        Ok(predicted) => predicted,
        Err(e) => {
          hypothesis.set_responses(responses);
          return Err(e);
        }
      };
      responses.insert(document.to_string(), predicted.clone());
      results.push(self.score(document, &query, predicted));
    }

    hypothesis.set_responses(responses);

    let scores: Vec<f64> = results.iter().filter_map(|r| r.score).collect();
    if scores.is_empty() {
      return Err(EvalError::NoScorableDocuments { query });
    }
    let mean_score = scores.iter().sum::<f64>() / scores.len() as f64;

    info!(
      query = %query,
      mean_score,
      scored = scores.len(),
      unscored = results.len() - scores.len(),
      "Hypothesis evaluated"
    );

    Ok(Evaluation {
      query,
      truth: phrasing,
      mean_score,
      results,
    })
  }

  /// Evaluate several phrasings of one query and rank them by mean score.
  ///
  /// Phrasings are evaluated in order; the first failure aborts the comparison.
  pub async fn compare(&self, query: &str, phrasings: &[String]) -> Result<PhrasingComparison> {
    let mut evaluations = Vec::with_capacity(phrasings.len());
    for phrasing in phrasings {
      let mut hypothesis = Hypothesis::new(query).with_truth(phrasing.as_str());
      evaluations.push(self.evaluate(&mut hypothesis).await?);
    }

    let mut ranked: Vec<RankedPhrasing> = evaluations.iter().map(RankedPhrasing::from_evaluation).collect();
    ranked.sort_by(|a, b| b.mean_score.total_cmp(&a.mean_score));

    Ok(PhrasingComparison {
      query: query.to_string(),
      ranked,
      evaluations,
    })
  }

  /// Ask `phrasing` on one document and take the last block's text as the answer.
  async fn answer(&self, document: &str, query: &str, phrasing: &str) -> Result<String> {
    let location = S3Uri::parse(document)?;
    let response = self
      .analysis
      .analyze(AnalysisRequest::new(location, phrasing, query))
      .await?;

    // The query result is the last block of the response.
    let last = response.blocks.last().ok_or_else(|| EvalError::EmptyResponse {
      document: document.to_string(),
    })?;

    match &last.text {
      Some(text) => {
        debug!(document, answer = %text, "Received answer");
        Ok(text.clone())
      }
      None => {
        warn!(document, block_type = %last.block_type, "Last response block has no text, treating as empty answer");
        Ok(String::new())
      }
    }
  }

  fn score(&self, document: &str, query: &str, predicted: String) -> DocumentResult {
    let truth = self.index.truth_for(document, query).map(str::to_string);
    let score = match &truth {
      Some(truth) => Some(similarity::ratio(&predicted, truth)),
      None => {
        warn!(document, query, "No ground truth text, excluding document from the mean");
        None
      }
    };

    DocumentResult {
      document: document.to_string(),
      predicted,
      truth,
      score,
    }
  }
}
