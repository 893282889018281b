//! A candidate query phrasing under test.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{EvalError, Result};

/// A query from the ground truth and the phrasing sent to the analysis
/// service in its place.
///
/// `responses` stays `None` until an evaluation runs; each evaluation replaces
/// it with the answers it received.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hypothesis {
  query: String,
  truth: Option<String>,
  responses: Option<BTreeMap<String, String>>,
}

impl Hypothesis {
  /// Hypothesis for a ground truth query, with no phrasing yet.
  pub fn new(query: impl Into<String>) -> Self {
    Self {
      query: query.into(),
      ..Default::default()
    }
  }

  pub fn with_truth(mut self, truth: impl Into<String>) -> Self {
    self.set_truth(truth);
    self
  }

  /// Set the phrasing sent to the analysis service.
  pub fn set_truth(&mut self, truth: impl Into<String>) {
    self.truth = Some(truth.into());
  }

  pub fn query(&self) -> &str {
    &self.query
  }

  pub fn truth(&self) -> Option<&str> {
    self.truth.as_deref()
  }

  /// Answers from the last evaluation, keyed by document URI
  pub fn responses(&self) -> Option<&BTreeMap<String, String>> {
    self.responses.as_ref()
  }

  pub(crate) fn set_responses(&mut self, responses: BTreeMap<String, String>) {
    self.responses = Some(responses);
  }

  /// Query and phrasing, both required to be non-blank.
  pub(crate) fn ready(&self) -> Result<(String, String)> {
    if self.query.trim().is_empty() {
      return Err(EvalError::InvalidState(
        "the hypothesis has no query; both the query and its truth must be set before evaluating".to_string(),
      ));
    }
    match self.truth.as_deref() {
      Some(truth) if !truth.trim().is_empty() => Ok((self.query.clone(), truth.to_string())),
      _ => Err(EvalError::InvalidState(format!(
        "the hypothesis for query '{}' has no truth; set the phrasing to test before evaluating",
        self.query
      ))),
    }
  }
}
