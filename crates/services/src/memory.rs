//! In-process service backends.
//!
//! Serve labeling jobs, objects and analysis answers from memory and count
//! every call, so index building and evaluation can run without AWS.

use std::{
  collections::HashMap,
  sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use gtscore_core::S3Uri;
use tokio::sync::Mutex;

use crate::{AnalysisRequest, AnalysisResponse, DocumentAnalysis, LabelingJobs, ObjectStore, Result, ServiceError};

/// Labeling jobs keyed by name
#[derive(Debug, Default)]
pub struct MemoryLabelingJobs {
  output_paths: HashMap<String, String>,
  calls: AtomicUsize,
}

impl MemoryLabelingJobs {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_job(mut self, job_name: impl Into<String>, output_path: impl Into<String>) -> Self {
    self.output_paths.insert(job_name.into(), output_path.into());
    self
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl LabelingJobs for MemoryLabelingJobs {
  fn name(&self) -> &str {
    "memory"
  }

  async fn output_path(&self, job_name: &str) -> Result<String> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    self
      .output_paths
      .get(job_name)
      .cloned()
      .ok_or_else(|| ServiceError::Labeling {
        job_name: job_name.to_string(),
        message: "ResourceNotFound: labeling job does not exist".to_string(),
      })
  }
}

/// Objects keyed by their `s3://` URI
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
  objects: HashMap<S3Uri, Vec<u8>>,
  calls: AtomicUsize,
}

impl MemoryObjectStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_object(mut self, location: S3Uri, body: impl Into<Vec<u8>>) -> Self {
    self.objects.insert(location, body.into());
    self
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
  fn name(&self) -> &str {
    "memory"
  }

  async fn get_object(&self, location: &S3Uri) -> Result<Vec<u8>> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    self.objects.get(location).cloned().ok_or_else(|| ServiceError::Storage {
      uri: location.to_string(),
      message: "NoSuchKey".to_string(),
    })
  }
}

/// Analysis answers scripted per document URI, optionally per query text.
///
/// A response scripted for the exact (document, query text) pair wins over one
/// scripted for the document alone. Documents without a scripted response fail
/// like an unreadable document would. Every request is recorded.
#[derive(Debug, Default)]
pub struct ScriptedAnalysis {
  responses: HashMap<String, AnalysisResponse>,
  phrased: HashMap<(String, String), AnalysisResponse>,
  requests: Mutex<Vec<AnalysisRequest>>,
}

impl ScriptedAnalysis {
  pub fn new() -> Self {
    Self::default()
  }

  /// Answer `text` for `document`, shaped like a query result
  pub fn with_answer(self, document: impl Into<String>, text: &str) -> Self {
    self.with_response(document, AnalysisResponse::answer("query", text))
  }

  /// Answer `text` for `document` only when asked with `query_text`
  pub fn with_answer_for(mut self, document: impl Into<String>, query_text: impl Into<String>, text: &str) -> Self {
    self
      .phrased
      .insert((document.into(), query_text.into()), AnalysisResponse::answer("query", text));
    self
  }

  pub fn with_response(mut self, document: impl Into<String>, response: AnalysisResponse) -> Self {
    self.responses.insert(document.into(), response);
    self
  }

  /// Requests received so far, in call order
  pub async fn requests(&self) -> Vec<AnalysisRequest> {
    self.requests.lock().await.clone()
  }

  pub async fn calls(&self) -> usize {
    self.requests.lock().await.len()
  }
}

#[async_trait]
impl DocumentAnalysis for ScriptedAnalysis {
  fn name(&self) -> &str {
    "scripted"
  }

  async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResponse> {
    let document = request.document.to_string();
    let key = (document.clone(), request.query_text.clone());
    self.requests.lock().await.push(request);

    self
      .phrased
      .get(&key)
      .or_else(|| self.responses.get(&document))
      .cloned()
      .ok_or_else(|| ServiceError::Analysis {
        document,
        message: "UnsupportedDocumentException".to_string(),
      })
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[tokio::test]
  async fn test_labeling_jobs_lookup() {
    let jobs = MemoryLabelingJobs::new().with_job("job-1", "s3://out/jobs/");

    assert_eq!(jobs.output_path("job-1").await.unwrap(), "s3://out/jobs/");
    assert!(matches!(
      jobs.output_path("missing").await,
      Err(ServiceError::Labeling { .. })
    ));
    assert_eq!(jobs.calls(), 2);
  }

  #[tokio::test]
  async fn test_object_store_json_helpers() {
    let single = S3Uri::new("b", "single.json");
    let stacked = S3Uri::new("b", "out.manifest");
    let broken = S3Uri::new("b", "broken.manifest");
    let store = MemoryObjectStore::new()
      .with_object(single.clone(), r#"{"Entities": []}"#)
      .with_object(stacked.clone(), "{\"a\":1}\n{\"a\":2}\n")
      .with_object(broken.clone(), "{\"a\":1}\n{oops");

    assert_eq!(store.get_json(&single).await.unwrap(), json!({"Entities": []}));
    assert_eq!(store.get_stacked_json(&stacked).await.unwrap().len(), 2);

    let err = store.get_stacked_json(&broken).await.unwrap_err();
    assert!(matches!(err, ServiceError::StackedJson { ref source, .. } if source.offset() == 8));

    let missing = store.get_object(&S3Uri::new("b", "nope")).await.unwrap_err();
    assert!(matches!(missing, ServiceError::Storage { .. }));
    assert_eq!(store.calls(), 4);
  }

  #[tokio::test]
  async fn test_scripted_analysis_records_requests() {
    let analysis = ScriptedAnalysis::new().with_answer("s3://docs/a.pdf", "Acme Corp");

    let request = AnalysisRequest::new(S3Uri::new("docs", "a.pdf"), "Who issued this?", "Company");
    let response = analysis.analyze(request.clone()).await.unwrap();
    assert_eq!(response.blocks.last().and_then(|b| b.text.as_deref()), Some("Acme Corp"));

    let unknown = AnalysisRequest::new(S3Uri::new("docs", "b.pdf"), "Who issued this?", "Company");
    assert!(analysis.analyze(unknown).await.is_err());

    assert_eq!(analysis.calls().await, 2);
    assert_eq!(analysis.requests().await[0], request);
  }

  #[tokio::test]
  async fn test_scripted_analysis_answers_per_query_text() {
    let analysis = ScriptedAnalysis::new()
      .with_answer("s3://docs/a.pdf", "fallback")
      .with_answer_for("s3://docs/a.pdf", "Who is the vendor?", "Acme Corp");
    let doc = S3Uri::new("docs", "a.pdf");

    let phrased = analysis
      .analyze(AnalysisRequest::new(doc.clone(), "Who is the vendor?", "Vendor"))
      .await
      .unwrap();
    let other = analysis
      .analyze(AnalysisRequest::new(doc, "Company name?", "Vendor"))
      .await
      .unwrap();

    assert_eq!(phrased.blocks.last().and_then(|b| b.text.as_deref()), Some("Acme Corp"));
    assert_eq!(other.blocks.last().and_then(|b| b.text.as_deref()), Some("fallback"));
  }
}
