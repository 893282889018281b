//! Ground truth index: which documents carry a truth for each query, and
//! what that truth is.

use std::collections::{BTreeMap, HashMap};

use gtscore_core::{Annotation, LabelRecord};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::GroundTruthSource;
use crate::Result;

/// Lookup tables built from one labeling job.
///
/// Every document listed under a query in `query_to_documents` is a key of
/// `document_to_truth`, and its truth map contains that query. A `None` truth
/// means the document was labeled with the query but the annotation has no
/// matching entity.
#[derive(Debug, Clone, Default)]
pub struct GroundTruthIndex {
  job_name: Option<String>,
  records: usize,
  /// Query → documents, in manifest order (duplicates kept)
  query_to_documents: BTreeMap<String, Vec<String>>,
  /// Document → (query → truth text)
  document_to_truth: HashMap<String, HashMap<String, Option<String>>>,
}

/// Summary counts for an index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
  /// Manifest records read
  pub records: usize,
  /// Distinct documents
  pub documents: usize,
  /// Distinct queries with at least one labeled document
  pub queries: usize,
  /// (query, document) label pairs
  pub labels: usize,
  /// Label pairs whose annotation had no matching entity
  pub missing_truths: usize,
}

/// Per-query counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryStats {
  pub query: String,
  pub documents: usize,
  pub missing_truths: usize,
}

impl GroundTruthIndex {
  /// Create an empty index.
  pub fn new() -> Self {
    Self::default()
  }

  /// Build an index from a labeling job's output manifest.
  pub async fn build(job_name: &str, source: &GroundTruthSource<'_>) -> Result<Self> {
    info!(job_name, "Building ground truth index");

    let records = source.load_records(job_name).await?;

    let mut index = Self {
      job_name: Some(job_name.to_string()),
      ..Default::default()
    };
    for record in &records {
      let annotation = if record.labels.is_empty() {
        Annotation::default()
      } else {
        source.load_annotation(record).await?
      };
      index.insert_record(record, &annotation);
    }

    let stats = index.stats();
    info!(
      job_name,
      records = stats.records,
      documents = stats.documents,
      queries = stats.queries,
      missing_truths = stats.missing_truths,
      "Ground truth index built"
    );
    Ok(index)
  }

  /// Replace this index with a fresh build of `job_name`.
  ///
  /// The current contents are kept if the build fails.
  pub async fn rebuild(&mut self, job_name: &str, source: &GroundTruthSource<'_>) -> Result<()> {
    *self = Self::build(job_name, source).await?;
    Ok(())
  }

  /// Add one manifest record and its annotation.
  ///
  /// A document listed by several records keeps the labels of all of them.
  pub fn insert_record(&mut self, record: &LabelRecord, annotation: &Annotation) {
    self.records += 1;
    let truths = self.document_to_truth.entry(record.source_ref.clone()).or_default();

    for label in &record.labels {
      self
        .query_to_documents
        .entry(label.clone())
        .or_default()
        .push(record.source_ref.clone());

      let truth = annotation.truth_for(label).map(str::to_string);
      if truth.is_none() {
        warn!(document = %record.source_ref, query = %label, "No ground truth entity for label");
      }
      truths.insert(label.clone(), truth);
    }
  }

  /// Labeling job this index was built from
  pub fn job_name(&self) -> Option<&str> {
    self.job_name.as_deref()
  }

  /// All queries with ground truth, sorted
  pub fn queries(&self) -> Vec<&str> {
    self.query_to_documents.keys().map(String::as_str).collect()
  }

  /// Documents labeled with `query`, in manifest order
  pub fn documents_for(&self, query: &str) -> &[String] {
    self.query_to_documents.get(query).map(Vec::as_slice).unwrap_or_default()
  }

  /// Whether `document` was labeled with `query`
  pub fn has_label(&self, document: &str, query: &str) -> bool {
    self
      .document_to_truth
      .get(document)
      .is_some_and(|truths| truths.contains_key(query))
  }

  /// Ground truth text for a (document, query) pair
  pub fn truth_for(&self, document: &str, query: &str) -> Option<&str> {
    self.document_to_truth.get(document)?.get(query)?.as_deref()
  }

  /// Documents labeled with `query` paired with their truth
  pub fn documents_with_truth(&self, query: &str) -> Vec<(&str, Option<&str>)> {
    self
      .documents_for(query)
      .iter()
      .map(|document| (document.as_str(), self.truth_for(document, query)))
      .collect()
  }

  pub fn stats(&self) -> IndexStats {
    let truths = self.document_to_truth.values().flat_map(HashMap::values);
    let (labels, missing_truths) = truths.fold((0, 0), |(labels, missing), truth| {
      (labels + 1, missing + usize::from(truth.is_none()))
    });

    IndexStats {
      records: self.records,
      documents: self.document_to_truth.len(),
      queries: self.query_to_documents.len(),
      labels,
      missing_truths,
    }
  }

  /// Per-query document and missing-truth counts, sorted by query
  pub fn query_stats(&self) -> Vec<QueryStats> {
    self
      .query_to_documents
      .iter()
      .map(|(query, documents)| QueryStats {
        query: query.clone(),
        documents: documents.len(),
        missing_truths: documents
          .iter()
          .filter(|document| self.truth_for(document, query).is_none())
          .count(),
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use gtscore_core::{AnnotationEntity, S3Uri};
  use services::{
    ServiceError,
    memory::{MemoryLabelingJobs, MemoryObjectStore},
  };

  use super::*;
  use crate::EvalError;

  const JOB: &str = "invoices";

  fn record(source_ref: &str, labels: &[&str]) -> LabelRecord {
    LabelRecord {
      source_ref: source_ref.to_string(),
      labels: labels.iter().map(|l| l.to_string()).collect(),
      annotation_ref: Some(format!("{}.json", source_ref)),
    }
  }

  fn annotation(entities: &[(&str, &str)]) -> Annotation {
    Annotation {
      entities: entities
        .iter()
        .map(|(entity_type, text)| AnnotationEntity {
          entity_type: entity_type.to_string(),
          text: Some(text.to_string()),
        })
        .collect(),
    }
  }

  fn manifest_line(doc: &str, labels: &[&str]) -> String {
    serde_json::json!({
      "source-ref": doc,
      "metadata": {"labels": labels},
      "invoices": {"annotation-ref": format!("{}.annotation.json", doc)},
    })
    .to_string()
  }

  fn assert_invariant(index: &GroundTruthIndex) {
    for query in index.queries() {
      for document in index.documents_for(query) {
        assert!(index.has_label(document, query), "{} missing {}", document, query);
      }
    }
  }

  #[test]
  fn test_insert_record() {
    let mut index = GroundTruthIndex::new();
    index.insert_record(
      &record("s3://docs/a.pdf", &["Company", "Total"]),
      &annotation(&[("Company", "Acme Corp")]),
    );
    index.insert_record(&record("s3://docs/b.pdf", &["Company"]), &annotation(&[("Company", "Beta LLC")]));

    assert_eq!(index.queries(), vec!["Company", "Total"]);
    assert_eq!(index.documents_for("Company"), &["s3://docs/a.pdf", "s3://docs/b.pdf"]);
    assert_eq!(index.truth_for("s3://docs/a.pdf", "Company"), Some("Acme Corp"));
    assert_eq!(index.truth_for("s3://docs/a.pdf", "Total"), None);
    assert!(index.has_label("s3://docs/a.pdf", "Total"));
    assert!(!index.has_label("s3://docs/b.pdf", "Total"));
    assert_invariant(&index);
  }

  #[test]
  fn test_unknown_query_has_no_documents() {
    let index = GroundTruthIndex::new();
    assert!(index.documents_for("Company").is_empty());
    assert!(index.documents_with_truth("Company").is_empty());
  }

  #[test]
  fn test_duplicate_document_keeps_all_labels() {
    let mut index = GroundTruthIndex::new();
    index.insert_record(&record("s3://docs/a.pdf", &["Company"]), &annotation(&[("Company", "Acme")]));
    index.insert_record(&record("s3://docs/a.pdf", &["Total"]), &annotation(&[("Total", "$5")]));
    index.insert_record(&record("s3://docs/a.pdf", &["Company"]), &annotation(&[("Company", "Acme")]));

    assert_eq!(index.documents_for("Company").len(), 2);
    assert_eq!(index.truth_for("s3://docs/a.pdf", "Total"), Some("$5"));
    assert_invariant(&index);

    let stats = index.stats();
    assert_eq!(stats.records, 3);
    assert_eq!(stats.documents, 1);
    assert_eq!(stats.labels, 2);
  }

  #[test]
  fn test_stats() {
    let mut index = GroundTruthIndex::new();
    index.insert_record(
      &record("s3://docs/a.pdf", &["Company", "Total"]),
      &annotation(&[("Company", "Acme Corp")]),
    );
    index.insert_record(&record("s3://docs/b.pdf", &[]), &Annotation::default());

    assert_eq!(
      index.stats(),
      IndexStats {
        records: 2,
        documents: 2,
        queries: 2,
        labels: 2,
        missing_truths: 1,
      }
    );
    assert_eq!(
      index.query_stats(),
      vec![
        QueryStats {
          query: "Company".to_string(),
          documents: 1,
          missing_truths: 0,
        },
        QueryStats {
          query: "Total".to_string(),
          documents: 1,
          missing_truths: 1,
        },
      ]
    );
  }

  fn fixture_store() -> MemoryObjectStore {
    let manifest = format!(
      "{}\n{}\n{}",
      manifest_line("s3://docs/a.pdf", &["Company", "Total"]),
      manifest_line("s3://docs/b.pdf", &["Company"]),
      manifest_line("s3://docs/c.pdf", &[]),
    );

    MemoryObjectStore::new()
      .with_object(S3Uri::new("out", "jobs/invoices/manifests/output/output.manifest"), manifest)
      .with_object(
        S3Uri::new("docs", "a.pdf.annotation.json"),
        r#"{"Entities": [{"Type": "Company", "Text": "Acme Corp"}, {"Type": "Total", "Text": "$10"}]}"#,
      )
      .with_object(
        S3Uri::new("docs", "b.pdf.annotation.json"),
        r#"{"Entities": [{"Type": "Date", "Text": "2023-01-01"}]}"#,
      )
  }

  #[tokio::test]
  async fn test_build_from_manifest() {
    let jobs = MemoryLabelingJobs::new().with_job(JOB, "s3://out/jobs/");
    let store = fixture_store();
    let source = GroundTruthSource::new(&jobs, &store);

    let index = GroundTruthIndex::build(JOB, &source).await.unwrap();

    assert_eq!(index.job_name(), Some(JOB));
    assert_eq!(index.documents_for("Company"), &["s3://docs/a.pdf", "s3://docs/b.pdf"]);
    assert_eq!(index.truth_for("s3://docs/a.pdf", "Total"), Some("$10"));
    assert_eq!(index.truth_for("s3://docs/b.pdf", "Company"), None);
    assert!(index.has_label("s3://docs/b.pdf", "Company"));
    assert_eq!(index.stats().documents, 3);
    assert_invariant(&index);

    // Manifest plus one annotation per labeled record
    assert_eq!(store.calls(), 3);
    assert_eq!(jobs.calls(), 1);
  }

  #[tokio::test]
  async fn test_rebuild_replaces_previous_state() {
    let jobs = MemoryLabelingJobs::new().with_job(JOB, "s3://out/jobs/");
    let store = fixture_store();
    let source = GroundTruthSource::new(&jobs, &store);

    let mut index = GroundTruthIndex::new();
    index.insert_record(&record("s3://old/x.pdf", &["Stale"]), &annotation(&[("Stale", "old")]));

    index.rebuild(JOB, &source).await.unwrap();

    assert!(index.documents_for("Stale").is_empty());
    assert!(!index.has_label("s3://old/x.pdf", "Stale"));
    assert_eq!(index.queries(), vec!["Company", "Total"]);
  }

  #[tokio::test]
  async fn test_failed_rebuild_keeps_previous_index() {
    let jobs = MemoryLabelingJobs::new().with_job(JOB, "s3://out/jobs/");
    let store = MemoryObjectStore::new().with_object(
      S3Uri::new("out", "jobs/invoices/manifests/output/output.manifest"),
      "{\"source-ref\": \"s3://docs/a.pdf\", \"metadata\": {\"labels\": []}}\n{not json",
    );
    let source = GroundTruthSource::new(&jobs, &store);

    let mut index = GroundTruthIndex::new();
    index.insert_record(&record("s3://old/x.pdf", &["Kept"]), &annotation(&[("Kept", "yes")]));

    let err = index.rebuild(JOB, &source).await.unwrap_err();

    assert!(matches!(err, EvalError::Service(ServiceError::StackedJson { .. })));
    assert_eq!(index.truth_for("s3://old/x.pdf", "Kept"), Some("yes"));
  }

  #[tokio::test]
  async fn test_build_unknown_job() {
    let jobs = MemoryLabelingJobs::new();
    let store = MemoryObjectStore::new();
    let source = GroundTruthSource::new(&jobs, &store);

    let err = GroundTruthIndex::build("missing-job", &source).await.unwrap_err();

    assert!(matches!(err, EvalError::Service(ServiceError::Labeling { .. })));
    assert_eq!(store.calls(), 0);
  }

  #[tokio::test]
  async fn test_build_missing_annotation_object_aborts() {
    let jobs = MemoryLabelingJobs::new().with_job(JOB, "s3://out/jobs");
    let store = MemoryObjectStore::new().with_object(
      S3Uri::new("out", "jobs/invoices/manifests/output/output.manifest"),
      manifest_line("s3://docs/a.pdf", &["Company"]),
    );
    let source = GroundTruthSource::new(&jobs, &store);

    let err = GroundTruthIndex::build(JOB, &source).await.unwrap_err();

    assert!(matches!(err, EvalError::Service(ServiceError::Storage { .. })));
  }
}
