//! Build an index from a labeling job and evaluate phrasings against it,
//! with in-memory services standing in for the cloud backends.

use eval::{EvalError, Evaluator, GroundTruthIndex, GroundTruthSource, Hypothesis, generate_reports};
use gtscore_core::{ReportFormat, S3Uri};
use services::memory::{MemoryLabelingJobs, MemoryObjectStore, ScriptedAnalysis};
use tempfile::TempDir;

const JOB: &str = "receipts";

fn manifest_line(doc: &str, labels: &[&str], annotation: &str) -> String {
  serde_json::json!({
    "source-ref": doc,
    "metadata": {"labels": labels},
    "receipts": {"annotation-ref": annotation},
  })
  .to_string()
}

fn fixtures() -> (MemoryLabelingJobs, MemoryObjectStore) {
  let jobs = MemoryLabelingJobs::new().with_job(JOB, "s3://labels/output");

  // Pretty-printed and compact values stacked in one object
  let manifest = format!(
    "{}{}\n",
    serde_json::to_string_pretty(&serde_json::json!({
      "source-ref": "s3://docs/one.pdf",
      "metadata": {"labels": ["Q"]},
      "receipts": {"annotation-ref": "s3://labels/ann/one.json"},
    }))
    .unwrap(),
    manifest_line("s3://docs/two.pdf", &["Q", "Total"], "s3://labels/ann/two.json"),
  );

  let store = MemoryObjectStore::new()
    .with_object(S3Uri::new("labels", "output/receipts/manifests/output/output.manifest"), manifest)
    .with_object(
      S3Uri::new("labels", "ann/one.json"),
      r#"{"Entities": [{"Type": "Q", "Text": "Acme Corp"}]}"#,
    )
    .with_object(
      S3Uri::new("labels", "ann/two.json"),
      r#"{"Entities": [{"Type": "Q", "Text": "Acme Corp"}, {"Type": "Total", "Text": "$42.00"}]}"#,
    );

  (jobs, store)
}

#[tokio::test]
async fn test_evaluate_phrasing_end_to_end() {
  let (jobs, store) = fixtures();
  let source = GroundTruthSource::new(&jobs, &store);
  let index = GroundTruthIndex::build(JOB, &source).await.unwrap();

  for query in index.queries() {
    for document in index.documents_for(query) {
      assert!(index.has_label(document, query));
    }
  }

  let analysis = ScriptedAnalysis::new()
    .with_answer("s3://docs/one.pdf", "Acme Corp")
    .with_answer("s3://docs/two.pdf", "Acme Corp");
  let evaluator = Evaluator::new(&index, &analysis);

  let mut hypothesis = Hypothesis::new("Q").with_truth("Who is the merchant?");
  let evaluation = evaluator.evaluate(&mut hypothesis).await.unwrap();

  assert_eq!(evaluation.mean_score, 1.0);
  assert_eq!(evaluation.results.len(), 2);
  assert_eq!(hypothesis.responses().unwrap().len(), 2);

  let requests = analysis.requests().await;
  assert!(requests.iter().all(|r| r.query_text == "Who is the merchant?" && r.alias == "Q"));

  let temp = TempDir::new().unwrap();
  let written = generate_reports(
    &evaluation,
    index.job_name(),
    temp.path(),
    "merchant",
    &[ReportFormat::Json, ReportFormat::Markdown],
  )
  .await
  .unwrap();
  assert_eq!(written.len(), 2);

  let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&written[0]).unwrap()).unwrap();
  assert_eq!(json["metadata"]["job_name"], JOB);
  assert_eq!(json["summary"]["mean_score"], 1.0);
}

#[tokio::test]
async fn test_compare_phrasings_end_to_end() {
  let (jobs, store) = fixtures();
  let source = GroundTruthSource::new(&jobs, &store);
  let index = GroundTruthIndex::build(JOB, &source).await.unwrap();

  let analysis = ScriptedAnalysis::new()
    .with_answer_for("s3://docs/two.pdf", "Amount due?", "$42")
    .with_answer_for("s3://docs/two.pdf", "What is the total?", "$42.00");
  let evaluator = Evaluator::new(&index, &analysis);

  let phrasings = vec!["Amount due?".to_string(), "What is the total?".to_string()];
  let comparison = evaluator.compare("Total", &phrasings).await.unwrap();

  assert_eq!(comparison.ranked.len(), 2);
  assert_eq!(comparison.best().unwrap().phrasing, "What is the total?");
  assert_eq!(comparison.ranked[0].mean_score, 1.0);
  assert_eq!(comparison.ranked[1].phrasing, "Amount due?");
  assert!(comparison.ranked[1].mean_score < 1.0);
  assert!(comparison.spread() > 0.0);
  assert_eq!(analysis.calls().await, 2);
}

#[tokio::test]
async fn test_unlabeled_query_fails_without_analysis() {
  let (jobs, store) = fixtures();
  let source = GroundTruthSource::new(&jobs, &store);
  let index = GroundTruthIndex::build(JOB, &source).await.unwrap();

  let analysis = ScriptedAnalysis::new();
  let evaluator = Evaluator::new(&index, &analysis);

  let mut hypothesis = Hypothesis::new("Date").with_truth("When was this issued?");
  let err = evaluator.evaluate(&mut hypothesis).await.unwrap_err();

  assert!(matches!(err, EvalError::NoGroundTruth { .. }));
  assert_eq!(analysis.calls().await, 0);
  assert!(hypothesis.responses().is_none());
}
