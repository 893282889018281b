//! List the queries of a labeling job

use anyhow::Result;
use gtscore_core::Config;
use serde_json::json;

use super::{open_session, resolve_job};

pub async fn cmd_queries(config: &Config, job: Option<&str>, json_output: bool) -> Result<()> {
  let job = resolve_job(config, job)?;
  let (_services, index) = open_session(config, job).await?;

  let stats = index.stats();
  let queries = index.query_stats();

  if json_output {
    let output = json!({
      "job_name": job,
      "stats": stats,
      "queries": queries,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    return Ok(());
  }

  println!("Labeling job: {}", job);
  println!(
    "{} records, {} documents, {} labels ({} without ground truth text)",
    stats.records, stats.documents, stats.labels, stats.missing_truths
  );
  println!();

  if queries.is_empty() {
    println!("No labeled queries found.");
    return Ok(());
  }

  let width = queries.iter().map(|q| q.query.len()).max().unwrap_or(5).max(5);
  println!("{:<width$}  {:>9}  {:>8}", "Query", "Documents", "No truth", width = width);
  for query in &queries {
    println!(
      "{:<width$}  {:>9}  {:>8}",
      query.query,
      query.documents,
      query.missing_truths,
      width = width
    );
  }

  Ok(())
}
