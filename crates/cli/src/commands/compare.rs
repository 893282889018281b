//! Rank several phrasings of a query

use std::path::Path;

use anyhow::{Context, Result};
use eval::{Evaluator, generate_comparison_reports};
use gtscore_core::Config;
use tracing::info;

use super::{open_session, resolve_job, run_name};

pub async fn cmd_compare(
  config: &Config,
  job: Option<&str>,
  query: &str,
  truths: &[String],
  json_output: bool,
  output: Option<&Path>,
  name: Option<&str>,
) -> Result<()> {
  let job = resolve_job(config, job)?;
  let (services, index) = open_session(config, job).await?;

  let evaluator = Evaluator::new(&index, services.analysis.as_ref());
  let comparison = evaluator
    .compare(query, truths)
    .await
    .with_context(|| format!("comparing phrasings of query '{}'", query))?;

  if let Some(output_dir) = output {
    let written = generate_comparison_reports(
      &comparison,
      Some(job),
      output_dir,
      &run_name(query, name),
      &config.report.formats,
    )
    .await?;
    info!(reports = written.len(), dir = %output_dir.display(), "Reports written");
  }

  if json_output {
    println!("{}", serde_json::to_string_pretty(&comparison)?);
    return Ok(());
  }

  println!("Query: {}", comparison.query);
  println!();
  println!("{:>4}  {:>7}  {:>6}  Phrasing", "Rank", "Mean", "Exact");
  for (rank, phrasing) in comparison.ranked.iter().enumerate() {
    println!(
      "{:>4}  {:>6.1}%  {:>6}  {}",
      rank + 1,
      phrasing.mean_score * 100.0,
      phrasing.exact_matches,
      phrasing.phrasing
    );
  }

  if let Some(best) = comparison.best() {
    println!();
    println!("Best: {:?} ({:.1}%)", best.phrasing, best.mean_score * 100.0);
    if comparison.ranked.len() > 1 {
      println!("Spread between best and worst: {:.1} points", comparison.spread() * 100.0);
    }
  }

  Ok(())
}
