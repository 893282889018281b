//! Evaluate one phrasing of a query

use std::path::Path;

use anyhow::{Context, Result};
use eval::{Evaluation, Evaluator, Hypothesis, generate_reports};
use gtscore_core::Config;
use tracing::info;

use super::{open_session, resolve_job, run_name};

pub async fn cmd_evaluate(
  config: &Config,
  job: Option<&str>,
  query: &str,
  truth: Option<&str>,
  json_output: bool,
  output: Option<&Path>,
  name: Option<&str>,
) -> Result<()> {
  let job = resolve_job(config, job)?;
  let (services, index) = open_session(config, job).await?;

  let mut hypothesis = Hypothesis::new(query).with_truth(truth.unwrap_or(query));
  let evaluator = Evaluator::new(&index, services.analysis.as_ref());
  let evaluation = evaluator
    .evaluate(&mut hypothesis)
    .await
    .with_context(|| format!("evaluating query '{}'", query))?;

  if let Some(output_dir) = output {
    let written = generate_reports(
      &evaluation,
      Some(job),
      output_dir,
      &run_name(query, name),
      &config.report.formats,
    )
    .await?;
    info!(reports = written.len(), dir = %output_dir.display(), "Reports written");
  }

  if json_output {
    println!("{}", serde_json::to_string_pretty(&evaluation)?);
  } else {
    print_evaluation(&evaluation);
  }

  Ok(())
}

pub(super) fn print_evaluation(evaluation: &Evaluation) {
  println!("Query:    {}", evaluation.query);
  println!("Phrasing: {}", evaluation.truth);
  println!(
    "Mean:     {:.1}% over {} document(s) ({} without ground truth)",
    evaluation.mean_score * 100.0,
    evaluation.scored(),
    evaluation.unscored()
  );
  println!();

  for result in &evaluation.results {
    let score = result
      .score
      .map(|s| format!("{:>6.1}%", s * 100.0))
      .unwrap_or_else(|| "   N/A ".to_string());
    println!("{} {}", score, result.document);
    println!("        predicted: {:?}", result.predicted);
    match &result.truth {
      Some(truth) => println!("        truth:     {:?}", truth),
      None => println!("        truth:     (none)"),
    }
  }
}
