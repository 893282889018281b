//! CLI command implementations

mod compare;
mod config;
mod evaluate;
mod queries;

use std::path::Path;

use anyhow::{Context, Result, bail};
pub use compare::cmd_compare;
pub use config::{cmd_config_init, cmd_config_show};
pub use evaluate::cmd_evaluate;
use eval::{GroundTruthIndex, GroundTruthSource};
use gtscore_core::Config;
pub use queries::cmd_queries;
use services::Services;

/// Load the config from `--config`, or from the project/user lookup chain
pub fn load_config(path: Option<&Path>) -> Result<Config> {
  match path {
    Some(path) => Config::load_from(path).with_context(|| format!("loading config {}", path.display())),
    None => {
      let cwd = std::env::current_dir()?;
      Ok(Config::load_for_project(&cwd))
    }
  }
}

/// Job from the command line, falling back to `labeling.job_name`
fn resolve_job<'a>(config: &'a Config, job: Option<&'a str>) -> Result<&'a str> {
  match job.or(config.labeling.job_name.as_deref()) {
    Some(job) if !job.trim().is_empty() => Ok(job),
    _ => bail!("No labeling job given. Pass --job <name> or set labeling.job_name in the config."),
  }
}

/// Connect to the services and build the ground truth index for a job
async fn open_session(config: &Config, job: &str) -> Result<(Services, GroundTruthIndex)> {
  let services = services::create_services(&config.aws)
    .await
    .context("creating service clients")?;

  let source = GroundTruthSource::new(services.labeling.as_ref(), services.store.as_ref()).with_config(&config.labeling);
  let index = GroundTruthIndex::build(job, &source)
    .await
    .with_context(|| format!("building ground truth index for job '{}'", job))?;

  Ok((services, index))
}

/// File-name friendly run name derived from the query
fn run_name(query: &str, name: Option<&str>) -> String {
  if let Some(name) = name {
    return name.to_string();
  }

  let slug: String = query
    .chars()
    .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
    .collect();
  let slug = slug
    .split('-')
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join("-");

  if slug.is_empty() { "evaluation".to_string() } else { slug }
}
