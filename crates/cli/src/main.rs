//! gtscore CLI - score query phrasings against labeling job ground truth

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod logging;

use commands::{cmd_compare, cmd_config_init, cmd_config_show, cmd_evaluate, cmd_queries, load_config};
use logging::init_cli_logging;

#[derive(Parser)]
#[command(name = "gtscore")]
#[command(about = "Score document query phrasings against labeling job ground truth")]
#[command(after_help = "\
QUICK START:
  gtscore config init                           # Create ./.gtscore.toml
  gtscore queries --job invoices                # List labeled queries
  gtscore evaluate --job invoices --query Vendor --truth \"Who is the vendor?\"

COMPARING PHRASINGS:
  gtscore compare --job invoices --query Vendor \\
    --truth \"Who is the vendor?\" --truth \"What company issued this?\"")]
struct Cli {
  /// Log at debug level
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Config file (default: ./.gtscore.toml, then the user config)
  #[arg(long, global = true, value_name = "FILE")]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

/// Subcommands for `gtscore config`
#[derive(Subcommand)]
pub enum ConfigCommand {
  /// Show the effective configuration
  Show,
  /// Create a project config file in the current directory
  Init {
    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
  },
}

#[derive(Subcommand)]
enum Commands {
  /// Build the ground truth index and list its queries
  Queries {
    /// Labeling job name (default: labeling.job_name from config)
    #[arg(short, long)]
    job: Option<String>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
  },
  /// Evaluate one phrasing of a query
  Evaluate {
    /// Labeling job name (default: labeling.job_name from config)
    #[arg(short, long)]
    job: Option<String>,
    /// Ground truth query (label) to evaluate
    #[arg(short, long)]
    query: String,
    /// Phrasing sent to the analysis service (default: the query itself)
    #[arg(short, long)]
    truth: Option<String>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
    /// Write reports to this directory
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Report file name without extension (default: derived from the query)
    #[arg(long)]
    name: Option<String>,
  },
  /// Evaluate several phrasings of a query and rank them
  Compare {
    /// Labeling job name (default: labeling.job_name from config)
    #[arg(short, long)]
    job: Option<String>,
    /// Ground truth query (label) to evaluate
    #[arg(short, long)]
    query: String,
    /// Phrasing to test; repeat for each candidate
    #[arg(short, long = "truth", required = true)]
    truths: Vec<String>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
    /// Write reports to this directory
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Report file name without extension (default: derived from the query)
    #[arg(long)]
    name: Option<String>,
  },
  /// Manage configuration
  Config {
    #[command(subcommand)]
    command: ConfigCommand,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  let config = load_config(cli.config.as_deref())?;
  init_cli_logging(&config.logging.log_level, cli.verbose);

  match cli.command {
    Commands::Queries { job, json } => cmd_queries(&config, job.as_deref(), json).await,
    Commands::Evaluate {
      job,
      query,
      truth,
      json,
      output,
      name,
    } => {
      cmd_evaluate(
        &config,
        job.as_deref(),
        &query,
        truth.as_deref(),
        json,
        output.as_deref(),
        name.as_deref(),
      )
      .await
    }
    Commands::Compare {
      job,
      query,
      truths,
      json,
      output,
      name,
    } => cmd_compare(&config, job.as_deref(), &query, &truths, json, output.as_deref(), name.as_deref()).await,
    Commands::Config { command } => match command {
      ConfigCommand::Show => cmd_config_show(&config, cli.config.as_deref()).await,
      ConfigCommand::Init { force } => cmd_config_init(force).await,
    },
  }
}
