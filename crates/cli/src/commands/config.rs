//! Config commands

use std::path::Path;

use anyhow::{Result, bail};
use gtscore_core::Config;

/// Show the effective configuration
pub async fn cmd_config_show(config: &Config, explicit: Option<&Path>) -> Result<()> {
  let cwd = std::env::current_dir()?;
  let project_config = Config::project_config_path(&cwd);
  let user_config = Config::user_config_path();

  if let Some(path) = explicit {
    println!("Using config: {:?}", path);
  } else if project_config.exists() {
    println!("Using project config: {:?}", project_config);
  } else if let Some(ref user_path) = user_config
    && user_path.exists()
  {
    println!("Using user config: {:?}", user_path);
  } else {
    println!("Using default configuration (no config file found)");
  }
  println!();

  println!("{}", toml::to_string_pretty(config)?);
  Ok(())
}

/// Create `.gtscore.toml` in the current directory
pub async fn cmd_config_init(force: bool) -> Result<()> {
  let cwd = std::env::current_dir()?;
  let config_path = Config::project_config_path(&cwd);

  if config_path.exists() && !force {
    bail!(
      "Config file already exists: {:?}. Pass --force to overwrite it.",
      config_path
    );
  }

  tokio::fs::write(&config_path, Config::generate_template()).await?;

  println!("Created project config: {:?}", config_path);
  println!("Edit the file to set your labeling job and AWS region.");
  Ok(())
}
