//! Configuration for gtscore.
//!
//! Config priority: explicit path > project-relative (.gtscore.toml) > user (~/.config/gtscore/config.toml)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File name of the project-relative config
pub const PROJECT_CONFIG_FILE: &str = ".gtscore.toml";

/// Manifest location relative to `<output path>/<job name>/`
pub const DEFAULT_MANIFEST_PATH: &str = "manifests/output/output.manifest";

// ============================================================================
// AWS Configuration
// ============================================================================

/// Overrides for the AWS SDK default credential and region chain
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
  /// Region (e.g. "us-east-1"). Falls back to AWS_REGION / the active profile.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub region: Option<String>,

  /// Named profile from ~/.aws/config
  #[serde(skip_serializing_if = "Option::is_none")]
  pub profile: Option<String>,
}

// ============================================================================
// Labeling Configuration
// ============================================================================

/// Ground truth labeling job settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelingConfig {
  /// Labeling job to read when `--job` is not given
  #[serde(skip_serializing_if = "Option::is_none")]
  pub job_name: Option<String>,

  /// Manifest path relative to `<output path>/<job name>/`
  pub manifest_path: String,
}

impl Default for LabelingConfig {
  fn default() -> Self {
    Self {
      job_name: None,
      manifest_path: DEFAULT_MANIFEST_PATH.to_string(),
    }
  }
}

// ============================================================================
// Report Configuration
// ============================================================================

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
  Json,
  Markdown,
}

/// Report output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
  /// Directory reports are written to
  pub output_dir: PathBuf,

  /// Formats written for each run
  pub formats: Vec<ReportFormat>,
}

impl Default for ReportConfig {
  fn default() -> Self {
    Self {
      output_dir: PathBuf::from("./gtscore-results"),
      formats: vec![ReportFormat::Json, ReportFormat::Markdown],
    }
  }
}

// ============================================================================
// Logging Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
  /// Log level: "off", "error", "warn", "info", "debug", "trace"
  /// Default: "info". RUST_LOG takes precedence.
  pub log_level: String,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      log_level: "info".to_string(),
    }
  }
}

// ============================================================================
// Main Configuration
// ============================================================================

/// gtscore configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// AWS client settings
  pub aws: AwsConfig,

  /// Labeling job settings
  pub labeling: LabelingConfig,

  /// Report output settings
  pub report: ReportConfig,

  /// Logging settings
  pub logging: LoggingConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Failed to read config {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to parse config {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },
}

impl Config {
  /// Load config from an explicit file. Errors are reported, not defaulted.
  pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Load config for a project directory, with fallback to user config
  pub fn load_for_project(project_path: &Path) -> Self {
    let project_config = Self::project_config_path(project_path);
    if project_config.exists()
      && let Ok(config) = Self::load_from(&project_config)
    {
      return config;
    }

    if let Some(user_config_path) = Self::user_config_path()
      && user_config_path.exists()
      && let Ok(config) = Self::load_from(&user_config_path)
    {
      return config;
    }

    Self::default()
  }

  /// Get the user-level config path
  pub fn user_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CONFIG_DIR") {
      return Some(PathBuf::from(path).join("config.toml"));
    }

    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
      return Some(PathBuf::from(path).join("gtscore").join("config.toml"));
    }

    dirs::config_dir().map(|p: PathBuf| p.join("gtscore").join("config.toml"))
  }

  /// Get the project-relative config path
  pub fn project_config_path(project_path: &Path) -> PathBuf {
    project_path.join(PROJECT_CONFIG_FILE)
  }

  /// Generate a default config file as a string
  pub fn generate_template() -> String {
    format!(
      r#"# gtscore configuration
# Place at ./{project_file} or ~/.config/gtscore/config.toml

[aws]
# Region and profile override the AWS SDK defaults (AWS_REGION, AWS_PROFILE)
# region = "us-east-1"
# profile = "default"

[labeling]
# Labeling job used when --job is not given
# job_name = "my-labeling-job"
# Manifest location relative to <output path>/<job name>/
manifest_path = "{manifest_path}"

[report]
output_dir = "./gtscore-results"
# Any of: "json", "markdown"
formats = ["json", "markdown"]

[logging]
# off, error, warn, info, debug, trace (RUST_LOG overrides)
log_level = "info"
"#,
      project_file = PROJECT_CONFIG_FILE,
      manifest_path = DEFAULT_MANIFEST_PATH,
    )
  }
}
