// Selector Configuration
// Defaults for the patch selector, read from the repository or home directory

use crate::error::{ServiceError, ServiceResult};
use crate::utils::resolve_working_dir;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Config file looked up at the repository root
pub const CONFIG_FILE_NAME: &str = ".patchsel.yml";

/// How closure results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(ServiceError::Config(format!(
                "unknown output format '{}' (expected text or json)",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Configuration for the patch selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Project definition file (default: project.yml)
    pub project: PathBuf,

    /// Output format for closure results
    pub format: OutputFormat,

    /// Whether to list excluded pairs and the reason they were dropped
    pub show_excluded: bool,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            project: PathBuf::from("project.yml"),
            format: OutputFormat::Text,
            show_excluded: false,
        }
    }
}

impl SelectorConfig {
    /// Load from `.patchsel.yml` at the repository root, then
    /// `~/.patchsel/config.yml`, falling back to defaults
    pub fn load() -> ServiceResult<Self> {
        Self::load_from(&resolve_working_dir(), dirs::home_dir().as_deref())
    }

    pub fn load_from(repo_root: &Path, home: Option<&Path>) -> ServiceResult<Self> {
        let repo_config = repo_root.join(CONFIG_FILE_NAME);
        if repo_config.is_file() {
            let mut config = Self::from_file(&repo_config)?;
            if config.project.is_relative() {
                config.project = repo_root.join(&config.project);
            }
            return Ok(config);
        }

        if let Some(home) = home {
            let user_config = home.join(".patchsel").join("config.yml");
            if user_config.is_file() {
                return Self::from_file(&user_config);
            }
        }

        tracing::debug!("no selector config found, using defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> ServiceResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| {
            ServiceError::Config(format!("invalid config {}: {}", path.display(), e))
        })?;

        tracing::debug!(path = %path.display(), "loaded selector config");
        Ok(config)
    }
}
