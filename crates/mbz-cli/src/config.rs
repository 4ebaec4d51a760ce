//! Configuration file support for `.mbz2zip.toml`
//!
//! Configuration files can be placed in:
//! - User home directory: `~/.mbz2zip.toml` (user defaults)
//! - Project directory: `./.mbz2zip.toml` (project defaults)
//!
//! Precedence order (highest to lowest):
//! 1. Command-line arguments
//! 2. Project config
//! 3. User config
//! 4. Built-in defaults

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".mbz2zip.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Default settings for the convert command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub convert: Option<ConvertConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Entry compression (deflated or stored)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression: Option<String>,

    /// Overwrite existing output files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force: Option<bool>,

    /// Directory for output archives when no explicit output is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content).map_err(|e| {
            eprintln!(
                "{} Failed to parse config file: {}",
                "Error:".red().bold(),
                path.display()
            );
            eprintln!("{} {}", "Parse error:".yellow().bold(), e);
            eprintln!();
            eprintln!("{} Configuration file syntax:", "Help:".cyan().bold());
            eprintln!("  [convert]");
            eprintln!("  compression = \"deflated\"  # deflated or stored");
            eprintln!("  force = false");
            eprintln!("  output_dir = \"converted\"");
            anyhow::anyhow!("Failed to parse config file: {e}")
        })
    }

    /// Find and load configuration files
    /// Returns (`user_config`, `project_config`)
    pub fn discover_configs() -> (Option<Self>, Option<Self>) {
        let user_config = dirs::home_dir()
            .and_then(|home| Self::load_optional(&home.join(CONFIG_FILE_NAME), "user"));
        let project_config = Self::load_optional(Path::new(CONFIG_FILE_NAME), "project");
        (user_config, project_config)
    }

    fn load_optional(path: &Path, kind: &str) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        match Self::load_from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!(
                    "{} Failed to load {kind} config from {}: {}",
                    "Warning:".yellow().bold(),
                    path.display(),
                    e
                );
                None
            }
        }
    }

    /// Merge configs with precedence: project config > user config > defaults
    pub fn merge(user_config: Option<Self>, project_config: Option<Self>) -> Self {
        let mut merged = ConvertConfig::default();

        for convert in [user_config, project_config]
            .into_iter()
            .flatten()
            .filter_map(|config| config.convert)
        {
            if let Some(compression) = convert.compression {
                merged.compression = Some(compression);
            }
            if let Some(force) = convert.force {
                merged.force = Some(force);
            }
            if let Some(output_dir) = convert.output_dir {
                merged.output_dir = Some(output_dir);
            }
        }

        Self {
            convert: Some(merged),
        }
    }

    /// Convert defaults, empty if no config set any
    pub fn convert_defaults(&self) -> ConvertConfig {
        self.convert.clone().unwrap_or_default()
    }
}
