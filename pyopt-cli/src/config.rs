//! Configuration handling for the pyopt CLI

use anyhow::{Context, Result};
use pyopt_optimizer::{OptimizationConfig, OptimizationLevel, Rule};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub optimizer: OptimizerConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// `[optimizer]` table. Unset fields fall back to the level preset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptimizerConfig {
    #[serde(default)]
    pub level: Option<OptimizationLevel>,

    #[serde(default)]
    pub disabled_rules: Vec<Rule>,

    #[serde(default)]
    pub remove_unused_variables: Option<bool>,

    #[serde(default)]
    pub max_iterations: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Rendered source followed by the explanations
    Text,
    /// One response object per file
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    #[serde(default = "default_true")]
    pub show_explanations: bool,

    #[serde(default)]
    pub show_stats: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            show_explanations: default_true(),
            show_stats: false,
        }
    }
}

fn default_format() -> OutputFormat { OutputFormat::Text }
fn default_true() -> bool { true }

impl OptimizerConfig {
    /// Build the pipeline configuration; a level given on the command line
    /// wins over the configured one
    pub fn resolve(&self, cli_level: Option<u8>) -> OptimizationConfig {
        let level = cli_level
            .map(OptimizationLevel::from_number)
            .or(self.level)
            .unwrap_or(OptimizationLevel::Standard);

        let mut config = OptimizationConfig::for_level(level);
        config.disabled_rules.extend(self.disabled_rules.iter().copied());
        if let Some(remove) = self.remove_unused_variables {
            config.remove_unused_variables = remove;
        }
        if let Some(max) = self.max_iterations {
            config.max_iterations = max;
        }
        config
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

/// Load configuration from file or use defaults
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    if let Some(path) = path {
        read_config(&path)
    } else if let Some(home) = dirs::home_dir() {
        let default_path = home.join(".pyopt").join("config.toml");
        if default_path.exists() {
            read_config(&default_path)
        } else {
            Ok(Config::default())
        }
    } else {
        Ok(Config::default())
    }
}
