//! Render configuration — optional ~/.stepwave/render.yaml for the command-line renderer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::sample::KIT_SAMPLE_RATE;

/// Errors from reading a configuration file.
#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Yaml(serde_yaml::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Yaml(e) => write!(f, "invalid config YAML: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Yaml(e)
    }
}

/// Settings the renderer binary reads at startup.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RenderConfig {
    /// Rate the kit is resampled to and the output is written at.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Where to write the WAV when no output path is given.
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_sample_rate() -> u32 {
    KIT_SAMPLE_RATE
}

fn default_output() -> PathBuf {
    PathBuf::from("beat.wav")
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            output: default_output(),
        }
    }
}

/// Default path for the render config.
pub fn default_config_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".stepwave");
    path.push("render.yaml");
    path
}

/// Load a render config from a YAML file. Returns defaults if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<RenderConfig, ConfigError> {
    if !path.exists() {
        return Ok(RenderConfig::default());
    }
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(RenderConfig::default());
    }
    Ok(serde_yaml::from_str(&content)?)
}
