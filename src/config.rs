use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::exif::{Decoder, DEFAULT_EXECUTABLE};

/// File name looked up next to the binary when no config path is given.
const CONFIG_FILE_NAME: &str = "config.json";

/// Top-level configuration for exiftool-decode.
///
/// Names the `exiftool` executable and controls how results are reported.
/// Every field has a default, so a config file only needs the keys it changes:
///
/// ```json
/// { "exiftool": { "path": "/opt/exiftool/exiftool" } }
/// ```
///
/// # Loading
///
/// ```rust,no_run
/// use exiftool_decode::config::Config;
///
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
/// let decoder = config.decoder();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which `exiftool` to run.
    pub exiftool: ExiftoolConfig,
    /// Output behavior.
    pub output: OutputConfig,
}

/// Location of the external `exiftool` program.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExiftoolConfig {
    /// Executable path, or a bare name resolved through `PATH`.
    pub path: String,
}

impl Default for ExiftoolConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_EXECUTABLE.to_string(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// If `true`, print results as JSON instead of a table.
    pub json: bool,
}

impl Config {
    /// Default config location: `config.json` beside the running binary.
    pub fn config_path() -> Result<PathBuf> {
        let exe = std::env::current_exe().context("Failed to locate the running executable")?;
        let dir = exe
            .parent()
            .context("Executable path has no parent directory")?;
        Ok(dir.join(CONFIG_FILE_NAME))
    }

    /// Read the config at `path` (or [`Config::config_path`]).
    ///
    /// A missing file yields the defaults. A blank `exiftool.path` is reset to
    /// `exiftool` so the decoder always has something to run.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = resolve(path)?;

        let mut config = match std::fs::read_to_string(&config_path) {
            Ok(contents) => serde_json::from_str::<Config>(&contents)
                .with_context(|| format!("Failed to parse config file {}", config_path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!(
                    "No config at {}; using exiftool from PATH",
                    config_path.display()
                );
                Config::default()
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read config file {}", config_path.display())
                });
            }
        };

        if config.exiftool.path.trim().is_empty() {
            log::warn!("Empty exiftool.path in config; falling back to {DEFAULT_EXECUTABLE}");
            config.exiftool.path = DEFAULT_EXECUTABLE.to_string();
        }

        log::debug!("Using exiftool at {}", config.exiftool.path);
        Ok(config)
    }

    /// Write the config as pretty JSON to `path` (or [`Config::config_path`]).
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = resolve(path)?;
        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config file {}", config_path.display()))?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Build a [`Decoder`] for the configured executable.
    pub fn decoder(&self) -> Decoder {
        Decoder::with_executable(&self.exiftool.path)
    }
}

fn resolve(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(p) => Ok(p.to_path_buf()),
        None => Config::config_path(),
    }
}
