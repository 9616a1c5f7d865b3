//! Shared plumbing for the `swing-analyze` command line tool
//!
//! Loading pose files and configurations, and writing results.

pub mod parser;

use anyhow::{Context as _, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use swing_analysis_common::Handedness;
use swing_analysis_detection::AnalysisConfig;
use swing_analysis_pose::PoseSequence;
use tracing::debug;

/// Built-in configuration presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Preset {
    #[default]
    Default,
    /// Lower thresholds for slow or partial shots
    Sensitive,
    /// Higher thresholds for noisy footage
    Strict,
}

impl Preset {
    #[must_use]
    pub fn config(self) -> AnalysisConfig {
        match self {
            Preset::Default => AnalysisConfig::default(),
            Preset::Sensitive => AnalysisConfig::sensitive(),
            Preset::Strict => AnalysisConfig::strict(),
        }
    }
}

/// Handedness flag values
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HandednessArg {
    Left,
    Right,
}

impl From<HandednessArg> for Handedness {
    fn from(arg: HandednessArg) -> Self {
        match arg {
            HandednessArg::Left => Handedness::Left,
            HandednessArg::Right => Handedness::Right,
        }
    }
}

/// Serialization format for configuration dumps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ConfigFormat {
    #[default]
    Yaml,
    Json,
}

/// Parse a configuration document.
///
/// YAML for `.yaml`/`.yml` files, JSON otherwise. Missing fields take their
/// default values.
pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    let config: AnalysisConfig = if is_yaml {
        serde_yaml::from_str(&text)
            .with_context(|| format!("Invalid YAML config: {}", path.display()))?
    } else {
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid JSON config: {}", path.display()))?
    };
    debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Resolve the effective configuration.
///
/// A config file wins over the preset; the handedness flag overrides both.
pub fn resolve_config(
    path: Option<&Path>,
    preset: Preset,
    handedness: Option<HandednessArg>,
) -> Result<AnalysisConfig> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => preset.config(),
    };
    if let Some(handedness) = handedness {
        config.handedness = handedness.into();
    }
    config.validate().context("Configuration rejected")?;
    Ok(config)
}

/// Read a pose sequence from a JSON file
pub fn load_poses(path: &Path) -> Result<PoseSequence> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read pose file: {}", path.display()))?;
    PoseSequence::from_json_str(&text)
        .with_context(|| format!("Invalid pose file: {}", path.display()))
}

/// Serialize `value` as JSON to `output`, or to stdout when `None`
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Failed to serialize output")?;

    match output {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("Failed to write output file: {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").context("Failed to write to stdout")
        }
    }
}

/// Result path for `input` inside `dir`: `<dir>/<stem>.swings.json`
#[must_use]
pub fn result_path(dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "poses".into(), |s| s.to_string_lossy());
    dir.join(format!("{stem}.swings.json"))
}
