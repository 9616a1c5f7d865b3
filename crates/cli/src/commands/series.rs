//! Series command implementation - one metric as chart points

use anyhow::{Context as _, Result};
use clap::Args;
use std::path::PathBuf;
use swing_analysis_cli::parser::{parse_frame_range, parse_series_spec};
use swing_analysis_cli::{load_poses, resolve_config, write_json, Preset};
use swing_analysis_detection::SwingAnalyzer;
use tracing::info;

#[derive(Args)]
pub struct SeriesCommand {
    /// Pose sequence JSON file
    #[arg(value_name = "POSES")]
    input: PathBuf,

    /// Series to extract: metric[:part[:side]]
    /// Metrics: velocity, velocity_kmh, acceleration, angle, orientation, rotation, x_factor, swing_score
    /// Examples: --select velocity_kmh:wrist:right, --select angle:knee, --select x_factor
    #[arg(short, long, default_value = "velocity_kmh")]
    select: String,

    /// Frame range, e.g. "120..300", "120..", "..300"
    #[arg(long)]
    frames: Option<String>,

    /// Raw instead of smoothed values
    #[arg(long)]
    raw: bool,

    /// Configuration file (JSON or YAML); overrides --preset
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Built-in configuration preset
    #[arg(long, value_enum, default_value = "default")]
    preset: Preset,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

impl SeriesCommand {
    pub fn execute(self) -> Result<()> {
        let mut query = parse_series_spec(&self.select).context("Failed to parse --select")?;
        if let Some(frames) = &self.frames {
            let range = parse_frame_range(frames).context("Failed to parse --frames")?;
            query = query.frames(range.start, range.end);
        }
        if self.raw {
            query = query.raw();
        }

        let config = resolve_config(self.config.as_deref(), self.preset, None)?;
        let poses = load_poses(&self.input)?;
        let result = SwingAnalyzer::new(config)
            .context("Failed to create analyzer")?
            .analyze(&poses)
            .with_context(|| format!("Analysis failed: {}", self.input.display()))?;

        let points = result.series(&query).context("Invalid series selection")?;
        info!(
            "{} points of {:?} ({} known)",
            points.len(),
            query.metric,
            points.iter().filter(|p| p.value.is_some()).count()
        );
        write_json(&points, self.output.as_deref(), self.pretty)
    }
}
