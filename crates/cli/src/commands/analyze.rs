//! Analyze command implementation - one pose file, full result

use anyhow::{Context as _, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;
use swing_analysis_cli::{load_poses, resolve_config, write_json, HandednessArg, Preset};
use swing_analysis_detection::SwingAnalyzer;
use tracing::info;

#[derive(Args)]
pub struct AnalyzeCommand {
    /// Pose sequence JSON file
    #[arg(value_name = "POSES")]
    input: PathBuf,

    /// Configuration file (JSON or YAML); overrides --preset
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Built-in configuration preset
    #[arg(long, value_enum, default_value = "default")]
    preset: Preset,

    /// Player handedness
    #[arg(long, value_enum)]
    handedness: Option<HandednessArg>,

    /// Output file for the result (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

impl AnalyzeCommand {
    pub fn execute(self) -> Result<()> {
        info!("=== Swing Analysis ===");
        info!("Input: {}", self.input.display());

        let config = resolve_config(self.config.as_deref(), self.preset, self.handedness)?;
        let poses = load_poses(&self.input)?;
        let analyzer = SwingAnalyzer::new(config).context("Failed to create analyzer")?;

        let start = Instant::now();
        let result = analyzer
            .analyze(&poses)
            .with_context(|| format!("Analysis failed: {}", self.input.display()))?;

        for (i, swing) in result.swings.iter().enumerate() {
            info!(
                "  #{} frame {} ({:.2}s): {} {:.1} km/h, confidence {:.0}%",
                i + 1,
                swing.contact_frame,
                swing.contact_timestamp,
                swing.swing_type,
                swing.peak_velocity_kmh,
                swing.confidence * 100.0
            );
        }
        info!(
            "Analyzed {} frames in {:.2}s",
            result.metadata.frame_count,
            start.elapsed().as_secs_f64()
        );

        write_json(&result, self.output.as_deref(), self.pretty)?;
        if let Some(output) = &self.output {
            info!("Result written to {}", output.display());
        }
        Ok(())
    }
}
