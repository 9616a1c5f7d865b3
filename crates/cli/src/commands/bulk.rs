//! Bulk mode command implementation - many pose files, parallel processing

use anyhow::{Context as _, Result};
use clap::{Args, ValueEnum};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use swing_analysis_cli::{load_poses, resolve_config, result_path, write_json, Preset};
use swing_analysis_detection::{AnalysisResult, SwingAnalyzer};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable progress log
    Text,
    /// One JSON object per line
    Jsonl,
}

#[derive(Args)]
pub struct BulkCommand {
    /// Pose sequence JSON files
    #[arg(value_name = "FILES", required = true)]
    inputs: Vec<PathBuf>,

    /// Directory for `<stem>.swings.json` results (optional)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Configuration file (JSON or YAML); overrides --preset
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Built-in configuration preset
    #[arg(long, value_enum, default_value = "default")]
    preset: Preset,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl BulkCommand {
    pub fn execute(self) -> Result<()> {
        info!("=== Swing Analysis Bulk Mode ===");
        info!("Total input files: {}", self.inputs.len());

        let valid_inputs: Vec<&PathBuf> = self
            .inputs
            .iter()
            .filter(|path| {
                if path.exists() {
                    true
                } else {
                    warn!("Skipping non-existent file: {}", path.display());
                    false
                }
            })
            .collect();

        if valid_inputs.is_empty() {
            anyhow::bail!("No valid input files found");
        }
        info!("Valid input files: {}", valid_inputs.len());

        if let Some(dir) = &self.output_dir {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        }

        let config = resolve_config(self.config.as_deref(), self.preset, None)?;
        let analyzer = SwingAnalyzer::new(config).context("Failed to create analyzer")?;

        let output_jsonl = self.format == OutputFormat::Jsonl;
        let completed = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);
        let swings = AtomicUsize::new(0);
        let total_files = valid_inputs.len();
        let start_time = Instant::now();

        valid_inputs.par_iter().for_each(|input| {
            let file_start = Instant::now();
            let outcome = self.process(&analyzer, input);
            let completed_count = completed.fetch_add(1, Ordering::SeqCst) + 1;

            match outcome {
                Ok(result) => {
                    swings.fetch_add(result.swings.len(), Ordering::SeqCst);
                    if output_jsonl {
                        println!(
                            "{}",
                            serde_json::json!({
                                "type": "success",
                                "file": input.display().to_string(),
                                "processing_time_ms": file_start.elapsed().as_millis(),
                                "frames": result.metadata.frame_count,
                                "swings": result.swings.len(),
                                "summary": result.summary,
                            })
                        );
                    } else {
                        info!(
                            "✓ [{}/{}] {} - {} swings, {:.2}s",
                            completed_count,
                            total_files,
                            input.display(),
                            result.swings.len(),
                            file_start.elapsed().as_secs_f64()
                        );
                    }
                }
                Err(error) => {
                    failed.fetch_add(1, Ordering::SeqCst);
                    if output_jsonl {
                        println!(
                            "{}",
                            serde_json::json!({
                                "type": "error",
                                "file": input.display().to_string(),
                                "error": format!("{error:#}"),
                            })
                        );
                    } else {
                        warn!(
                            "✗ [{}/{}] {} - FAILED: {:#}",
                            completed_count,
                            total_files,
                            input.display(),
                            error
                        );
                    }
                }
            }
        });

        let total_time = start_time.elapsed();
        let completed_count = completed.load(Ordering::SeqCst);
        let failed_count = failed.load(Ordering::SeqCst);
        let swing_count = swings.load(Ordering::SeqCst);
        let throughput = completed_count as f64 / total_time.as_secs_f64().max(f64::EPSILON);

        if output_jsonl {
            println!(
                "{}",
                serde_json::json!({
                    "type": "summary",
                    "total_files": total_files,
                    "completed": completed_count,
                    "failed": failed_count,
                    "swings": swing_count,
                    "total_time_s": total_time.as_secs_f64(),
                    "throughput_files_per_sec": throughput,
                })
            );
        } else {
            info!("=== Bulk Analysis Complete ===");
            info!("Total files: {}", total_files);
            info!("Completed: {}", completed_count);
            info!("Failed: {}", failed_count);
            info!("Swings detected: {}", swing_count);
            info!("Total time: {:.2}s", total_time.as_secs_f64());
            info!("Throughput: {:.2} files/sec", throughput);
        }

        Ok(())
    }

    fn process(&self, analyzer: &SwingAnalyzer, input: &Path) -> Result<AnalysisResult> {
        let poses = load_poses(input)?;
        let result = analyzer
            .analyze(&poses)
            .with_context(|| format!("Analysis failed: {}", input.display()))?;
        if let Some(dir) = &self.output_dir {
            write_json(&result, Some(result_path(dir, input).as_path()), false)?;
        }
        Ok(result)
    }
}
