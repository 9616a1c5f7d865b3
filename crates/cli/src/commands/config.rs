//! Config command implementation - print a configuration

use anyhow::{Context as _, Result};
use clap::Args;
use swing_analysis_cli::{ConfigFormat, Preset};

#[derive(Args)]
pub struct ConfigCommand {
    /// Preset to print
    #[arg(long, value_enum, default_value = "default")]
    preset: Preset,

    /// Output format
    #[arg(long, value_enum, default_value = "yaml")]
    format: ConfigFormat,
}

impl ConfigCommand {
    pub fn execute(self) -> Result<()> {
        let config = self.preset.config();
        let text = match self.format {
            ConfigFormat::Yaml => {
                serde_yaml::to_string(&config).context("Failed to serialize config")?
            }
            ConfigFormat::Json => {
                serde_json::to_string_pretty(&config).context("Failed to serialize config")?
            }
        };
        println!("{}", text.trim_end());
        Ok(())
    }
}
