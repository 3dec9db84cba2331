//! Command-line interface.
use std::path::PathBuf;

use clap::Parser;

use crate::config::ViewerConfig;
use crate::errors::Result;

#[derive(Parser, Debug, Clone)]
#[command(name = "dancehall")]
#[command(about = "Animated character stage viewer", long_about = None)]
pub struct Cli {
    /// JSON config file; built-in defaults are used when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory holding the models and the sky image (overrides the config)
    #[arg(short, long)]
    pub assets: Option<PathBuf>,

    /// Start with the music already playing
    #[arg(long)]
    pub play: bool,
}

impl Cli {
    /// Builds the effective config: file (or defaults) plus command-line overrides.
    pub fn resolve_config(&self) -> Result<ViewerConfig> {
        let mut config = match &self.config {
            Some(path) => ViewerConfig::load(path)?,
            None => ViewerConfig::default(),
        };

        if let Some(dir) = &self.assets {
            config.assets.directory.clone_from(dir);
        }
        if self.play {
            config.start_playing = true;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let cli = Cli::parse_from(["dancehall", "--assets", "stage", "--play"]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.assets.directory, PathBuf::from("stage"));
        assert!(config.start_playing);
    }

    #[test]
    fn no_flags_means_defaults() {
        let cli = Cli::parse_from(["dancehall"]);
        assert_eq!(cli.resolve_config().unwrap(), ViewerConfig::default());
    }
}
