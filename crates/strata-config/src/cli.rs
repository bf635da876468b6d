//! Command-line argument parsing for the strata demo.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Strata terrain streamer command-line arguments.
///
/// Override values replace settings loaded from `terrain.ron`; `ticks` and
/// `preview` only control the demo run.
#[derive(Parser, Debug, Default)]
#[command(name = "strata", about = "Infinite procedural terrain streamer")]
pub struct CliArgs {
    /// World seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of noise octaves.
    #[arg(long)]
    pub octaves: Option<u32>,

    /// Noise sampling scale.
    #[arg(long)]
    pub scale: Option<f32>,

    /// Enable or disable the island falloff mask.
    #[arg(long)]
    pub falloff: Option<bool>,

    /// Generation worker threads (0 = auto).
    #[arg(long)]
    pub workers: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of update ticks to simulate.
    #[arg(long, default_value_t = 240)]
    pub ticks: u32,

    /// Write a PNG preview of the origin chunk to this path.
    #[arg(long)]
    pub preview: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.noise.seed = seed;
        }
        if let Some(octaves) = args.octaves {
            self.noise.octaves = octaves;
        }
        if let Some(scale) = args.scale {
            self.noise.scale = scale;
        }
        if let Some(falloff) = args.falloff {
            self.falloff.enabled = falloff;
        }
        if let Some(workers) = args.workers {
            self.streaming.worker_threads = workers;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            seed: Some(99),
            falloff: Some(true),
            log_level: Some("debug".to_string()),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.noise.seed, 99);
        assert!(config.falloff.enabled);
        assert_eq!(config.debug.log_level, "debug");
        // Non-overridden fields retain defaults
        assert_eq!(config.noise.octaves, 5);
        assert_eq!(config.streaming.worker_threads, 0);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from([
            "strata",
            "--seed",
            "5",
            "--scale",
            "40.5",
            "--ticks",
            "10",
            "--preview",
            "out.png",
        ]);
        assert_eq!(args.seed, Some(5));
        assert_eq!(args.scale, Some(40.5));
        assert_eq!(args.ticks, 10);
        assert_eq!(args.preview, Some(PathBuf::from("out.png")));
        assert_eq!(args.octaves, None);
    }
}
