//! Configuration system for the strata terrain streamer.
//!
//! Provides the externally supplied generation settings (noise, falloff, biome
//! bands, mesh, LOD table, streaming) as RON files with serde defaults. Supports
//! CLI overrides via clap and hot-reload detection.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    BiomeBandConfig, BiomeConfig, Config, DebugConfig, DrawMode, FalloffConfig, FalloffShape,
    LodConfig, LodLevelConfig, MeshConfig, NoiseConfig, NormalizeMode, StreamingConfig,
    default_config_dir,
};
pub use error::ConfigError;
