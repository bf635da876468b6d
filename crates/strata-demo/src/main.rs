//! Headless driver for the strata terrain streamer.
//!
//! Configuration is loaded from `terrain.ron` and can be overridden via CLI flags.
//! The observer flies a fixed path for `--ticks` updates while chunks stream in
//! around it. Run with `cargo run -p strata-demo -- --preview origin.png` to
//! also export the origin chunk.

mod preview;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use glam::Vec2;
use strata_config::{CliArgs, Config, default_config_dir};
use strata_mesh::MeshData;
use strata_stream::{
    ChunkCoord, ChunkStreamer, StreamSettings, TerrainGenerator, TerrainSink,
    lod_spec_from_config,
};
use strata_terrain::MapData;
use tracing::{debug, error, info};

/// Observer speed in world units per tick.
const OBSERVER_SPEED: f32 = 12.0;
const TICK: Duration = Duration::from_millis(16);
const STATS_EVERY: u32 = 60;

/// Sink standing in for a renderer: counts hand-offs and logs them.
#[derive(Debug, Default)]
struct LoggingSink {
    textures: usize,
    mesh_swaps: usize,
    shown: usize,
    hidden: usize,
}

impl TerrainSink for LoggingSink {
    fn map_ready(&mut self, coord: ChunkCoord, data: &MapData) {
        self.textures += 1;
        debug!(?coord, size = data.size(), "colour texture ready");
    }

    fn mesh_ready(&mut self, coord: ChunkCoord, lod_index: usize, mesh: &Arc<MeshData>) {
        self.mesh_swaps += 1;
        debug!(
            ?coord,
            lod_index,
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "mesh swapped in"
        );
    }

    fn visibility_changed(&mut self, coord: ChunkCoord, visible: bool) {
        if visible {
            self.shown += 1;
        } else {
            self.hidden += 1;
        }
        debug!(?coord, visible, "visibility changed");
    }
}

/// Observer position at `tick`: a straight run east with a gentle weave.
fn observer_path(tick: u32) -> Vec2 {
    let t = tick as f32;
    Vec2::new(t * OBSERVER_SPEED, (t * 0.02).sin() * 300.0)
}

fn main() {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().unwrap_or_else(|| {
        default_config_dir().unwrap_or_else(|e| {
            eprintln!("{e}, using the working directory");
            PathBuf::from(".")
        })
    });

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    strata_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    if let Err(e) = run(&config, &args) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(config: &Config, args: &CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    let generator = Arc::new(TerrainGenerator::from_config(config)?);
    let lod = lod_spec_from_config(&config.lod, generator.map_chunk_size() - 1)?;
    let settings = StreamSettings::from_config(&config.streaming);

    if let Some(path) = &args.preview {
        preview::write_preview(
            &generator,
            config.debug.draw_mode,
            config.mesh.preview_lod,
            path,
        )?;
    }

    let mut streamer = ChunkStreamer::new(generator, lod, settings, LoggingSink::default())?;

    for tick in 0..args.ticks {
        streamer.update(observer_path(tick));
        if tick % STATS_EVERY == 0 {
            let stats = streamer.stats();
            info!(
                tick,
                observer = ?streamer.observer(),
                known = stats.chunks_known,
                visible = stats.chunks_visible,
                meshes = stats.meshes_cached,
                in_flight = stats.jobs_in_flight,
                "streaming"
            );
        }
        std::thread::sleep(TICK);
    }

    let stats = streamer.stats();
    let sink = streamer.sink();
    info!(
        ticks = args.ticks,
        known = stats.chunks_known,
        visible = stats.chunks_visible,
        maps = stats.maps_ready,
        meshes = stats.meshes_cached,
        failed = stats.failed_jobs,
        scans = stats.scans,
        textures = sink.textures,
        mesh_swaps = sink.mesh_swaps,
        shown = sink.shown,
        hidden = sink.hidden,
        "run finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observer_path_starts_at_origin() {
        assert_eq!(observer_path(0), Vec2::ZERO);
        assert!(observer_path(100).x > observer_path(99).x);
    }

    #[test]
    fn test_short_run_with_defaults() {
        let mut config = Config::default();
        config.mesh.map_chunk_size = 97;
        config.noise.octaves = 2;
        config.lod.levels.truncate(2);
        let args = CliArgs {
            ticks: 3,
            ..Default::default()
        };
        run(&config, &args).unwrap();
    }
}
