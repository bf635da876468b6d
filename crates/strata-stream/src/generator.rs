//! Shared terrain generation service used by every background job.

use std::sync::Arc;

use glam::Vec2;
use strata_config::{BiomeConfig, Config, NoiseConfig};
use strata_mesh::{HeightCurve, KeyframeCurve, LinearCurve, MeshData, MeshError, build_terrain_mesh};
use strata_terrain::{
    BiomeBand, BiomeTable, FalloffShape, MapData, MapDataBuilder, NoiseParams, NormalizeMode,
};
use tracing::{info, warn};

use crate::error::SetupError;

/// Height multiplier used when the configured one is not positive.
const MIN_HEIGHT_MULTIPLIER: f32 = 0.001;

/// Immutable generation settings plus the map and mesh pipelines.
///
/// Held behind an `Arc` and read concurrently by all workers.
pub struct TerrainGenerator {
    map: MapDataBuilder,
    height_multiplier: f32,
    curve: Arc<dyn HeightCurve>,
}

impl std::fmt::Debug for TerrainGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerrainGenerator")
            .field("map_chunk_size", &self.map.size())
            .field("height_multiplier", &self.height_multiplier)
            .finish_non_exhaustive()
    }
}

impl TerrainGenerator {
    pub fn new(map: MapDataBuilder, height_multiplier: f32, curve: Arc<dyn HeightCurve>) -> Self {
        Self {
            map,
            height_multiplier,
            curve,
        }
    }

    /// Build a generator from configuration.
    ///
    /// Cheap fixes (scale, lacunarity, persistence, height multiplier) are
    /// applied with a warning. Broken biome tables, undersized chunks and
    /// invalid height curves are returned as errors.
    pub fn from_config(config: &Config) -> Result<Self, SetupError> {
        let size = config.mesh.map_chunk_size;
        if size < 2 {
            return Err(SetupError::ChunkSize(size as usize));
        }

        let params = noise_params_from_config(&config.noise);
        let biomes = biome_table_from_config(&config.biomes)?;

        let curve: Arc<dyn HeightCurve> = if config.mesh.height_curve.is_empty() {
            Arc::new(LinearCurve)
        } else {
            let curve = KeyframeCurve::new(config.mesh.height_curve.clone())?;
            if !curve.is_monotonic() {
                warn!("height curve is not monotonic, terrain heights may invert");
            }
            Arc::new(curve)
        };

        let mut height_multiplier = config.mesh.height_multiplier;
        if !(height_multiplier > 0.0 && height_multiplier.is_finite()) {
            warn!(
                configured = height_multiplier,
                used = MIN_HEIGHT_MULTIPLIER,
                "height multiplier must be positive"
            );
            height_multiplier = MIN_HEIGHT_MULTIPLIER;
        }

        let falloff = config.falloff.enabled.then_some(match config.falloff.shape {
            strata_config::FalloffShape::Square => FalloffShape::Square,
            strata_config::FalloffShape::Radial => FalloffShape::Radial,
        });

        info!(
            size,
            seed = params.seed,
            octaves = params.octaves,
            falloff = ?falloff,
            biome_bands = biomes.len(),
            "terrain generator ready"
        );

        Ok(Self::new(
            MapDataBuilder::new(size as usize, params, falloff, biomes),
            height_multiplier,
            curve,
        ))
    }

    /// Noise, falloff and biome pass for the chunk centred on `center`.
    pub fn generate_map_data(&self, center: Vec2) -> MapData {
        self.map.build(center)
    }

    /// Tessellate a chunk's heights at `lod`.
    pub fn generate_mesh(&self, data: &MapData, lod: u8) -> Result<MeshData, MeshError> {
        build_terrain_mesh(&data.heights, self.height_multiplier, self.curve.as_ref(), lod)
    }

    /// Vertices per map edge.
    pub fn map_chunk_size(&self) -> usize {
        self.map.size()
    }

    /// World-space chunk edge: one less than the vertex count, so neighbours
    /// share their border row.
    pub fn chunk_world_size(&self) -> f32 {
        self.map.size().saturating_sub(1) as f32
    }

    pub fn height_multiplier(&self) -> f32 {
        self.height_multiplier
    }

    pub fn map_builder(&self) -> &MapDataBuilder {
        &self.map
    }
}

fn noise_params_from_config(config: &NoiseConfig) -> NoiseParams {
    let requested = NoiseParams {
        seed: config.seed,
        scale: config.scale,
        octaves: config.octaves,
        persistence: config.persistence,
        lacunarity: config.lacunarity,
        offset: Vec2::from(config.offset),
        normalize_mode: match config.normalize_mode {
            strata_config::NormalizeMode::Local => NormalizeMode::Local,
            strata_config::NormalizeMode::Global => NormalizeMode::Global,
        },
    };
    let params = requested.sanitized();

    if params.scale != requested.scale {
        warn!(configured = requested.scale, used = params.scale, "noise scale must be positive");
    }
    if params.lacunarity != requested.lacunarity {
        warn!(
            configured = requested.lacunarity,
            used = params.lacunarity,
            "noise lacunarity must be greater than 1"
        );
    }
    if params.persistence != requested.persistence {
        warn!(
            configured = requested.persistence,
            used = params.persistence,
            "noise persistence must lie in [0, 1]"
        );
    }
    if params.octaves == 0 {
        warn!("noise has zero octaves, every chunk will be flat");
    }
    params
}

fn biome_table_from_config(config: &BiomeConfig) -> Result<BiomeTable, SetupError> {
    let bands = config
        .bands
        .iter()
        .map(|band| BiomeBand::new(band.name.clone(), band.threshold, band.color))
        .collect();
    Ok(BiomeTable::new(bands)?)
}
