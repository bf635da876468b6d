//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name used inside the config directory.
pub const CONFIG_FILE_NAME: &str = "terrain.ron";

/// Top-level terrain configuration.
///
/// Every section is optional in the file; missing sections and fields fall back
/// to their defaults. Values are validated when the generator is built, not here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Fractal noise settings.
    pub noise: NoiseConfig,
    /// Island falloff mask settings.
    pub falloff: FalloffConfig,
    /// Biome band table.
    pub biomes: BiomeConfig,
    /// Height grid and mesh settings.
    pub mesh: MeshConfig,
    /// Level-of-detail distance table.
    pub lod: LodConfig,
    /// Chunk streaming settings.
    pub streaming: StreamingConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// How raw fractal noise is rescaled into `[0, 1]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NormalizeMode {
    /// Rescale by the observed min/max of each generated grid.
    Local,
    /// Rescale by the theoretical amplitude bound, continuous across chunks.
    Global,
}

/// Shape of the falloff mask.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FalloffShape {
    Square,
    Radial,
}

/// Which artifact the preview export writes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DrawMode {
    /// Greyscale height map.
    NoiseMap,
    /// Biome colour map.
    ColorMap,
    /// Colour map plus a mesh built at the preview LOD.
    Mesh,
}

/// Fractal noise configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NoiseConfig {
    /// World seed.
    pub seed: u64,
    /// Sampling scale in world units. Values `<= 0` are coerced to a tiny positive value.
    pub scale: f32,
    /// Number of octaves.
    pub octaves: u32,
    /// Amplitude decay per octave, in `[0, 1]`.
    pub persistence: f32,
    /// Frequency growth per octave. Values `<= 1` are coerced to the default.
    pub lacunarity: f32,
    /// Planar offset added to every sample position.
    pub offset: [f32; 2],
    /// Normalisation mode.
    pub normalize_mode: NormalizeMode,
}

/// Falloff mask configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FalloffConfig {
    /// Subtract the mask from every generated height grid.
    pub enabled: bool,
    /// Mask profile.
    pub shape: FalloffShape,
}

/// One biome band: heights up to and including `threshold` use this band.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BiomeBandConfig {
    pub name: String,
    pub threshold: f32,
    /// RGBA display colour.
    pub color: [u8; 4],
}

/// Biome band table, sorted by ascending threshold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BiomeConfig {
    pub bands: Vec<BiomeBandConfig>,
}

/// Height grid and mesh configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeshConfig {
    /// Vertices per chunk edge. `size - 1` must be divisible by every LOD step.
    pub map_chunk_size: u32,
    /// Vertical scale applied after the height curve.
    pub height_multiplier: f32,
    /// Height curve keyframes as `(time, value)` pairs. Empty means identity.
    pub height_curve: Vec<(f32, f32)>,
    /// LOD used by the preview export in [`DrawMode::Mesh`].
    pub preview_lod: u8,
}

/// One LOD table entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LodLevelConfig {
    /// Decimation factor; the mesh vertex step is `lod * 2` (or 1 for LOD 0).
    pub lod: u8,
    /// Maximum edge distance at which this level is used.
    pub visible_distance: f32,
}

/// LOD distance table. The last threshold is the maximum view distance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LodConfig {
    pub levels: Vec<LodLevelConfig>,
}

/// Chunk streaming configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamingConfig {
    /// Distance the observer must move before the visible set is rescanned.
    pub viewer_move_threshold: f32,
    /// Generation worker threads. 0 picks a default from the CPU count.
    pub worker_threads: u32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Artifact written by the preview export.
    pub draw_mode: DrawMode,
}

// --- Default implementations ---

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            scale: 25.0,
            octaves: 5,
            persistence: 0.6,
            lacunarity: 1.8,
            offset: [0.0, 0.0],
            normalize_mode: NormalizeMode::Global,
        }
    }
}

impl Default for FalloffConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            shape: FalloffShape::Square,
        }
    }
}

impl Default for BiomeConfig {
    fn default() -> Self {
        let band = |name: &str, threshold: f32, color: [u8; 4]| BiomeBandConfig {
            name: name.to_string(),
            threshold,
            color,
        };
        Self {
            bands: vec![
                band("deep_water", 0.3, [40, 64, 160, 255]),
                band("shallow_water", 0.43, [56, 96, 200, 255]),
                band("sand", 0.45, [210, 208, 125, 255]),
                band("grass", 0.55, [86, 152, 23, 255]),
                band("forest", 0.7, [62, 107, 18, 255]),
                band("rock", 0.8, [90, 69, 60, 255]),
                band("high_rock", 0.9, [75, 60, 53, 255]),
                band("snow", 1.0, [255, 255, 255, 255]),
            ],
        }
    }
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            map_chunk_size: 241,
            height_multiplier: 2.0,
            height_curve: Vec::new(),
            preview_lod: 0,
        }
    }
}

impl Default for LodConfig {
    fn default() -> Self {
        let level = |lod: u8, visible_distance: f32| LodLevelConfig {
            lod,
            visible_distance,
        };
        Self {
            levels: vec![level(0, 200.0), level(1, 400.0), level(4, 600.0)],
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            viewer_move_threshold: 25.0,
            worker_threads: 0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            draw_mode: DrawMode::ColorMap,
        }
    }
}

/// Platform config directory for strata (`<config_dir>/strata`).
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("strata"))
        .ok_or(ConfigError::NoConfigDir)
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded terrain config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default terrain config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `terrain.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(false)
            .enumerate_arrays(false);

        let serialized = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&config_path, serialized).map_err(|source| ConfigError::Write {
            path: config_path,
            source,
        })
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE_NAME))?;

        if &new_config != self {
            log::info!("Terrain config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
