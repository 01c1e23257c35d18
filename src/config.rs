//! # Configuration
//!
//! Immutable settings for terrain generation and the world model, built once (from
//! defaults or a JSON document) and handed to the generator and world at construction.
//!
//! Every generation stage is selected by a tagged variant instead of a boolean flag, so
//! a stage that is switched off carries no parameters at all:
//!
//! ```json
//! {
//!   "generator": {
//!     "floor_y": -2,
//!     "enclosure": { "kind": "open" },
//!     "terrain": { "kind": "flat", "block": "GRASS" },
//!     "clouds": { "kind": "clear" },
//!     "trees": { "kind": "bare" }
//!   }
//! }
//! ```

use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine_state::voxels::block::block_type::BlockType;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Unbreakable floor and perimeter walls around the playable area.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Enclosure {
    /// No enclosure, the world extends without limit.
    Open,
    /// A bedrock floor covering `|x|, |z| <= half_size` and walls `height` blocks high
    /// on its perimeter.
    Walled { half_size: i32, height: i32 },
}

/// Shape of the ground.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Terrain {
    /// A single layer of `block` at the floor height.
    Flat { block: BlockType },
    /// Height-mapped columns picked from the biome table; `frequency` is the noise
    /// wavelength in blocks.
    Biomes { frequency: f64 },
}

/// Cloud layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Clouds {
    /// Blue sky.
    Clear,
    /// Clouds at `height` wherever the remapped noise is below `density`
    /// (0 means blue sky, 1 a white one).
    Layer { density: f64, height: i32, frequency: f64 },
}

/// Tree scattering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trees {
    Bare,
    /// Up to `max_per_sector` trees per sector.
    Scattered { max_per_sector: usize },
}

/// Parameters of the default coherent-noise source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseConfig {
    pub seed: u32,
    pub octaves: usize,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self { seed: 0, octaves: 4 }
    }
}

/// Settings of the terrain generation pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Height of the floor plane; terrain columns are stacked above it.
    pub floor_y: i32,
    pub enclosure: Enclosure,
    pub terrain: Terrain,
    pub clouds: Clouds,
    pub trees: Trees,
    pub noise: NoiseConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            floor_y: -2,
            enclosure: Enclosure::Walled {
                half_size: 80,
                height: 12,
            },
            terrain: Terrain::Biomes { frequency: 38.0 },
            clouds: Clouds::Layer {
                density: 0.35,
                height: 20,
                frequency: 20.0,
            },
            trees: Trees::Scattered { max_per_sector: 3 },
            noise: NoiseConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// A flat, open world with no decoration. Mostly useful for tests.
    pub fn flat(block: BlockType) -> Self {
        Self {
            enclosure: Enclosure::Open,
            terrain: Terrain::Flat { block },
            clouds: Clouds::Clear,
            trees: Trees::Bare,
            ..Self::default()
        }
    }
}

/// Top level configuration of the world model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub generator: GeneratorConfig,
    /// Wall-clock budget of one `process_queue` call, in milliseconds.
    pub queue_budget_ms: f64,
    /// Radius, in sectors, of the region shown around the focus.
    pub render_distance: i32,
    /// Default reach of hit tests, in blocks.
    pub hit_test_distance: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            queue_budget_ms: 1000.0 / 60.0,
            render_distance: 2,
            hit_test_distance: 8,
        }
    }
}

impl WorldConfig {
    /// Parses a configuration from a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that parse but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if Duration::try_from_secs_f64(self.queue_budget_ms.max(0.0) / 1000.0).is_err() {
            return Err(ConfigError::Invalid {
                field: "queue_budget_ms",
                reason: format!("{} ms is not a representable duration", self.queue_budget_ms),
            });
        }
        Ok(())
    }

    /// Reads and parses the JSON configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&contents)?;
        log::info!("Loaded world configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// The per-tick queue budget as a `Duration`.
    ///
    /// Budgets too large for a `Duration` saturate to `Duration::MAX`.
    pub fn queue_budget(&self) -> Duration {
        Duration::try_from_secs_f64(self.queue_budget_ms.max(0.0) / 1000.0)
            .unwrap_or(Duration::MAX)
    }
}
