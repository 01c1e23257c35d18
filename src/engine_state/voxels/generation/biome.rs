//! # Biome Table
//!
//! Ordered lookup from a noise-derived index to a terrain column. Low indices are water,
//! then sand, grass, dirt and finally snowy peaks, so smooth noise produces beaches
//! between seas and meadows.

use crate::engine_state::voxels::block::block_type::BlockType;

use BlockType::{DIRT, GRASS, SAND, SNOW, TUNDRA, WATER};

/// One entry of the biome table.
#[derive(Debug, PartialEq)]
pub struct Biome {
    /// Number of blocks stacked above the floor.
    pub height: i32,
    /// Column composition, listed bottom to top. The last entry is the surface and the
    /// first one fills every cell below the listed layers.
    pub layers: &'static [BlockType],
}

impl Biome {
    const fn new(height: i32, layers: &'static [BlockType]) -> Self {
        Biome { height, layers }
    }

    /// Block at `depth` cells below the top of the column (0 is the surface).
    pub fn block_at_depth(&self, depth: usize) -> BlockType {
        if depth < self.layers.len() {
            self.layers[self.layers.len() - 1 - depth]
        } else {
            self.layers[0]
        }
    }

    /// The surface block of the column.
    pub fn surface(&self) -> BlockType {
        self.block_at_depth(0)
    }
}

pub static BIOME_TABLE: [Biome; 31] = [
    Biome::new(1, &[WATER]),
    Biome::new(1, &[WATER]),
    Biome::new(1, &[WATER]),
    Biome::new(1, &[WATER]),
    Biome::new(1, &[WATER]),
    Biome::new(1, &[WATER]),
    Biome::new(1, &[SAND]),
    Biome::new(1, &[SAND]),
    Biome::new(2, &[SAND]),
    Biome::new(1, &[SAND]),
    Biome::new(1, &[SAND]),
    Biome::new(1, &[GRASS]),
    Biome::new(1, &[GRASS]),
    Biome::new(2, &[DIRT, GRASS]),
    Biome::new(2, &[DIRT, GRASS]),
    Biome::new(3, &[DIRT, GRASS]),
    Biome::new(4, &[DIRT, GRASS]),
    Biome::new(4, &[DIRT, GRASS]),
    Biome::new(5, &[DIRT, GRASS]),
    Biome::new(5, &[DIRT, GRASS]),
    Biome::new(6, &[DIRT, GRASS]),
    Biome::new(6, &[DIRT, GRASS]),
    Biome::new(7, &[DIRT]),
    Biome::new(8, &[DIRT]),
    Biome::new(9, &[DIRT]),
    Biome::new(10, &[DIRT, TUNDRA]),
    Biome::new(11, &[DIRT, TUNDRA, SNOW]),
    Biome::new(12, &[DIRT, TUNDRA, SNOW, SNOW]),
    Biome::new(13, &[DIRT, TUNDRA, SNOW, SNOW]),
    Biome::new(14, &[DIRT, TUNDRA, SNOW, SNOW]),
    Biome::new(15, &[DIRT, TUNDRA, SNOW, SNOW]),
];

/// Tallest column the table can produce.
pub const MAX_BIOME_HEIGHT: i32 = 15;

/// Maps a noise sample in [-1, 1] to an index into `BIOME_TABLE`.
pub fn biome_index(noise_value: f64) -> usize {
    let len = BIOME_TABLE.len();
    let index = ((noise_value + 1.0) * 0.5 * len as f64).floor();
    if index < 0.0 || index.is_nan() {
        0
    } else {
        (index as usize).min(len - 1)
    }
}

/// Looks up the biome for a noise sample.
pub fn lookup_biome(noise_value: f64) -> &'static Biome {
    &BIOME_TABLE[biome_index(noise_value)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_is_clamped() {
        assert_eq!(biome_index(-1.0), 0);
        assert_eq!(biome_index(-3.0), 0);
        assert_eq!(biome_index(1.0), BIOME_TABLE.len() - 1);
        assert_eq!(biome_index(0.0), 15);
    }

    #[test]
    fn test_gradient_runs_from_water_to_snow() {
        assert_eq!(lookup_biome(-1.0).surface(), WATER);
        assert_eq!(lookup_biome(1.0).surface(), SNOW);
        assert_eq!(
            BIOME_TABLE.iter().map(|b| b.height).max(),
            Some(MAX_BIOME_HEIGHT)
        );
    }

    #[test]
    fn test_layers_fill_top_down() {
        let peak = lookup_biome(1.0);
        assert_eq!(peak.height, 15);
        assert_eq!(peak.block_at_depth(0), SNOW);
        assert_eq!(peak.block_at_depth(1), SNOW);
        assert_eq!(peak.block_at_depth(2), TUNDRA);
        assert_eq!(peak.block_at_depth(3), DIRT);
        assert_eq!(peak.block_at_depth(14), DIRT);
    }
}
