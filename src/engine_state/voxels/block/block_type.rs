//! # Block Type Module
//!
//! This module defines the different kinds of blocks that terrain generation can place.
//! It provides functionality for block type identification, conversion from the compact
//! storage format, and the classification helpers used by the generator.

use num_derive::FromPrimitive;
use serde::{Deserialize, Serialize};

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// The discriminant of each variant is the value stored in [`super::Block`] and the
/// row used in the texture lookup table, so the order must not change.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive, Serialize, Deserialize)]
pub enum BlockType {
    /// Unbreakable block used for the enclosure floor and walls.
    BEDROCK,

    /// Plain stone.
    STONE,

    /// Water surface, generated in the lowest biomes.
    WATER,

    /// Beach sand.
    SAND,

    /// Bare dirt.
    DIRT,

    /// Dirt with a grass top.
    GRASS,

    /// Dirt with a snow top, between grassland and peaks.
    TUNDRA,

    /// Packed snow on the highest peaks.
    SNOW,

    /// Tree trunk.
    WOOD,

    /// Tree foliage.
    LEAVES,

    /// Cloud layer block.
    CLOUD,
}

impl BlockType {
    /// Converts a `BlockTypeSize` to a `BlockType`.
    ///
    /// # Panics
    /// Panics if the input value doesn't correspond to a valid `BlockType`.
    pub fn get_block_type_from_int(btype: BlockTypeSize) -> Self {
        let btype_option = num::FromPrimitive::from_u8(btype);
        btype_option.unwrap()
    }

    /// Returns `true` for surface kinds a tree may be planted on.
    pub fn supports_trees(&self) -> bool {
        matches!(self, BlockType::DIRT | BlockType::GRASS | BlockType::SAND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_round_trip_keeps_discriminant() {
        assert_eq!(BlockType::get_block_type_from_int(0), BlockType::BEDROCK);
        assert_eq!(
            BlockType::get_block_type_from_int(BlockType::CLOUD as BlockTypeSize),
            BlockType::CLOUD
        );
    }

    #[test]
    fn test_tree_soil() {
        assert!(BlockType::GRASS.supports_trees());
        assert!(BlockType::SAND.supports_trees());
        assert!(!BlockType::WATER.supports_trees());
        assert!(!BlockType::SNOW.supports_trees());
    }
}
