//! # Block Module
//!
//! This module provides the core block-related functionality for the sector world.
//! It includes block type definitions, the six face directions, and the compact block
//! value stored inside sectors.

use block_side::BlockSide;
use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// Maps each block type to its corresponding texture indices for each face.
///
/// The outer array is indexed by `BlockType` as a `usize`.
/// The inner array contains 6 texture indices, one for each face in `BlockSide` order:
/// [Front, Back, Bottom, Top, Left, Right]
pub static BLOCK_TYPE_TO_TEXTURE_INDICES: [[usize; 6]; 11] = [
    [0, 0, 0, 0, 0, 0],    // BEDROCK
    [1, 1, 1, 1, 1, 1],    // STONE
    [2, 2, 2, 2, 2, 2],    // WATER
    [3, 3, 3, 3, 3, 3],    // SAND
    [4, 4, 4, 4, 4, 4],    // DIRT
    [5, 5, 4, 6, 5, 5],    // GRASS (top: 6, bottom: dirt, sides: 5)
    [7, 7, 4, 8, 7, 7],    // TUNDRA (top: 8, bottom: dirt, sides: 7)
    [8, 8, 8, 8, 8, 8],    // SNOW
    [9, 9, 10, 10, 9, 9],  // WOOD (rings on top and bottom)
    [11, 11, 11, 11, 11, 11], // LEAVES
    [12, 12, 12, 12, 12, 12], // CLOUD
];

/// Represents a single voxel block in the world.
///
/// Blocks are value-like: two blocks of the same type are interchangeable. The position
/// of a block is not part of the value, it is the key it is stored under.
///
/// # Memory Layout
/// The `#[repr(C)]` attribute ensures a consistent memory layout for GPU interoperability.
/// The block type is stored as a compact `BlockTypeSize` for memory efficiency.
#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct Block {
    /// The type of this block, encoded as a `BlockTypeSize` for compact storage.
    pub block_type: BlockTypeSize,
}

impl Block {
    /// Creates a new block of the specified type.
    pub fn new(block_type: BlockType) -> Self {
        Block {
            block_type: block_type as BlockTypeSize,
        }
    }

    /// The decoded kind of this block.
    pub fn kind(&self) -> BlockType {
        BlockType::get_block_type_from_int(self.block_type)
    }

    /// Gets the texture indices for all faces of this block, in `BlockSide` order.
    pub fn texture_indices(&self) -> [usize; 6] {
        BLOCK_TYPE_TO_TEXTURE_INDICES[self.block_type as usize]
    }

    /// Texture index of a single face.
    pub fn texture_index(&self, side: BlockSide) -> usize {
        self.texture_indices()[side as usize]
    }
}

impl From<BlockType> for Block {
    fn from(block_type: BlockType) -> Self {
        Block::new(block_type)
    }
}
