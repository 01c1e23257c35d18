//! Vertex data structures for block drawables.
//!
//! Every shown block is drawn as an axis-aligned cube of 24 vertices: four per face,
//! in `BlockSide` order, each face carrying the texture index the block type maps to.

use cgmath::Point3;

use crate::engine_state::voxels::block::{block_side::BlockSide, Block};

/// Half the edge length of a drawn block.
pub const BLOCK_HALF_EXTENT: f32 = 0.5;

/// Number of vertices in one cube.
pub const CUBE_VERTEX_COUNT: usize = 24;

/// Corner signs of each face, counter-clockwise seen from outside, indexed by `BlockSide`.
const FACE_CORNERS: [[[f32; 3]; 4]; 6] = [
    // FRONT (+Z)
    [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]],
    // BACK (-Z)
    [[1.0, -1.0, -1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0]],
    // BOTTOM (-Y)
    [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]],
    // TOP (+Y)
    [[-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0]],
    // LEFT (-X)
    [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]],
    // RIGHT (+X)
    [[1.0, -1.0, 1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0]],
];

/// Texture coordinates of the four corners of a face.
const FACE_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// A vertex of a block drawable.
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
/// - Texture Index: u32 (4 bytes)
///
/// Total size: 24 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in world space
    pub position: [f32; 3],
    /// UV texture coordinates (normalized 0.0-1.0)
    pub tex_coords: [f32; 2],
    /// Index of the texture in the texture array
    pub texture_index: u32,
}

impl Vertex {
    pub fn new(position: [f32; 3], tex_coords: [f32; 2], texture_index: usize) -> Self {
        Vertex {
            position,
            tex_coords,
            texture_index: texture_index as u32,
        }
    }
}

/// Builds the 24 vertices of the cube of half-extent `half_extent` centred on `position`.
pub fn cube_vertices(
    position: Point3<i32>,
    half_extent: f32,
    block: &Block,
) -> [Vertex; CUBE_VERTEX_COUNT] {
    let center = [position.x as f32, position.y as f32, position.z as f32];
    let mut vertices = [Vertex::new([0.0; 3], [0.0; 2], 0); CUBE_VERTEX_COUNT];

    for side in BlockSide::all() {
        let texture_index = block.texture_index(side);
        let corners = &FACE_CORNERS[side as usize];
        for (corner_index, corner) in corners.iter().enumerate() {
            let corner_position = [
                center[0] + corner[0] * half_extent,
                center[1] + corner[1] * half_extent,
                center[2] + corner[2] * half_extent,
            ];
            vertices[side as usize * 4 + corner_index] =
                Vertex::new(corner_position, FACE_UVS[corner_index], texture_index);
        }
    }

    vertices
}
