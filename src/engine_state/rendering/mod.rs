//! Rendering seam of the sector world.
//!
//! The world model never draws anything itself. It asks a [`BlockRenderer`] to create
//! one drawable per shown block and to destroy it again when the block is hidden, and
//! keeps the returned handles. A GPU backend implements the trait by uploading
//! [`cube_vertices`]; [`HeadlessRenderer`] keeps the meshes in memory instead.

use std::collections::{HashMap, HashSet};

use cgmath::Point3;

use super::voxels::block::Block;

mod vertex;

// Re-export commonly used types
pub use vertex::{cube_vertices, Vertex, BLOCK_HALF_EXTENT, CUBE_VERTEX_COUNT};

/// Creates and destroys the drawable of a single block.
pub trait BlockRenderer {
    /// Opaque reference to a created drawable.
    type Handle;

    /// Creates the drawable of `block` at `position`.
    fn create(&mut self, position: Point3<i32>, block: Block) -> Self::Handle;

    /// Releases a drawable previously returned by `create`.
    fn destroy(&mut self, handle: Self::Handle);
}

/// Mesh of one block kept by the headless renderer.
#[derive(Clone, Debug)]
pub struct BlockMesh {
    pub position: Point3<i32>,
    pub block: Block,
    pub vertices: [Vertex; CUBE_VERTEX_COUNT],
}

/// A renderer that builds meshes without any graphics device.
///
/// Used by the headless driver and by tests to observe exactly which blocks the world
/// model asked to draw.
#[derive(Default)]
pub struct HeadlessRenderer {
    meshes: HashMap<u64, BlockMesh>,
    next_handle: u64,
    created: usize,
    destroyed: usize,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live drawables.
    pub fn live_count(&self) -> usize {
        self.meshes.len()
    }

    /// Total number of `create` calls so far.
    pub fn created(&self) -> usize {
        self.created
    }

    /// Total number of `destroy` calls so far.
    pub fn destroyed(&self) -> usize {
        self.destroyed
    }

    /// Positions of all live drawables.
    pub fn positions(&self) -> HashSet<Point3<i32>> {
        self.meshes.values().map(|mesh| mesh.position).collect()
    }

    pub fn meshes(&self) -> impl Iterator<Item = &BlockMesh> {
        self.meshes.values()
    }

    /// Size of the vertex data of all live drawables, in bytes.
    pub fn vertex_bytes(&self) -> usize {
        self.meshes
            .values()
            .map(|mesh| bytemuck::cast_slice::<Vertex, u8>(&mesh.vertices).len())
            .sum()
    }
}

impl BlockRenderer for HeadlessRenderer {
    type Handle = u64;

    fn create(&mut self, position: Point3<i32>, block: Block) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.created += 1;
        self.meshes.insert(
            handle,
            BlockMesh {
                position,
                block,
                vertices: cube_vertices(position, BLOCK_HALF_EXTENT, &block),
            },
        );
        handle
    }

    fn destroy(&mut self, handle: u64) {
        if self.meshes.remove(&handle).is_some() {
            self.destroyed += 1;
        } else {
            log::warn!("Destroying unknown drawable {}", handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    #[test]
    fn test_headless_renderer_tracks_drawables() {
        let mut renderer = HeadlessRenderer::new();
        let a = renderer.create(Point3::new(0, 0, 0), BlockType::STONE.into());
        let b = renderer.create(Point3::new(1, 0, 0), BlockType::DIRT.into());
        assert_ne!(a, b);
        assert_eq!(renderer.live_count(), 2);
        assert_eq!(renderer.vertex_bytes(), 2 * CUBE_VERTEX_COUNT * 24);

        renderer.destroy(a);
        assert_eq!(renderer.live_count(), 1);
        assert_eq!(renderer.positions(), HashSet::from([Point3::new(1, 0, 0)]));
        assert_eq!((renderer.created(), renderer.destroyed()), (2, 1));
    }
}
