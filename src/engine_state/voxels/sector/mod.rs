//! # Sector Module
//!
//! This module provides the `Sector` struct: the block container for one cubic region of
//! the world, `SECTOR_SIZE` blocks along each axis.
//!
//! ## Occlusion Bookkeeping
//!
//! Besides the blocks themselves a sector maintains, incrementally on every mutation:
//! - `visible`: blocks with at least one empty face-adjacent position, judged as if the
//!   sector existed in isolation (positions outside the sector count as empty)
//! - `outline`: blocks lying on one of the six boundary planes
//! - `face_full_cache`: one bit per `BlockSide`, set while the whole boundary plane on
//!   that side is occupied
//!
//! The world model only has to re-examine outline blocks against neighbouring sectors,
//! and can skip neighbours hidden behind a full face entirely.
//!
//! ### Performance Characteristics
//! - **Block lookup**: O(1) hash lookup
//! - **Add / remove**: O(1) plus an O(SECTOR_SIZE²) plane scan when the block lies on a
//!   boundary plane that is not already known to be full
//! - **Face-full query**: O(1) bit test

use std::collections::{HashMap, HashSet};

use bitvec::array::BitArray;
use cgmath::Point3;

use super::block::block_side::{iter_neighbors, BlockSide};
use super::block::Block;

/// The dimension (width, height, depth) of a sector in blocks.
pub const SECTOR_SIZE: i32 = 16;
/// The number of blocks in a single boundary plane of a sector (SECTOR_SIZE²).
pub const SECTOR_PLANE_SIZE: i32 = SECTOR_SIZE * SECTOR_SIZE;

/// Returns the coordinates of the sector owning the block at `position`.
///
/// Floor division, so negative positions land in negative sectors.
pub fn sectorize(position: Point3<i32>) -> Point3<i32> {
    Point3::new(
        position.x.div_euclid(SECTOR_SIZE),
        position.y.div_euclid(SECTOR_SIZE),
        position.z.div_euclid(SECTOR_SIZE),
    )
}

/// A `SECTOR_SIZE`³ region of blocks together with its exposure bookkeeping.
///
/// A sector is created empty by the terrain generator, filled through `add_block`, and
/// then handed to the world model as a whole.
#[derive(Clone, Debug)]
pub struct Sector {
    /// The position of this sector in sector coordinates (not block coordinates).
    position: Point3<i32>,
    /// Smallest block position (included) of this sector.
    min_block: Point3<i32>,
    /// Largest block position (excluded) of this sector.
    max_block: Point3<i32>,
    /// Location and kind of the blocks in this sector.
    blocks: HashMap<Point3<i32>, Block>,
    /// Blocks exposed if this sector is looked at alone.
    visible: HashSet<Point3<i32>>,
    /// Blocks on one of the six boundary planes.
    outline: HashSet<Point3<i32>>,
    /// Bit `side as usize` is set while the boundary plane on `side` is fully occupied.
    face_full_cache: BitArray<[u8; 1]>,
}

impl Sector {
    /// Creates a new, completely empty sector.
    ///
    /// # Arguments
    /// * `position` - The sector coordinates of the new sector
    pub fn new(position: Point3<i32>) -> Self {
        Sector {
            position,
            min_block: Point3::new(
                position.x * SECTOR_SIZE,
                position.y * SECTOR_SIZE,
                position.z * SECTOR_SIZE,
            ),
            max_block: Point3::new(
                (position.x + 1) * SECTOR_SIZE,
                (position.y + 1) * SECTOR_SIZE,
                (position.z + 1) * SECTOR_SIZE,
            ),
            blocks: HashMap::new(),
            visible: HashSet::new(),
            outline: HashSet::new(),
            face_full_cache: BitArray::ZERO,
        }
    }

    /// The sector coordinates of this sector.
    pub fn position(&self) -> Point3<i32> {
        self.position
    }

    /// Smallest block position contained in this sector.
    pub fn min_block(&self) -> Point3<i32> {
        self.min_block
    }

    /// Block position one past the largest contained position on every axis.
    pub fn max_block(&self) -> Point3<i32> {
        self.max_block
    }

    pub fn blocks(&self) -> &HashMap<Point3<i32>, Block> {
        &self.blocks
    }

    pub fn visible(&self) -> &HashSet<Point3<i32>> {
        &self.visible
    }

    pub fn outline(&self) -> &HashSet<Point3<i32>> {
        &self.outline
    }

    /// Number of blocks stored in this sector.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// `true` if `position` lies inside this sector.
    pub fn contains(&self, position: Point3<i32>) -> bool {
        (0..3).all(|axis| self.min_block[axis] <= position[axis] && position[axis] < self.max_block[axis])
    }

    /// `true` if the horizontal plane at `y` crosses this sector.
    pub fn contains_y(&self, y: i32) -> bool {
        self.min_block.y <= y && y < self.max_block.y
    }

    /// `true` if the horizontal slab between `y_min` and `y_max` touches this sector.
    pub fn contains_y_range(&self, y_min: i32, y_max: i32) -> bool {
        self.min_block.y <= y_max && y_min <= self.max_block.y
    }

    /// Returns the block at `position`, if any.
    pub fn get_block(&self, position: Point3<i32>) -> Option<Block> {
        self.blocks.get(&position).copied()
    }

    /// `true` if a block is stored at `position`.
    pub fn has_block(&self, position: Point3<i32>) -> bool {
        self.blocks.contains_key(&position)
    }

    /// Checks whether the boundary plane on `side` is completely filled.
    pub fn is_face_full(&self, side: BlockSide) -> bool {
        self.face_full_cache[side as usize]
    }

    /// The sides whose boundary plane is currently completely filled.
    pub fn full_faces(&self) -> Vec<BlockSide> {
        BlockSide::all()
            .into_iter()
            .filter(|side| self.is_face_full(*side))
            .collect()
    }

    /// Coordinate, along `side.axis()`, of the boundary plane on `side`.
    pub fn boundary(&self, side: BlockSide) -> i32 {
        let axis = side.axis();
        if side.is_positive() {
            self.max_block[axis] - 1
        } else {
            self.min_block[axis]
        }
    }

    /// Iterates the outline blocks lying exactly on the boundary plane of `side`.
    pub fn blocks_from_face(&self, side: BlockSide) -> impl Iterator<Item = Point3<i32>> + '_ {
        let axis = side.axis();
        let plane = self.boundary(side);
        self.outline
            .iter()
            .copied()
            .filter(move |position| position[axis] == plane)
    }

    /// Stores `block` at `position`, replacing whatever was there.
    ///
    /// Positions outside this sector are ignored. Exposure of the block and of its
    /// neighbours inside this sector is re-evaluated, and the full-face cache is updated
    /// if the block lies on a boundary plane.
    pub fn add_block(&mut self, position: Point3<i32>, block: Block) {
        if !self.contains(position) {
            return;
        }

        self.blocks.insert(position, block);
        if self.exposed(position) {
            self.visible.insert(position);
        } else {
            self.visible.remove(&position);
        }
        self.check_neighbors(position);

        for axis in 0..3 {
            for positive in [false, true] {
                let side = BlockSide::from_axis(axis, positive);
                if position[axis] != self.boundary(side) {
                    continue;
                }
                self.outline.insert(position);
                if !self.is_face_full(side) && self.check_face_full(side) {
                    self.face_full_cache.set(side as usize, true);
                }
            }
        }
    }

    /// Removes the block at `position`.
    ///
    /// Returns the sides that were full before the removal and no longer are. Empty if
    /// nothing was stored at `position`.
    pub fn remove_block(&mut self, position: Point3<i32>) -> Vec<BlockSide> {
        if self.blocks.remove(&position).is_none() {
            return Vec::new();
        }
        self.visible.remove(&position);
        self.outline.remove(&position);
        self.check_neighbors(position);

        let discarded: Vec<BlockSide> = BlockSide::all()
            .into_iter()
            .filter(|side| self.is_face_full(*side) && position[side.axis()] == self.boundary(*side))
            .collect();
        for side in &discarded {
            self.face_full_cache.set(*side as usize, false);
        }
        discarded
    }

    /// Returns `false` if `position` is surrounded on all 6 sides by blocks of this sector.
    pub fn exposed(&self, position: Point3<i32>) -> bool {
        iter_neighbors(position).any(|(neighbor, _)| !self.has_block(neighbor))
    }

    /// Re-evaluates the exposure of the blocks surrounding `position`.
    ///
    /// Called after a block is added or removed at `position`.
    pub fn check_neighbors(&mut self, position: Point3<i32>) {
        for (neighbor, _) in iter_neighbors(position) {
            if !self.has_block(neighbor) {
                continue;
            }
            if self.exposed(neighbor) {
                self.visible.insert(neighbor);
            } else {
                self.visible.remove(&neighbor);
            }
        }
    }

    /// Scans the boundary plane on `side` for holes.
    fn check_face_full(&self, side: BlockSide) -> bool {
        let axis = side.axis();
        let axis2 = (axis + 1) % 3;
        let axis3 = (axis + 2) % 3;

        let mut position = self.min_block;
        position[axis] = self.boundary(side);
        for a2 in self.min_block[axis2]..self.max_block[axis2] {
            for a3 in self.min_block[axis3]..self.max_block[axis3] {
                position[axis2] = a2;
                position[axis3] = a3;
                if !self.blocks.contains_key(&position) {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    fn stone() -> Block {
        Block::new(BlockType::STONE)
    }

    /// Fills the whole boundary plane of `side`.
    fn fill_face(sector: &mut Sector, side: BlockSide) {
        let axis = side.axis();
        let axis2 = (axis + 1) % 3;
        let axis3 = (axis + 2) % 3;
        let mut position = sector.min_block();
        position[axis] = sector.boundary(side);
        for a2 in sector.min_block()[axis2]..sector.max_block()[axis2] {
            for a3 in sector.min_block()[axis3]..sector.max_block()[axis3] {
                position[axis2] = a2;
                position[axis3] = a3;
                sector.add_block(position, stone());
            }
        }
    }

    /// Recomputes `visible` from scratch and compares it with the incremental set.
    fn assert_occlusion_invariant(sector: &Sector) {
        for position in sector.blocks().keys() {
            let exposed = iter_neighbors(*position).any(|(n, _)| !sector.blocks().contains_key(&n));
            assert_eq!(sector.visible().contains(position), exposed, "at {:?}", position);
        }
        for position in sector.visible() {
            assert!(sector.blocks().contains_key(position));
        }
        for position in sector.outline() {
            assert!(sector.blocks().contains_key(position));
        }
    }

    fn assert_face_full_accurate(sector: &Sector) {
        for side in BlockSide::all() {
            assert_eq!(sector.is_face_full(side), sector.check_face_full(side), "{:?}", side);
        }
    }

    #[test]
    fn test_sectorize_floor_divides() {
        assert_eq!(sectorize(Point3::new(0, 0, 0)), Point3::new(0, 0, 0));
        assert_eq!(sectorize(Point3::new(15, 16, -1)), Point3::new(0, 1, -1));
        assert_eq!(sectorize(Point3::new(-16, -17, 31)), Point3::new(-1, -2, 1));
    }

    #[test]
    fn test_bounds_partition_space() {
        let sector = Sector::new(Point3::new(-1, 0, 2));
        assert_eq!(sector.min_block(), Point3::new(-16, 0, 32));
        assert_eq!(sector.max_block(), Point3::new(0, 16, 48));
        for position in [Point3::new(-16, 0, 32), Point3::new(-1, 15, 47), Point3::new(-5, 3, 40)] {
            assert!(sector.contains(position));
            assert_eq!(sectorize(position), sector.position());
        }
        assert!(!sector.contains(Point3::new(0, 0, 32)));
        assert!(!sector.contains(Point3::new(-16, 16, 32)));
    }

    #[test]
    fn test_add_block_outside_is_ignored() {
        let mut sector = Sector::new(Point3::new(0, 0, 0));
        sector.add_block(Point3::new(16, 0, 0), stone());
        sector.add_block(Point3::new(0, -1, 0), stone());
        assert!(sector.is_empty());
    }

    #[test]
    fn test_enclosed_block_is_not_visible() {
        let mut sector = Sector::new(Point3::new(0, 0, 0));
        let center = Point3::new(5, 5, 5);
        sector.add_block(center, stone());
        assert!(sector.visible().contains(&center));

        for (neighbor, _) in iter_neighbors(center) {
            sector.add_block(neighbor, stone());
        }
        assert!(!sector.visible().contains(&center));
        assert_occlusion_invariant(&sector);

        sector.remove_block(Point3::new(6, 5, 5));
        assert!(sector.visible().contains(&center));
        assert_occlusion_invariant(&sector);
    }

    #[test]
    fn test_outline_tracks_boundary_blocks() {
        let mut sector = Sector::new(Point3::new(0, 0, 0));
        sector.add_block(Point3::new(0, 4, 4), stone());
        sector.add_block(Point3::new(15, 15, 4), stone());
        sector.add_block(Point3::new(4, 4, 4), stone());
        assert_eq!(sector.outline().len(), 2);

        let left: Vec<_> = sector.blocks_from_face(BlockSide::LEFT).collect();
        assert_eq!(left, vec![Point3::new(0, 4, 4)]);
        assert_eq!(sector.blocks_from_face(BlockSide::TOP).count(), 1);
        assert_eq!(sector.blocks_from_face(BlockSide::RIGHT).count(), 1);
        assert_eq!(sector.blocks_from_face(BlockSide::FRONT).count(), 0);

        sector.remove_block(Point3::new(0, 4, 4));
        assert_eq!(sector.blocks_from_face(BlockSide::LEFT).count(), 0);
    }

    #[test]
    fn test_face_becomes_full_with_last_block() {
        let mut sector = Sector::new(Point3::new(1, 0, 0));
        fill_face(&mut sector, BlockSide::RIGHT);
        assert!(sector.is_face_full(BlockSide::RIGHT));
        assert_eq!(sector.full_faces(), vec![BlockSide::RIGHT]);
        assert_eq!(sector.len(), SECTOR_PLANE_SIZE as usize);

        let corner = Point3::new(31, 0, 0);
        assert_eq!(sector.remove_block(corner), vec![BlockSide::RIGHT]);
        assert!(!sector.is_face_full(BlockSide::RIGHT));

        sector.add_block(corner, stone());
        assert!(sector.is_face_full(BlockSide::RIGHT));
        assert_face_full_accurate(&sector);
    }

    #[test]
    fn test_remove_corner_discards_every_full_face_through_it() {
        let mut sector = Sector::new(Point3::new(0, 0, 0));
        fill_face(&mut sector, BlockSide::LEFT);
        fill_face(&mut sector, BlockSide::BOTTOM);
        fill_face(&mut sector, BlockSide::BACK);
        assert_eq!(sector.full_faces().len(), 3);

        let mut discarded = sector.remove_block(Point3::new(0, 0, 0));
        discarded.sort_by_key(|side| *side as usize);
        assert_eq!(discarded, vec![BlockSide::BACK, BlockSide::BOTTOM, BlockSide::LEFT]);
        assert!(sector.full_faces().is_empty());
        assert_face_full_accurate(&sector);
    }

    #[test]
    fn test_remove_missing_block_is_noop() {
        let mut sector = Sector::new(Point3::new(0, 0, 0));
        fill_face(&mut sector, BlockSide::TOP);
        assert!(sector.remove_block(Point3::new(3, 3, 3)).is_empty());
        assert!(sector.is_face_full(BlockSide::TOP));
    }

    #[test]
    fn test_invariants_hold_under_random_mutation() {
        let mut rng = fastrand::Rng::with_seed(7);
        let mut sector = Sector::new(Point3::new(0, -1, 0));
        // Start from a full floor so face-full transitions get exercised.
        fill_face(&mut sector, BlockSide::BOTTOM);

        for _ in 0..2000 {
            let position = Point3::new(
                rng.i32(0..SECTOR_SIZE),
                rng.i32(-SECTOR_SIZE..-SECTOR_SIZE + 4),
                rng.i32(0..SECTOR_SIZE),
            );
            if rng.bool() {
                sector.add_block(position, stone());
            } else {
                sector.remove_block(position);
            }
        }

        assert_occlusion_invariant(&sector);
        assert_face_full_accurate(&sector);
    }
}
