//! # Block Side Module
//!
//! This module defines the six faces of a voxel block. The same directions name the six
//! boundary faces of a sector, so they drive both per-block exposure checks and the
//! cross-sector face bookkeeping.

use cgmath::{Point3, Vector3};

/// Represents the six possible faces of a voxel block.
///
/// Each variant is assigned a unique integer value so it can index per-face tables
/// (texture indices, face-full bits).
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// The unit face-normal vector of this side.
    pub fn normal(&self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(0, 0, 1),
            BlockSide::BACK => Vector3::new(0, 0, -1),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
        }
    }

    /// The side facing the other way along the same axis.
    pub fn opposite(&self) -> BlockSide {
        match self {
            BlockSide::FRONT => BlockSide::BACK,
            BlockSide::BACK => BlockSide::FRONT,
            BlockSide::BOTTOM => BlockSide::TOP,
            BlockSide::TOP => BlockSide::BOTTOM,
            BlockSide::LEFT => BlockSide::RIGHT,
            BlockSide::RIGHT => BlockSide::LEFT,
        }
    }

    /// Index of the axis this side is normal to (0 = x, 1 = y, 2 = z).
    pub fn axis(&self) -> usize {
        match self {
            BlockSide::LEFT | BlockSide::RIGHT => 0,
            BlockSide::BOTTOM | BlockSide::TOP => 1,
            BlockSide::FRONT | BlockSide::BACK => 2,
        }
    }

    /// `true` if the normal points along the positive axis.
    pub fn is_positive(&self) -> bool {
        matches!(self, BlockSide::FRONT | BlockSide::TOP | BlockSide::RIGHT)
    }

    /// The side whose normal is `(axis, positive)`.
    pub fn from_axis(axis: usize, positive: bool) -> BlockSide {
        match (axis, positive) {
            (0, false) => BlockSide::LEFT,
            (0, true) => BlockSide::RIGHT,
            (1, false) => BlockSide::BOTTOM,
            (1, true) => BlockSide::TOP,
            (_, false) => BlockSide::BACK,
            (_, true) => BlockSide::FRONT,
        }
    }

    /// The position one step from `position` along this side's normal.
    pub fn offset(&self, position: Point3<i32>) -> Point3<i32> {
        position + self.normal()
    }
}

/// Iterates the six face-adjacent positions of `position`, paired with the side they lie on.
pub fn iter_neighbors(position: Point3<i32>) -> impl Iterator<Item = (Point3<i32>, BlockSide)> {
    BlockSide::all()
        .into_iter()
        .map(move |side| (side.offset(position), side))
}
