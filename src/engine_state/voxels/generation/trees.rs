//! # Tree Stamps
//!
//! Tree shapes built from three primitives: a trunk block, a plus-shaped leaf ring and a
//! 3x3 leaf box. Every placement goes through `Sector::add_block`, so blocks falling
//! outside the sector are dropped and the neighbouring sector places its own part when
//! it is generated.

use cgmath::Point3;

use crate::engine_state::voxels::block::{block_type::BlockType, Block};
use crate::engine_state::voxels::sector::Sector;

/// Column height above which grass and dirt grow firs instead of default trees.
pub const FIR_LINE: i32 = 8;

/// Tallest tree any shape produces.
pub const MAX_TREE_HEIGHT: i32 = 7;

/// Silhouette of a tree, chosen from the surface it grows on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TreeShape {
    /// Round crown, for meadows.
    Default,
    /// Stacked rings around the trunk, for high ground.
    Fir,
    /// Bare trunk with a star of leaves, for beaches.
    Coconut,
}

impl TreeShape {
    /// Picks a shape and draws its height from `rng`.
    ///
    /// `column_height` is the height of the terrain column under the tree.
    pub fn pick(surface: BlockType, column_height: i32, rng: &mut fastrand::Rng) -> (TreeShape, i32) {
        if surface == BlockType::SAND {
            (TreeShape::Coconut, rng.i32(4..=5))
        } else if column_height > FIR_LINE {
            (TreeShape::Fir, rng.i32(3..=5))
        } else {
            let tallest = (MAX_TREE_HEIGHT - column_height / 3).max(3);
            (TreeShape::Default, rng.i32(3..=tallest))
        }
    }

    /// Places a tree of `height` whose trunk starts at `base`.
    pub fn stamp(&self, sector: &mut Sector, base: Point3<i32>, height: i32) {
        match self {
            TreeShape::Default => stamp_default_tree(sector, base, height),
            TreeShape::Fir => stamp_fir_tree(sector, base, height),
            TreeShape::Coconut => stamp_coconut_tree(sector, base, height),
        }
    }
}

fn wood() -> Block {
    Block::new(BlockType::WOOD)
}

fn leaves() -> Block {
    Block::new(BlockType::LEAVES)
}

/// A single trunk block.
pub fn stamp_trunk(sector: &mut Sector, position: Point3<i32>) {
    sector.add_block(position, wood());
}

/// A centre block and its four horizontal neighbours.
pub fn stamp_plus(sector: &mut Sector, center: Point3<i32>, block: Block) {
    let Point3 { x, y, z } = center;
    sector.add_block(center, block);
    sector.add_block(Point3::new(x - 1, y, z), block);
    sector.add_block(Point3::new(x + 1, y, z), block);
    sector.add_block(Point3::new(x, y, z - 1), block);
    sector.add_block(Point3::new(x, y, z + 1), block);
}

/// A horizontal 3x3 square around `center`.
pub fn stamp_box(sector: &mut Sector, center: Point3<i32>, block: Block) {
    for dx in -1..=1 {
        for dz in -1..=1 {
            sector.add_block(Point3::new(center.x + dx, center.y, center.z + dz), block);
        }
    }
}

/// Heights 0 to 2 look the same for every shape except the coconut tree.
fn stamp_sapling(sector: &mut Sector, base: Point3<i32>, height: i32) -> bool {
    match height {
        i32::MIN..=0 => true,
        1 => {
            stamp_plus(sector, base, leaves());
            true
        }
        2 => {
            stamp_trunk(sector, base);
            sector.add_block(Point3::new(base.x, base.y + 1, base.z), leaves());
            true
        }
        _ => false,
    }
}

fn stamp_default_tree(sector: &mut Sector, base: Point3<i32>, height: i32) {
    if stamp_sapling(sector, base, height) {
        return;
    }
    let at = |dy: i32| Point3::new(base.x, base.y + dy, base.z);

    let mut y_tree = 0;
    let root_height = if height >= 4 { 2 } else { 1 };
    for _ in 0..root_height {
        stamp_trunk(sector, at(y_tree));
        y_tree += 1;
    }
    stamp_plus(sector, at(y_tree), leaves());
    y_tree += 1;
    for _ in 0..(height - 4).max(0) {
        stamp_box(sector, at(y_tree), leaves());
        y_tree += 1;
    }
    stamp_plus(sector, at(y_tree), leaves());
}

fn stamp_fir_tree(sector: &mut Sector, base: Point3<i32>, height: i32) {
    if stamp_sapling(sector, base, height) {
        return;
    }
    let at = |dy: i32| Point3::new(base.x, base.y + dy, base.z);

    let mut y_tree = 0;
    stamp_trunk(sector, at(y_tree));
    y_tree += 1;
    stamp_box(sector, at(y_tree), leaves());
    stamp_trunk(sector, at(y_tree));
    y_tree += 1;
    let layers = (height - 2) / 2;
    for _ in 0..layers {
        stamp_plus(sector, at(y_tree), leaves());
        stamp_trunk(sector, at(y_tree));
        y_tree += 1;
    }
    for _ in 0..layers {
        sector.add_block(at(y_tree), leaves());
        y_tree += 1;
    }
}

fn stamp_coconut_tree(sector: &mut Sector, base: Point3<i32>, height: i32) {
    let mut top = base;
    for _ in 0..(height - 1).max(0) {
        stamp_trunk(sector, top);
        top.y += 1;
    }

    // Fronds reach further out, and droop, on taller trees.
    let mut fronds = vec![(1, 0)];
    if height >= 5 {
        fronds.push((2, 0));
    }
    if height >= 6 {
        fronds.push((3, -1));
    }
    for (reach, droop) in fronds {
        let y = top.y + droop;
        sector.add_block(Point3::new(top.x + reach, y, top.z), leaves());
        sector.add_block(Point3::new(top.x - reach, y, top.z), leaves());
        sector.add_block(Point3::new(top.x, y, top.z + reach), leaves());
        sector.add_block(Point3::new(top.x, y, top.z - reach), leaves());
    }
}
