//! # Engine State Module
//!
//! Ties the world model to a moving point of interest.
//!
//! ## Key Components
//!
//! * `EngineState` - owns the world and tracks the sector the focus is in
//! * `rendering` - the renderer seam and cube vertex data
//! * `task_management` - the single-worker task manager and the deferred action queue
//! * `voxels` - blocks, sectors, terrain generation and the world model
//!
//! Every time the focus crosses into another sector, the set of shown sectors is
//! replaced by the cube of sectors within the render distance, nearest first, so the
//! closest terrain is requested and drawn before the rest.

use cgmath::Point3;
use log::{debug, info};
use rendering::BlockRenderer;
use voxels::{sector::sectorize, world::World};

use crate::config::WorldConfig;

pub mod rendering;
pub mod task_management;
pub mod voxels;

/// The world plus the focus tracking driving which sectors are shown.
pub struct EngineState<R: BlockRenderer> {
    /// The voxel world containing all sector data
    pub world: World<R>,
    /// Radius, in sectors, of the shown region
    render_distance: i32,
    /// Sector the focus was last seen in
    current_focus_sector: Option<Point3<i32>>,
}

impl<R: BlockRenderer> EngineState<R> {
    pub fn new(config: &WorldConfig, renderer: R) -> Self {
        Self {
            world: World::new(config, renderer),
            render_distance: config.render_distance.max(0),
            current_focus_sector: None,
        }
    }

    pub fn focus_sector(&self) -> Option<Point3<i32>> {
        self.current_focus_sector
    }

    /// Moves the focus to a continuous world position.
    ///
    /// Returns `true` if the focus entered another sector, in which case the shown set
    /// is rebuilt around it. When the focus sector is neither resident nor on its way it
    /// is generated on the spot, so an empty world starts loading.
    pub fn set_focus(&mut self, focus: Point3<f32>) -> bool {
        let sector = focus_sector_of(focus);
        if self.current_focus_sector == Some(sector) {
            return false;
        }

        debug!("Focus moved to sector {:?}", sector);
        let positions = sectors_around(sector, self.render_distance);
        self.world.show_only_sectors(&positions);
        if !self.world.is_resident(sector) && !self.world.is_requested(sector) {
            info!("Loading focus sector {:?} synchronously", sector);
            self.world.load_sector_now(sector);
        }

        self.current_focus_sector = Some(sector);
        true
    }

    /// Per-frame update: applies queued work within the configured budget.
    pub fn tick(&mut self) -> usize {
        self.world.process_queue()
    }
}

/// Sector holding the block whose unit cube contains `focus`.
///
/// Blocks are centred on integer coordinates, so the focus is rounded to the nearest
/// block before sectorizing.
pub fn focus_sector_of(focus: Point3<f32>) -> Point3<i32> {
    let block = Point3::new(
        (focus.x + 0.5).floor() as i32,
        (focus.y + 0.5).floor() as i32,
        (focus.z + 0.5).floor() as i32,
    );
    sectorize(block)
}

/// Every sector within `distance` of `center` on each axis, nearest first.
pub fn sectors_around(center: Point3<i32>, distance: i32) -> Vec<Point3<i32>> {
    let mut positions = Vec::new();
    for x in -distance..=distance {
        for y in -distance..=distance {
            for z in -distance..=distance {
                positions.push(Point3::new(center.x + x, center.y + y, center.z + z));
            }
        }
    }
    positions.sort_by_key(|position| distance2(*position, center));
    positions
}

/// Squared euclidean distance between two sector positions.
fn distance2(a: Point3<i32>, b: Point3<i32>) -> i32 {
    let d = a - b;
    d.x * d.x + d.y * d.y + d.z * d.z
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::engine_state::rendering::HeadlessRenderer;
    use crate::engine_state::voxels::block::block_type::BlockType;
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(20);

    fn flat_engine() -> EngineState<HeadlessRenderer> {
        let config = WorldConfig {
            generator: GeneratorConfig::flat(BlockType::STONE),
            render_distance: 1,
            ..WorldConfig::default()
        };
        EngineState::new(&config, HeadlessRenderer::new())
    }

    #[test]
    fn test_sectors_around_nearest_first() {
        let center = Point3::new(2, 0, -1);
        let positions = sectors_around(center, 1);
        assert_eq!(positions.len(), 27);
        assert_eq!(positions[0], center);
        for pair in positions.windows(2) {
            assert!(distance2(pair[0], center) <= distance2(pair[1], center));
        }
        assert_eq!(sectors_around(center, 0), vec![center]);
    }

    #[test]
    fn test_focus_sector_follows_block_centres() {
        assert_eq!(focus_sector_of(Point3::new(15.4, 0.0, 0.0)), Point3::new(0, 0, 0));
        assert_eq!(focus_sector_of(Point3::new(15.7, 0.0, 0.0)), Point3::new(1, 0, 0));
        assert_eq!(focus_sector_of(Point3::new(0.0, -0.4, 0.0)), Point3::new(0, 0, 0));
        assert_eq!(focus_sector_of(Point3::new(0.0, 0.0, -0.6)), Point3::new(0, 0, -1));
        assert_eq!(focus_sector_of(Point3::new(-16.6, 0.0, 0.0)), Point3::new(-2, 0, 0));

        let mut engine = flat_engine();
        assert!(engine.set_focus(Point3::new(15.4, 0.0, 0.0)));
        assert_eq!(engine.focus_sector(), Some(Point3::new(0, 0, 0)));
        assert!(engine.set_focus(Point3::new(15.7, 0.0, 0.0)));
        assert_eq!(engine.focus_sector(), Some(Point3::new(1, 0, 0)));
    }

    #[test]
    fn test_focus_loads_region() {
        let mut engine = flat_engine();
        assert!(engine.set_focus(Point3::new(0.5, 0.5, 0.5)));
        assert!(!engine.set_focus(Point3::new(3.0, 2.0, 1.0)));
        assert_eq!(engine.focus_sector(), Some(Point3::new(0, 0, 0)));

        assert!(engine.world.process_until_idle(TIMEOUT));
        assert_eq!(engine.world.sector_count(), 27);
        // The floor at y = -2 lies in the nine sectors of layer y = -1.
        assert_eq!(engine.world.count_blocks(), 9 * 256);
        assert_eq!(engine.world.currently_shown(), 9 * 256);
    }

    #[test]
    fn test_moving_focus_hides_far_sectors() {
        let mut engine = flat_engine();
        engine.set_focus(Point3::new(0.0, 0.0, 0.0));
        assert!(engine.world.process_until_idle(TIMEOUT));

        assert!(engine.set_focus(Point3::new(40.0, 0.0, 0.0)));
        assert_eq!(engine.focus_sector(), Some(Point3::new(2, 0, 0)));
        assert!(engine.world.process_until_idle(TIMEOUT));

        assert_eq!(engine.world.shown_sectors().len(), 27);
        assert_eq!(engine.world.sector_count(), 45);
        assert_eq!(engine.world.currently_shown(), 9 * 256);
        assert!(engine
            .world
            .shown()
            .keys()
            .all(|position| position.x >= 16 && position.x < 64));
    }

    #[test]
    fn test_tick_drains_within_budget() {
        let mut engine = flat_engine();
        engine.set_focus(Point3::new(0.0, 0.0, 0.0));
        let mut applied = 0;
        for _ in 0..10_000 {
            applied += engine.tick();
            if engine.world.requested_count() == 0 && engine.world.queue_len() == 0 {
                break;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        assert!(applied > 0);
        assert_eq!(engine.world.sector_count(), 27);
    }
}
