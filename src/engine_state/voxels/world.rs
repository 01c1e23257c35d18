//! # World Model
//!
//! The `World` owns every resident sector and decides which blocks the renderer gets to
//! draw.
//!
//! ## State
//!
//! - `sectors`: sectors fully generated and registered
//! - `requested`: sectors handed to the generation scheduler and not yet registered
//! - `shown_sectors`: sectors the caller wants rendered
//! - `shown`: the blocks that have (or, once the queue drains, will have) a drawable
//! - `resources`: the drawables that currently exist, keyed by block position
//!
//! `shown` is updated as soon as a block is shown or hidden, while the matching renderer
//! call may be deferred. After `process_entire_queue` the keys of `shown` and
//! `resources` are identical.
//!
//! ## Deferred Work
//!
//! Bulk effects (sector registration, showing a whole sector) go through a FIFO
//! [`ActionQueue`] drained on the main thread, either within a wall-clock budget
//! (`process_queue`, once per tick) or completely (`process_entire_queue`). Sectors
//! generated on the worker thread arrive through the same queue, so registration always
//! happens on the main thread.
//!
//! Every deferred renderer action re-checks `shown` when applied, so stale or redundant
//! show/hide pairs cost work but never leave a drawable behind.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use cgmath::{InnerSpace, Point3, Vector3};
use log::{debug, info, trace};
use web_time::Instant;

use crate::config::WorldConfig;
use crate::engine_state::rendering::BlockRenderer;
use crate::engine_state::task_management::action_queue::ActionQueue;

use super::block::block_side::{iter_neighbors, BlockSide};
use super::block::Block;
use super::generation::TerrainGenerator;
use super::sector::{sectorize, Sector};
use super::tasks::sector_generation_task::GenerationScheduler;

/// Number of samples taken per block of distance while hit testing.
const HIT_TEST_SAMPLES_PER_BLOCK: u32 = 8;

/// Work waiting in the world's queue.
#[derive(Debug)]
pub enum DeferredAction {
    /// A generated sector ready to be registered.
    RegisterSector(Box<Sector>),
    /// Create the drawable of a shown block.
    CreateResource { position: Point3<i32>, block: Block },
    /// Destroy the drawable of a hidden block.
    DestroyResource { position: Point3<i32> },
    /// Show the block at a position if it is exposed.
    RevealBlock(Point3<i32>),
    /// Re-evaluate exposure of the blocks around a position.
    CheckNeighbors(Point3<i32>),
}

/// Outcome of a successful hit test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HitResult {
    /// The first occupied block along the ray.
    pub block: Point3<i32>,
    /// The block sampled just before it, `None` if the ray started inside `block`.
    pub previous: Option<Point3<i32>>,
}

/// The world model. See the module documentation.
pub struct World<R: BlockRenderer> {
    sectors: HashMap<Point3<i32>, Sector>,
    requested: HashSet<Point3<i32>>,
    shown_sectors: HashSet<Point3<i32>>,
    shown: HashMap<Point3<i32>, Block>,
    resources: HashMap<Point3<i32>, (Block, R::Handle)>,
    queue: ActionQueue<DeferredAction>,
    generator: Arc<TerrainGenerator>,
    scheduler: GenerationScheduler,
    renderer: R,
    queue_budget: Duration,
    hit_test_distance: u32,
}

impl<R: BlockRenderer> World<R> {
    /// Creates an empty world generating sectors from `config.generator`.
    pub fn new(config: &WorldConfig, renderer: R) -> Self {
        let generator = Arc::new(TerrainGenerator::new(config.generator.clone()));
        Self::with_generator(config, generator, renderer)
    }

    /// Creates an empty world around an existing generator.
    ///
    /// Only the queue and hit test settings are read from `config`.
    pub fn with_generator(
        config: &WorldConfig,
        generator: Arc<TerrainGenerator>,
        renderer: R,
    ) -> Self {
        let queue = ActionQueue::new();
        let sender = queue.sender();
        let scheduler = GenerationScheduler::new(generator.clone(), move |sector| {
            sender.send(DeferredAction::RegisterSector(Box::new(sector)));
        });

        World {
            sectors: HashMap::new(),
            requested: HashSet::new(),
            shown_sectors: HashSet::new(),
            shown: HashMap::new(),
            resources: HashMap::new(),
            queue,
            generator,
            scheduler,
            renderer,
            queue_budget: config.queue_budget(),
            hit_test_distance: config.hit_test_distance,
        }
    }

    // ---------------------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------------------

    /// The block stored at `position`, if its sector is resident and holds one.
    pub fn get_block(&self, position: Point3<i32>) -> Option<Block> {
        self.sectors
            .get(&sectorize(position))
            .and_then(|sector| sector.get_block(position))
    }

    /// `true` if no block is stored at `position`.
    ///
    /// Positions in sectors that are not resident count as empty unless
    /// `must_be_loaded` is set, in which case they count as solid.
    pub fn is_empty(&self, position: Point3<i32>, must_be_loaded: bool) -> bool {
        match self.sectors.get(&sectorize(position)) {
            Some(sector) => !sector.has_block(position),
            None => !must_be_loaded,
        }
    }

    /// `true` if at least one face-adjacent position is empty, considering every resident
    /// sector. Neighbours in sectors that are not resident count as solid.
    pub fn exposed(&self, position: Point3<i32>) -> bool {
        iter_neighbors(position).any(|(neighbor, _)| self.is_empty(neighbor, true))
    }

    pub fn sector(&self, position: Point3<i32>) -> Option<&Sector> {
        self.sectors.get(&position)
    }

    pub fn is_resident(&self, position: Point3<i32>) -> bool {
        self.sectors.contains_key(&position)
    }

    pub fn is_requested(&self, position: Point3<i32>) -> bool {
        self.requested.contains(&position)
    }

    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }

    pub fn requested_count(&self) -> usize {
        self.requested.len()
    }

    /// Total number of blocks over all resident sectors.
    pub fn count_blocks(&self) -> usize {
        self.sectors.values().map(Sector::len).sum()
    }

    pub fn shown_sectors(&self) -> &HashSet<Point3<i32>> {
        &self.shown_sectors
    }

    pub fn shown(&self) -> &HashMap<Point3<i32>, Block> {
        &self.shown
    }

    /// Number of drawables that currently exist.
    pub fn currently_shown(&self) -> usize {
        self.resources.len()
    }

    /// Number of collected actions waiting in the queue.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn generator(&self) -> &Arc<TerrainGenerator> {
        &self.generator
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Sector generation tasks the worker has not finished yet.
    pub fn pending_generation(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn hit_test_distance(&self) -> u32 {
        self.hit_test_distance
    }

    // ---------------------------------------------------------------------------------
    // Block mutation
    // ---------------------------------------------------------------------------------

    /// Places `block` at `position`, replacing any block already there.
    ///
    /// Dropped if the owning sector is not resident. With `immediate` the block is shown
    /// (if exposed) and its neighbours re-checked right away, otherwise both effects go
    /// through the queue.
    pub fn add_block(&mut self, position: Point3<i32>, block: Block, immediate: bool) {
        let sector_position = sectorize(position);
        let Some(sector) = self.sectors.get(&sector_position) else {
            return;
        };
        if sector.has_block(position) {
            self.remove_block(position, immediate);
        }

        if let Some(sector) = self.sectors.get_mut(&sector_position) {
            sector.add_block(position, block);
        }

        if immediate {
            if self.shown_sectors.contains(&sector_position) && self.exposed(position) {
                self.show_block(position, true);
            }
            self.check_neighbors(position);
        } else {
            self.queue.push(DeferredAction::RevealBlock(position));
            self.queue.push(DeferredAction::CheckNeighbors(position));
        }
    }

    /// Removes the block at `position`.
    ///
    /// No-op if the sector is not resident or the position is empty. If the removal
    /// opens a previously full sector face, the shown neighbour behind it is generated
    /// and registered on the spot, unless it is already resident or requested.
    pub fn remove_block(&mut self, position: Point3<i32>, immediate: bool) {
        let sector_position = sectorize(position);
        let Some(sector) = self.sectors.get_mut(&sector_position) else {
            return;
        };
        if !sector.has_block(position) {
            return;
        }

        let discarded = sector.remove_block(position);
        for side in discarded {
            let neighbor = side.offset(sector_position);
            if self.sectors.contains_key(&neighbor)
                || self.requested.contains(&neighbor)
                || !self.shown_sectors.contains(&neighbor)
            {
                continue;
            }
            info!(
                "Face {:?} of sector {:?} opened, generating sector {:?}",
                side, sector_position, neighbor
            );
            let sector = self.generator.generate(neighbor);
            self.register_sector(sector);
        }

        self.hide_block(position, immediate);
        if immediate {
            self.check_neighbors(position);
        } else {
            self.queue.push(DeferredAction::CheckNeighbors(position));
        }
    }

    /// Re-evaluates, against the whole world, whether each block next to `position`
    /// should be shown. Blocks of sectors that are not shown are never revealed.
    pub fn check_neighbors(&mut self, position: Point3<i32>) {
        for (neighbor, _) in iter_neighbors(position) {
            let Some(block) = self.get_block(neighbor) else {
                continue;
            };
            if self.exposed(neighbor) {
                if !self.shown.contains_key(&neighbor)
                    && self.shown_sectors.contains(&sectorize(neighbor))
                {
                    self.show_block_as(neighbor, block, true);
                }
            } else if self.shown.contains_key(&neighbor) {
                self.hide_block(neighbor, true);
            }
        }
    }

    // ---------------------------------------------------------------------------------
    // Block display
    // ---------------------------------------------------------------------------------

    /// Marks the block at `position` as shown and creates its drawable, right away or
    /// through the queue. No-op if no block is stored there.
    pub fn show_block(&mut self, position: Point3<i32>, immediate: bool) {
        if let Some(block) = self.get_block(position) {
            self.show_block_as(position, block, immediate);
        }
    }

    fn show_block_as(&mut self, position: Point3<i32>, block: Block, immediate: bool) {
        self.shown.insert(position, block);
        if immediate {
            self.create_resource(position, block);
        } else {
            self.queue
                .push(DeferredAction::CreateResource { position, block });
        }
    }

    /// Un-marks the block at `position` and destroys its drawable, right away or through
    /// the queue. No-op if the block is not shown.
    pub fn hide_block(&mut self, position: Point3<i32>, immediate: bool) {
        if self.shown.remove(&position).is_none() {
            return;
        }
        if immediate {
            self.destroy_resource(position);
        } else {
            self.queue.push(DeferredAction::DestroyResource { position });
        }
    }

    fn create_resource(&mut self, position: Point3<i32>, block: Block) {
        if let Some((existing, handle)) = self.resources.remove(&position) {
            if existing == block {
                self.resources.insert(position, (existing, handle));
                return;
            }
            self.renderer.destroy(handle);
        }
        let handle = self.renderer.create(position, block);
        self.resources.insert(position, (block, handle));
    }

    fn destroy_resource(&mut self, position: Point3<i32>) {
        if let Some((_, handle)) = self.resources.remove(&position) {
            self.renderer.destroy(handle);
        }
    }

    // ---------------------------------------------------------------------------------
    // Sectors
    // ---------------------------------------------------------------------------------

    /// Makes a generated sector resident.
    ///
    /// If the sector is shown, its exposed blocks are queued for display, boundary
    /// blocks of shown neighbours that it uncovers are revealed, and shown neighbours
    /// behind its open faces are requested.
    ///
    /// # Panics
    /// Panics if the sector is already resident.
    pub fn register_sector(&mut self, sector: Sector) {
        let position = sector.position();
        assert!(
            !self.sectors.contains_key(&position),
            "sector {:?} registered twice",
            position
        );

        debug!("Registering sector {:?} ({} blocks)", position, sector.len());
        self.requested.remove(&position);
        self.sectors.insert(position, sector);
        if !self.shown_sectors.contains(&position) {
            return;
        }

        let sector = &self.sectors[&position];
        let open_faces: Vec<BlockSide> = BlockSide::all()
            .into_iter()
            .filter(|side| !sector.is_face_full(*side))
            .collect();

        let mut to_show: Vec<Point3<i32>> = sector
            .visible()
            .iter()
            .copied()
            .filter(|block| !sector.outline().contains(block) || self.exposed(*block))
            .collect();

        for side in &open_faces {
            let neighbor_position = side.offset(position);
            if !self.shown_sectors.contains(&neighbor_position) {
                continue;
            }
            let Some(neighbor) = self.sectors.get(&neighbor_position) else {
                continue;
            };
            let normal: Vector3<i32> = side.normal();
            to_show.extend(neighbor.blocks_from_face(side.opposite()).filter(|block| {
                !self.shown.contains_key(block) && !sector.has_block(*block - normal)
            }));
        }

        for block in to_show {
            self.show_block(block, false);
        }

        for side in open_faces {
            let neighbor = side.offset(position);
            if self.sectors.contains_key(&neighbor)
                || self.requested.contains(&neighbor)
                || !self.shown_sectors.contains(&neighbor)
            {
                continue;
            }
            self.request_sector(neighbor);
        }
    }

    fn request_sector(&mut self, position: Point3<i32>) {
        debug!("Requesting sector {:?}", position);
        if self.scheduler.request_sector(position) {
            self.requested.insert(position);
        }
    }

    /// Generates and registers the sector at `position` on the calling thread.
    ///
    /// Returns `false` if the sector is already resident or requested. Needed to seed an
    /// empty world, where no sector passes the `is_sector_visible` check.
    pub fn load_sector_now(&mut self, position: Point3<i32>) -> bool {
        if self.sectors.contains_key(&position) || self.requested.contains(&position) {
            return false;
        }
        let sector = self.generator.generate(position);
        self.register_sector(sector);
        true
    }

    /// `true` if a resident neighbour leaves its shared face open.
    pub fn is_sector_visible(&self, position: Point3<i32>) -> bool {
        BlockSide::all().into_iter().any(|side| {
            self.sectors
                .get(&side.offset(position))
                .is_some_and(|neighbor| !neighbor.is_face_full(side.opposite()))
        })
    }

    /// Adds the sector to the shown set.
    ///
    /// A resident sector gets its exposed blocks queued for display. Otherwise the sector
    /// is requested, unless it is pending already or hidden behind full faces.
    pub fn show_sector(&mut self, position: Point3<i32>) {
        self.shown_sectors.insert(position);

        let Some(sector) = self.sectors.get(&position) else {
            if !self.requested.contains(&position) && self.is_sector_visible(position) {
                self.request_sector(position);
            }
            return;
        };

        let to_show: Vec<Point3<i32>> = sector
            .visible()
            .iter()
            .copied()
            .filter(|block| !self.shown.contains_key(block))
            .filter(|block| !sector.outline().contains(block) || self.exposed(*block))
            .collect();
        for block in to_show {
            self.show_block(block, false);
        }
    }

    /// Removes the sector from the shown set and queues its drawables for destruction.
    pub fn hide_sector(&mut self, position: Point3<i32>) {
        self.shown_sectors.remove(&position);

        let Some(sector) = self.sectors.get(&position) else {
            return;
        };
        let to_hide: Vec<Point3<i32>> = sector
            .blocks()
            .keys()
            .copied()
            .filter(|block| self.shown.contains_key(block))
            .collect();
        for block in to_hide {
            self.hide_block(block, false);
        }
    }

    /// Makes the shown set exactly `positions`, showing new sectors in the given order.
    pub fn show_only_sectors(&mut self, positions: &[Point3<i32>]) {
        let after: HashSet<Point3<i32>> = positions.iter().copied().collect();
        let show: Vec<Point3<i32>> = positions
            .iter()
            .copied()
            .filter(|position| !self.shown_sectors.contains(position))
            .collect();
        let hide: Vec<Point3<i32>> = self
            .shown_sectors
            .iter()
            .copied()
            .filter(|position| !after.contains(position))
            .collect();

        for position in show {
            self.show_sector(position);
        }
        for position in hide {
            self.hide_sector(position);
        }
    }

    // ---------------------------------------------------------------------------------
    // Hit testing
    // ---------------------------------------------------------------------------------

    /// Marches from `origin` along `direction` for up to `max_distance` blocks.
    ///
    /// `direction` is expected to be a unit vector. Unloaded positions count as empty, so
    /// the march stops once the ray is past every resident sector.
    pub fn hit_test(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: u32,
    ) -> Option<HitResult> {
        let reach = self.resident_reach(origin)?;
        let length = direction.magnitude();
        let reach_blocks = if length > 0.0 {
            ((reach / length).ceil() as u64).saturating_add(1)
        } else {
            1
        };
        let samples = u64::from(max_distance).min(reach_blocks)
            * u64::from(HIT_TEST_SAMPLES_PER_BLOCK);

        let step = direction / HIT_TEST_SAMPLES_PER_BLOCK as f32;
        let mut point = origin;
        let mut previous: Option<Point3<i32>> = None;

        for _ in 0..samples {
            let sampled = Point3::new(
                (point.x + 0.5).floor() as i32,
                (point.y + 0.5).floor() as i32,
                (point.z + 0.5).floor() as i32,
            );
            if previous != Some(sampled) {
                if !self.is_empty(sampled, false) {
                    return Some(HitResult {
                        block: sampled,
                        previous,
                    });
                }
                previous = Some(sampled);
            }
            point += step;
        }
        None
    }

    /// Distance from `origin` to the farthest cube corner of any resident sector.
    fn resident_reach(&self, origin: Point3<f32>) -> Option<f32> {
        let farthest = |from: f32, min: i32, max: i32| {
            (from - (min as f32 - 0.5))
                .abs()
                .max((max as f32 - 0.5 - from).abs())
        };
        self.sectors
            .values()
            .map(|sector| {
                let (min, max) = (sector.min_block(), sector.max_block());
                let dx = farthest(origin.x, min.x, max.x);
                let dy = farthest(origin.y, min.y, max.y);
                let dz = farthest(origin.z, min.z, max.z);
                (dx * dx + dy * dy + dz * dz).sqrt()
            })
            .reduce(f32::max)
    }

    // ---------------------------------------------------------------------------------
    // Queue
    // ---------------------------------------------------------------------------------

    /// Applies queued actions until the queue is empty or the tick budget is spent.
    ///
    /// Returns the number of actions applied.
    pub fn process_queue(&mut self) -> usize {
        self.queue.collect_arrivals();
        let start = Instant::now();
        let mut processed = 0;
        while start.elapsed() < self.queue_budget {
            let Some(action) = self.queue.pop() else {
                break;
            };
            self.apply(action);
            processed += 1;
        }
        trace!(
            "Processed {} queued actions, {} left",
            processed,
            self.queue.len()
        );
        processed
    }

    /// Applies every queued action, including those queued while draining.
    pub fn process_entire_queue(&mut self) -> usize {
        self.queue.collect_arrivals();
        let mut processed = 0;
        while let Some(action) = self.queue.pop() {
            self.apply(action);
            processed += 1;
        }
        trace!("Drained {} queued actions", processed);
        processed
    }

    /// Drains the queue until no sector is requested any more, blocking on the worker in
    /// between. Returns `false` if `timeout` elapsed first.
    pub fn process_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.process_entire_queue();
            if self.requested.is_empty() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.queue.wait_for_arrival(deadline - now);
        }
    }

    fn apply(&mut self, action: DeferredAction) {
        match action {
            DeferredAction::RegisterSector(sector) => self.register_sector(*sector),
            DeferredAction::CreateResource { position, block } => {
                if self.shown.get(&position) == Some(&block) {
                    self.create_resource(position, block);
                }
            }
            DeferredAction::DestroyResource { position } => {
                if !self.shown.contains_key(&position) {
                    self.destroy_resource(position);
                }
            }
            DeferredAction::RevealBlock(position) => {
                if !self.shown.contains_key(&position)
                    && self.shown_sectors.contains(&sectorize(position))
                    && self.get_block(position).is_some()
                    && self.exposed(position)
                {
                    self.show_block(position, true);
                }
            }
            DeferredAction::CheckNeighbors(position) => self.check_neighbors(position),
        }
    }
}
