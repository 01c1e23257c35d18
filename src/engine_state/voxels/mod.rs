//! # Voxel World Core
//!
//! Representation, generation and display bookkeeping of the sector world.
//!
//! ## Architecture
//!
//! * **Block**: block types, their textures, and the six face directions
//! * **Sector**: a fixed-size cube of blocks with incremental occlusion bookkeeping
//! * **Generation**: deterministic construction of a sector from its coordinates
//! * **Tasks**: sector generation run on the scheduler's worker thread
//! * **World**: resident sectors, shown blocks, and the deferred action queue
//!
//! ## Data Flow
//!
//! 1. The world is asked to show a sector that is not resident yet
//! 2. A generation task is published to the worker
//! 3. The finished sector travels back through the world's action queue
//! 4. Draining the queue registers the sector and creates drawables for its exposed blocks

pub mod block;
pub mod generation;
pub mod sector;
pub mod tasks;
pub mod world;
