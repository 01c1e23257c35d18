#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Sector World
//!
//! A voxel world model too large to hold or draw in full. Space is partitioned into
//! fixed-size sectors that are generated procedurally on a background worker, and only
//! the blocks that are actually exposed are handed to the renderer.
//!
//! ## Key Modules
//!
//! * `config` - serde-backed world and generator configuration
//! * `engine_state` - focus tracking, the world model, generation and the renderer seam
//!
//! ## Architecture
//!
//! * Sectors keep their own occlusion bookkeeping up to date on every mutation
//! * Generation runs on a single worker; finished sectors are passed back as messages
//! * The world drains a deferred action queue on the main thread within a time budget
//! * Rendering is a trait, so the same model drives a GPU backend or a headless one
//!
//! ## Usage
//!
//! ```rust,no_run
//! fn main() {
//!     sector_world::run();
//! }
//! ```

use std::env;
use std::time::Duration;

use cgmath::{Point3, Vector3};
use log::{info, warn};

use config::WorldConfig;
use engine_state::{rendering::HeadlessRenderer, EngineState};

pub mod config;
pub mod engine_state;

/// Environment variable naming a JSON configuration file for `run()`.
pub const CONFIG_PATH_VARIABLE: &str = "SECTOR_WORLD_CONFIG";

/// How long `run()` waits for the initial region to finish generating.
const STARTUP_TIMEOUT: Duration = Duration::from_secs(60);

/// Initialises the `env_logger` backend, filtered by `RUST_LOG`.
pub fn init_logging() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
}

/// Loads the configuration named by `SECTOR_WORLD_CONFIG`, falling back to defaults.
pub fn load_config() -> WorldConfig {
    let Ok(path) = env::var(CONFIG_PATH_VARIABLE) else {
        return WorldConfig::default();
    };
    match WorldConfig::load(&path) {
        Ok(config) => config,
        Err(err) => {
            warn!("Could not load {}: {}, using defaults", path, err);
            WorldConfig::default()
        }
    }
}

/// Headless driver: generates the region around the origin and reports what it built.
pub fn run() {
    init_logging();
    info!("Logger initialized");

    let config = load_config();
    let mut engine_state = EngineState::new(&config, HeadlessRenderer::new());
    engine_state.set_focus(Point3::new(0.0, 0.0, 0.0));

    if !engine_state.world.process_until_idle(STARTUP_TIMEOUT) {
        warn!(
            "Gave up waiting after {:?}, {} sectors still requested, {} still generating",
            STARTUP_TIMEOUT,
            engine_state.world.requested_count(),
            engine_state.world.pending_generation()
        );
    }

    let world = &engine_state.world;
    info!(
        "{} sectors resident, {} blocks, {} shown, {} bytes of vertex data",
        world.sector_count(),
        world.count_blocks(),
        world.currently_shown(),
        world.renderer().vertex_bytes()
    );

    let eye = Point3::new(0.0, 24.0, 0.0);
    match world.hit_test(eye, Vector3::new(0.0, -1.0, 0.0), 64) {
        Some(hit) => info!("Looking down from {:?} hits block {:?}", eye, hit.block),
        None => info!("Nothing below {:?}", eye),
    }
}
