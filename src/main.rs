//! # Sector World Entry Point
//!
//! Runs the headless driver of the library.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info SECTOR_WORLD_CONFIG=world.json cargo run --release
//! ```

fn main() {
    sector_world::run();
}
