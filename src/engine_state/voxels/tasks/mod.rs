//! # Voxel Task System
//!
//! Tasks related to sector generation. Generation runs on the task manager's worker so
//! the main thread only ever registers finished sectors.

pub mod sector_generation_task;
