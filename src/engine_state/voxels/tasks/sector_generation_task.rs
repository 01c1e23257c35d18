//! # Sector Generation Task
//!
//! This module defines the `SectorGenerationTask`, which builds a sector's initial content
//! off the main thread, and the `GenerationScheduler` that publishes those tasks.

use std::sync::Arc;

use cgmath::Point3;
use log::debug;

use crate::engine_state::{
    task_management::{task::Task, TaskManager},
    voxels::{generation::TerrainGenerator, sector::Sector},
};

/// A task that generates the sector at one position.
pub struct SectorGenerationTask {
    /// Shared, immutable generator; the worker never touches world state
    generator: Arc<TerrainGenerator>,
    /// The position of the sector to generate (in sector coordinates)
    position: Point3<i32>,
}

impl SectorGenerationTask {
    pub fn new(generator: Arc<TerrainGenerator>, position: Point3<i32>) -> Self {
        SectorGenerationTask {
            generator,
            position,
        }
    }
}

impl Task<Sector> for SectorGenerationTask {
    fn process(&self) -> Sector {
        let sector = self.generator.generate(self.position);
        debug!("Generated sector {:?} ({} blocks)", self.position, sector.len());
        sector
    }
}

/// Publishes sector generation requests to a dedicated worker.
///
/// Each finished sector is handed to the callback given at construction, on the worker
/// thread, in request order.
pub struct GenerationScheduler {
    generator: Arc<TerrainGenerator>,
    task_manager: TaskManager<Sector>,
}

impl GenerationScheduler {
    pub fn new(
        generator: Arc<TerrainGenerator>,
        on_generated: impl Fn(Sector) + Send + 'static,
    ) -> Self {
        GenerationScheduler {
            generator,
            task_manager: TaskManager::new("sector-generation", on_generated),
        }
    }

    /// Queues generation of the sector at `position`. Returns immediately.
    pub fn request_sector(&self, position: Point3<i32>) -> bool {
        self.task_manager.publish_task(Box::new(SectorGenerationTask::new(
            self.generator.clone(),
            position,
        )))
    }

    /// Requests whose sector has not been handed to the callback yet.
    pub fn pending(&self) -> usize {
        self.task_manager.tasks_in_flight()
    }
}
