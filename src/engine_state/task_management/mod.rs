//! # Task Management System
//!
//! Runs coarse-grained work on a dedicated worker thread so the main thread never blocks
//! on it.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: owns the worker thread and the channel feeding it
//! - `Task`: a unit of work that can be executed on the worker
//! - `ActionQueue`: the main-thread FIFO that completed work is handed back through
//!
//! ## Task Lifecycle
//! 1. Tasks are published via `TaskManager::publish_task()` and sent over an mpsc channel
//! 2. The worker receives them one at a time, in submission order, and runs `process()`
//! 3. The result is passed to the completion callback, still on the worker thread
//! 4. The callback is expected to forward the result to the main thread, typically by
//!    sending it through an `ActionSender`
//!
//! Because there is a single worker, results are delivered in the order the tasks were
//! published.
//!
//! ## Shutdown
//! Dropping the manager closes the task channel. The worker finishes the task it is
//! running, drains whatever is still queued and exits; the drop joins it.
//!
//! ## Example Usage
//! ```rust,ignore
//! let queue = ActionQueue::new();
//! let sender = queue.sender();
//! let task_manager = TaskManager::new("sector-generation", move |sector| {
//!     sender.send(DeferredAction::RegisterSector(Box::new(sector)));
//! });
//!
//! task_manager.publish_task(Box::new(SectorGenerationTask::new(generator, position)));
//! ```

pub mod action_queue;
pub mod task;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    mpsc::{channel, Sender},
    Arc,
};
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};
use task::Task;

/// Owns one worker thread and feeds it tasks producing values of type `R`.
///
/// # Fields
/// - `task_sender`: sends tasks from the main thread to the worker; `None` once shut down
/// - `num_tasks_in_flight`: tasks published but not yet handed to the callback
/// - `worker`: handle to the worker thread, joined on drop
pub struct TaskManager<R: Send + 'static> {
    name: String,
    task_sender: Option<Sender<Box<dyn Task<R>>>>,
    num_tasks_in_flight: Arc<AtomicUsize>,
    worker: Option<JoinHandle<()>>,
}

impl<R: Send + 'static> TaskManager<R> {
    /// Spawns the worker thread.
    ///
    /// `on_complete` is invoked on the worker thread with the result of every task, in
    /// submission order.
    ///
    /// # Panics
    /// Panics if the underlying thread creation fails.
    pub fn new(name: &str, on_complete: impl Fn(R) + Send + 'static) -> Self {
        let (task_tx, task_rx) = channel::<Box<dyn Task<R>>>();
        let num_tasks_in_flight = Arc::new(AtomicUsize::new(0));
        let worker_in_flight = num_tasks_in_flight.clone();
        let worker_name = name.to_owned();

        let task_closure = move || {
            debug!("Worker '{}' started", worker_name);
            while let Ok(task) = task_rx.recv() {
                let result = task.process();
                on_complete(result);
                worker_in_flight.fetch_sub(1, Ordering::AcqRel);
            }
            debug!("Worker '{}' stopped", worker_name);
        };

        let worker = thread::spawn(task_closure);
        info!("Task manager '{}' running on a dedicated worker", name);

        TaskManager {
            name: name.to_owned(),
            task_sender: Some(task_tx),
            num_tasks_in_flight,
            worker: Some(worker),
        }
    }

    /// Sends a task to the worker.
    ///
    /// # Returns
    /// - `true` if the task was handed to the worker
    /// - `false` if the worker is gone; the task is dropped
    pub fn publish_task(&self, task: Box<dyn Task<R>>) -> bool {
        let Some(sender) = &self.task_sender else {
            return false;
        };

        self.num_tasks_in_flight.fetch_add(1, Ordering::AcqRel);
        match sender.send(task) {
            Ok(_) => true,
            Err(_) => {
                self.num_tasks_in_flight.fetch_sub(1, Ordering::AcqRel);
                warn!("Worker '{}' disconnected, dropping task", self.name);
                false
            }
        }
    }

    /// Number of tasks published whose result has not reached the callback yet.
    pub fn tasks_in_flight(&self) -> usize {
        self.num_tasks_in_flight.load(Ordering::Acquire)
    }

    /// Closes the task channel and waits for the worker to finish what it was given.
    pub fn shutdown(&mut self) {
        self.task_sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Worker '{}' panicked", self.name);
            }
        }
    }
}

impl<R: Send + 'static> Drop for TaskManager<R> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
