//! # Task System Core Trait
//!
//! A `Task` is a unit of work shipped to the worker thread. It must own everything it
//! needs (`Send + 'static`) and produce a value that the task manager hands to its
//! completion callback, still on the worker thread.

/// A unit of work that can be executed on the worker thread.
///
/// # Implementation Guidelines
/// - Must be `Send` to be transferred between threads
/// - Should be relatively coarse-grained to amortize scheduling overhead
/// - Should not hold references to state the main thread mutates
pub trait Task<R>: Send {
    /// Performs the work and returns its result.
    ///
    /// Runs on the worker thread; the result is passed to the task manager's callback
    /// on that same thread.
    fn process(&self) -> R;
}
