//! # Deferred Action Queue
//!
//! FIFO queue of actions applied on the main thread. Actions pushed from the main thread
//! go straight to the queue; actions produced on other threads travel through an
//! [`ActionSender`] and join the tail of the queue the next time the owner collects
//! arrivals. Nothing but the owner ever touches the queue itself.

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// Cloneable, thread-safe handle for appending actions to an [`ActionQueue`].
pub struct ActionSender<T> {
    sender: Sender<T>,
}

impl<T> ActionSender<T> {
    /// Appends `action` to the owning queue.
    ///
    /// Returns `false` if the queue was dropped in the meantime.
    pub fn send(&self, action: T) -> bool {
        match self.sender.send(action) {
            Ok(_) => true,
            Err(_) => {
                log::warn!("Action queue closed, dropping action");
                false
            }
        }
    }
}

impl<T> Clone for ActionSender<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

/// Ordered list of pending actions, fed by the owner and by any number of senders.
pub struct ActionQueue<T> {
    pending: VecDeque<T>,
    sender: Sender<T>,
    inbox: Receiver<T>,
}

impl<T> ActionQueue<T> {
    pub fn new() -> Self {
        let (sender, inbox) = channel();
        ActionQueue {
            pending: VecDeque::new(),
            sender,
            inbox,
        }
    }

    /// A handle other threads can use to append actions.
    pub fn sender(&self) -> ActionSender<T> {
        ActionSender {
            sender: self.sender.clone(),
        }
    }

    /// Appends an action from the owning thread.
    pub fn push(&mut self, action: T) {
        self.pending.push_back(action);
    }

    /// Moves every action sent so far from other threads to the tail of the queue.
    ///
    /// Returns the number of actions moved.
    pub fn collect_arrivals(&mut self) -> usize {
        let mut count = 0;
        while let Ok(action) = self.inbox.try_recv() {
            self.pending.push_back(action);
            count += 1;
        }
        count
    }

    /// Blocks up to `timeout` for an action from another thread, then collects it along
    /// with anything else that arrived.
    ///
    /// Returns `true` if at least one action arrived.
    pub fn wait_for_arrival(&mut self, timeout: Duration) -> bool {
        match self.inbox.recv_timeout(timeout) {
            Ok(action) => {
                self.pending.push_back(action);
                self.collect_arrivals();
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Removes the oldest pending action.
    pub fn pop(&mut self) -> Option<T> {
        self.pending.pop_front()
    }

    /// Number of collected, not yet processed actions.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<T> Default for ActionQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_local_actions_are_fifo() {
        let mut queue = ActionQueue::new();
        queue.push(1);
        queue.push(2);
        queue.push(3);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), Some(3));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_remote_actions_join_the_tail() {
        let mut queue = ActionQueue::new();
        let sender = queue.sender();
        queue.push("local");
        assert!(sender.send("remote"));
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.collect_arrivals(), 1);
        assert_eq!(queue.pop(), Some("local"));
        assert_eq!(queue.pop(), Some("remote"));
    }

    #[test]
    fn test_wait_for_arrival_from_thread() {
        let mut queue = ActionQueue::new();
        let sender = queue.sender();
        let handle = thread::spawn(move || {
            for i in 0..10 {
                sender.send(i);
            }
        });

        let mut received = Vec::new();
        while received.len() < 10 {
            assert!(queue.wait_for_arrival(Duration::from_secs(5)));
            while let Some(value) = queue.pop() {
                received.push(value);
            }
        }
        handle.join().unwrap();
        assert_eq!(received, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_wait_times_out_without_senders() {
        let mut queue: ActionQueue<u8> = ActionQueue::new();
        assert!(!queue.wait_for_arrival(Duration::from_millis(10)));
    }
}
