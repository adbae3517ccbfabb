use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    #[error("buffer closed while waiting for capacity")]
    Closed,
}

#[derive(Debug)]
struct State<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// FIFO queue with a fixed capacity.
///
/// `put` blocks while the buffer is full and is the only suspending call;
/// `poll` never blocks. Closing the buffer wakes every blocked producer with
/// [`BufferError::Closed`].
#[derive(Debug)]
pub struct BoundedBuffer<T> {
    capacity: usize,
    state: Mutex<State<T>>,
    not_full: Condvar,
}

impl<T> BoundedBuffer<T> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        let capacity = capacity.get();
        Self {
            capacity,
            state: Mutex::new(State {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_full: Condvar::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn put(&self, item: T) -> Result<(), BufferError> {
        let mut state = self.state.lock();
        while state.items.len() >= self.capacity && !state.closed {
            self.not_full.wait(&mut state);
        }
        if state.closed {
            return Err(BufferError::Closed);
        }
        state.items.push_back(item);
        Ok(())
    }

    pub fn poll(&self) -> Option<T> {
        let item = self.state.lock().items.pop_front();
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    /// Removes up to `max` items in FIFO order.
    pub fn drain_up_to(&self, max: usize) -> Vec<T> {
        let drained: Vec<T> = {
            let mut state = self.state.lock();
            let n = max.min(state.items.len());
            state.items.drain(..n).collect()
        };
        if !drained.is_empty() {
            self.not_full.notify_all();
        }
        drained
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn close(&self) {
        self.state.lock().closed = true;
        self.not_full.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}
