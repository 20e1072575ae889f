//! Bounded feedback queue
//!
//! Push and pop never block and never allocate after construction, so the
//! transmit path and timer tasks can submit from any context. Requests
//! arriving while the queue is full are dropped; feedback is best effort.

use super::RawFeedback;
use crossbeam::queue::ArrayQueue;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// Default number of pending feedback requests
pub const FEEDBACK_QUEUE_DEPTH: usize = 16;

#[derive(Debug)]
pub struct FeedbackQueue {
    ring: ArrayQueue<RawFeedback>,
    dropped: AtomicU64,
}

impl Default for FeedbackQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackQueue {
    pub fn new() -> Self {
        Self::with_capacity(FEEDBACK_QUEUE_DEPTH)
    }

    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ring: ArrayQueue::new(capacity),
            dropped: AtomicU64::new(0),
        }
    }

    /// Enqueues a request, dropping it when full
    #[inline]
    pub fn submit(&self, request: RawFeedback) {
        if self.try_submit(request).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            trace!("Feedback queue full, dropped request for port {}", request.wired_id);
        }
    }

    /// Enqueues a request, handing it back when full
    #[inline]
    pub fn try_submit(&self, request: RawFeedback) -> Result<(), RawFeedback> {
        self.ring.push(request)
    }

    #[inline]
    pub fn pop(&self) -> Option<RawFeedback> {
        self.ring.pop()
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Requests dropped since construction
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
