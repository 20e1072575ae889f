//! Auto-stop timers
//!
//! Many consoles start rumble and never ask for it to stop. Starting an
//! effect arms a one-shot timer per port that submits a stop request onto
//! the feedback queue when it expires.
//!
//! Timers run on the tokio runtime that was current when [`FeedbackTimers`]
//! was built, so the consumer may dispatch from any thread. Without a
//! runtime no timer can be armed and effects only stop on request.

use super::{FeedbackQueue, RawFeedback};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

#[derive(Debug)]
pub struct FeedbackTimers {
    queue: Arc<FeedbackQueue>,
    runtime: Option<Handle>,
    handles: Vec<Option<JoinHandle<()>>>,
}

impl FeedbackTimers {
    pub fn new(queue: Arc<FeedbackQueue>, ports: usize) -> Self {
        Self {
            queue,
            runtime: Handle::try_current().ok(),
            handles: (0..ports).map(|_| None).collect(),
        }
    }

    /// Arms the timer of `port`
    ///
    /// Returns `false` without touching the running timer if one is already
    /// armed, if the port does not exist, or if no tokio runtime is
    /// reachable.
    pub fn start(&mut self, port: u8, duration: Duration) -> bool {
        let Some(slot) = self.handles.get_mut(port as usize) else {
            return false;
        };
        if slot.as_ref().is_some_and(|h| !h.is_finished()) {
            trace!("Feedback timer of port {} already armed", port);
            return false;
        }
        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            warn!("No runtime for the feedback timer of port {}, effect will not auto-stop", port);
            return false;
        };

        let queue = Arc::clone(&self.queue);
        *slot = Some(runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            debug!("Feedback timer of port {} expired, stopping effect", port);
            queue.submit(RawFeedback::stop(port));
        }));
        true
    }

    /// Cancels and releases the timer of `port`, armed or not
    pub fn stop(&mut self, port: u8) {
        if let Some(handle) = self.handles.get_mut(port as usize).and_then(Option::take) {
            handle.abort();
        }
    }

    pub fn is_armed(&self, port: u8) -> bool {
        self.handles
            .get(port as usize)
            .and_then(Option::as_ref)
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for FeedbackTimers {
    fn drop(&mut self) {
        for handle in self.handles.iter_mut().filter_map(Option::take) {
            handle.abort();
        }
    }
}
