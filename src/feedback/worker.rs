//! Feedback consumer task

use super::{FeedbackBridge, FeedbackQueue};
use std::sync::Arc;
use std::time::Duration;
use tokio::{select, task::JoinHandle, time};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Default polling cadence of the feedback queue
pub const FEEDBACK_POLL_INTERVAL: Duration = Duration::from_millis(4);

/// Drains the feedback queue at a fixed cadence and dispatches every request
pub struct FeedbackWorker {
    queue: Arc<FeedbackQueue>,
    bridge: FeedbackBridge,
}

impl FeedbackWorker {
    pub fn new(queue: Arc<FeedbackQueue>, bridge: FeedbackBridge) -> Self {
        Self { queue, bridge }
    }

    pub fn bridge_mut(&mut self) -> &mut FeedbackBridge {
        &mut self.bridge
    }

    /// Dispatches everything currently queued, returns the number of sends
    ///
    /// May be called from any thread. Auto-stop timers are only armed when a
    /// tokio runtime was reachable when the bridge's timers were built or is
    /// current at the call.
    pub fn drain(&mut self) -> usize {
        let mut sent = 0;
        while let Some(raw) = self.queue.pop() {
            if self.bridge.dispatch(&raw) {
                sent += 1;
            }
        }
        sent
    }

    /// Runs until `shutdown` is cancelled, handing the bridge back
    pub fn spawn(mut self, shutdown: CancellationToken) -> JoinHandle<FeedbackBridge> {
        tokio::spawn(async move {
            info!("Feedback worker started, polling every {:?}", FEEDBACK_POLL_INTERVAL);
            let mut ticker = time::interval(FEEDBACK_POLL_INTERVAL);
            ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

            loop {
                select! {
                    _ = shutdown.cancelled() => {
                        info!("Feedback worker stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        let sent = self.drain();
                        if sent > 0 {
                            debug!("Forwarded {} feedback request(s)", sent);
                        }
                    }
                }
            }
            self.bridge
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::{FbType, FeedbackTimers, GenericFb, RawFeedback, WirelessFeedback};
    use crate::wired::{DeviceMode, Vampire4Sa};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter(Arc<AtomicUsize>);

    impl WirelessFeedback for Counter {
        fn send(&mut self, _fb: &GenericFb) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn worker_forwards_and_auto_stops() {
        let queue = Arc::new(FeedbackQueue::new());
        let timers = FeedbackTimers::new(Arc::clone(&queue), 1);
        let bridge = FeedbackBridge::new(Arc::new(Vampire4Sa), vec![DeviceMode::Pad], timers);
        let mut worker = FeedbackWorker::new(Arc::clone(&queue), bridge);
        let count = Arc::new(AtomicUsize::new(0));
        worker.bridge_mut().bind_peer(0, Box::new(Counter(Arc::clone(&count))));

        let shutdown = CancellationToken::new();
        let handle = worker.spawn(shutdown.clone());

        let mut on = vec![1u8];
        on.extend_from_slice(&200_000u32.to_le_bytes());
        queue.submit(RawFeedback::new(0, FbType::Rumble, &on));

        time::sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // start forwarded, then the synthesized stop after 200ms
        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        shutdown.cancel();
        let bridge = handle.await.ok();
        assert!(bridge.is_some_and(|b| !b.timers().is_armed(0)));
    }
}
