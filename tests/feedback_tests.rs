//! Feedback queue, auto-stop timer and bridge behaviour.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use padbridge::adapter::Adapter;
use padbridge::config::AdapterConfig;
use padbridge::controller::GenericHidDecoder;
use padbridge::feedback::{
    FbType, FeedbackQueue, FeedbackTimers, FeedbackWorker, GenericFb, RawFeedback, WirelessFeedback,
    FEEDBACK_QUEUE_DEPTH,
};
use padbridge::wired::WiredSystem;
use tokio_util::sync::CancellationToken;

fn rumble_on(port: u8, duration_us: u32) -> RawFeedback {
    let mut payload = vec![1u8];
    payload.extend_from_slice(&duration_us.to_le_bytes());
    RawFeedback::new(port, FbType::Rumble, &payload)
}

#[test]
fn test_overflow_keeps_earliest_entries_in_order() {
    let queue = FeedbackQueue::new();
    for i in 0..(FEEDBACK_QUEUE_DEPTH + 5) {
        queue.submit(RawFeedback::new(0, FbType::Rumble, &[i as u8]));
    }

    assert_eq!(queue.dropped(), 5);
    let kept: Vec<u8> = std::iter::from_fn(|| queue.pop()).map(|r| r.payload()[0]).collect();
    let expected: Vec<u8> = (0..FEEDBACK_QUEUE_DEPTH as u8).collect();
    assert_eq!(kept, expected);
}

#[test]
fn test_concurrent_submit_never_exceeds_capacity() {
    let queue = Arc::new(FeedbackQueue::new());
    let num_threads = 8;
    let per_thread = 1_000;

    let handles: Vec<_> = (0..num_threads)
        .map(|t| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for _ in 0..per_thread {
                    queue.submit(RawFeedback::stop(t as u8));
                }
            })
        })
        .collect();

    let mut popped = 0u64;
    for handle in handles {
        assert!(handle.join().is_ok(), "thread panicked unexpectedly");
    }
    while queue.pop().is_some() {
        popped += 1;
    }

    assert!(popped <= FEEDBACK_QUEUE_DEPTH as u64);
    assert_eq!(popped + queue.dropped(), (num_threads * per_thread) as u64);
}

#[tokio::test(start_paused = true)]
async fn test_start_with_duration_auto_stops_once() {
    let queue = Arc::new(FeedbackQueue::new());
    let mut timers = FeedbackTimers::new(Arc::clone(&queue), 4);

    assert!(timers.start(2, Duration::from_micros(200_000)));
    assert!(!timers.start(2, Duration::from_micros(200_000)));

    tokio::time::sleep(Duration::from_millis(250)).await;

    assert_eq!(queue.pop(), Some(RawFeedback::stop(2)));
    assert_eq!(queue.pop(), None);
}

struct Counter(Arc<AtomicUsize>, Arc<AtomicUsize>);

impl WirelessFeedback for Counter {
    fn send(&mut self, fb: &GenericFb) {
        if fb.state {
            self.0.fetch_add(1, Ordering::SeqCst);
        } else {
            self.1.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_adapter_feedback_round_trip() {
    let adapter = Adapter::create(AdapterConfig::default(), Arc::new(GenericHidDecoder))
        .configure(WiredSystem::Vampire4Sa)
        .expect("vampire4sa configured");
    let bridge = adapter.feedback_bridge().expect("bridge for configured device");

    let on = Arc::new(AtomicUsize::new(0));
    let off = Arc::new(AtomicUsize::new(0));
    let mut worker = FeedbackWorker::new(adapter.feedback_queue(), bridge);
    worker
        .bridge_mut()
        .bind_peer(0, Box::new(Counter(Arc::clone(&on), Arc::clone(&off))));

    let shutdown = CancellationToken::new();
    let handle = worker.spawn(shutdown.clone());

    adapter.submit_feedback(rumble_on(0, 200_000));
    adapter.submit_feedback(rumble_on(3, 200_000));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(on.load(Ordering::SeqCst), 1);
    assert_eq!(off.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(off.load(Ordering::SeqCst), 1);

    shutdown.cancel();
    assert!(handle.await.is_ok());
}
