//! Feedback (rumble) return path
//!
//! ```text
//! console ──RawFeedback──► FeedbackQueue ──► FeedbackWorker ──► FeedbackBridge ──► wireless peer
//!                              ▲                                     │
//!                              └──────── stop on expiry ── FeedbackTimers
//! ```
//!
//! The queue is the only piece touched from the transmit side; everything
//! after it runs on the worker task.

pub mod bridge;
pub mod queue;
pub mod timer;
pub mod worker;

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

pub use bridge::{FeedbackBridge, WirelessFeedback};
pub use queue::{FeedbackQueue, FEEDBACK_QUEUE_DEPTH};
pub use timer::FeedbackTimers;
pub use worker::FeedbackWorker;

/// Payload capacity of a raw feedback request
pub const RAW_FB_DATA_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FbType {
    #[default]
    Rumble,
    PlayerLed,
}

impl Display for FbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FbType::Rumble => write!(f, "rumble"),
            FbType::PlayerLed => write!(f, "player-led"),
        }
    }
}

/// Console-side feedback request
///
/// Fixed size so it can be queued without allocating. A zero-length
/// payload is a stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFeedback {
    pub wired_id: u8,
    pub fb_type: FbType,
    pub data_len: u8,
    pub data: [u8; RAW_FB_DATA_LEN],
}

impl RawFeedback {
    /// Builds a request, truncating `payload` to [`RAW_FB_DATA_LEN`]
    pub fn new(wired_id: u8, fb_type: FbType, payload: &[u8]) -> Self {
        let len = payload.len().min(RAW_FB_DATA_LEN);
        let mut data = [0u8; RAW_FB_DATA_LEN];
        data[..len].copy_from_slice(&payload[..len]);
        Self {
            wired_id,
            fb_type,
            data_len: len as u8,
            data,
        }
    }

    /// Zero-length rumble request, as synthesized by the auto-stop timer
    pub fn stop(wired_id: u8) -> Self {
        Self::new(wired_id, FbType::Rumble, &[])
    }

    pub fn payload(&self) -> &[u8] {
        &self.data[..(self.data_len as usize).min(RAW_FB_DATA_LEN)]
    }

    pub fn is_stop(&self) -> bool {
        self.data_len == 0
    }
}

/// Canonical feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenericFb {
    pub wired_id: u8,
    pub fb_type: FbType,
    /// Effect on or off
    pub state: bool,
    /// Requested effect length, 0 when unbounded or off
    pub duration_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_feedback_truncates_payload() {
        let long = [0xAAu8; RAW_FB_DATA_LEN + 8];
        let raw = RawFeedback::new(1, FbType::Rumble, &long);
        assert_eq!(raw.payload().len(), RAW_FB_DATA_LEN);
        assert!(!raw.is_stop());
    }

    #[test]
    fn stop_request_is_empty_rumble() {
        let raw = RawFeedback::stop(3);
        assert_eq!(raw.wired_id, 3);
        assert_eq!(raw.fb_type, FbType::Rumble);
        assert!(raw.is_stop());
        assert!(raw.payload().is_empty());
    }
}
