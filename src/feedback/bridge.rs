//! Console feedback to wireless peers

use super::{FbType, FeedbackTimers, GenericFb, RawFeedback};
use crate::wired::{DeviceMode, WiredDevice};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// Feedback encoder of a connected wireless controller
pub trait WirelessFeedback: Send {
    fn send(&mut self, fb: &GenericFb);
}

/// Routes decoded feedback to the wireless peer bound to each wired port
pub struct FeedbackBridge {
    device: Arc<dyn WiredDevice>,
    modes: Vec<DeviceMode>,
    peers: Vec<Option<Box<dyn WirelessFeedback>>>,
    timers: FeedbackTimers,
}

impl FeedbackBridge {
    pub fn new(device: Arc<dyn WiredDevice>, modes: Vec<DeviceMode>, timers: FeedbackTimers) -> Self {
        let peers = modes.iter().map(|_| None).collect();
        Self {
            device,
            modes,
            peers,
            timers,
        }
    }

    /// Binds a wireless peer to `port`, replacing any previous one
    pub fn bind_peer(&mut self, port: u8, peer: Box<dyn WirelessFeedback>) -> bool {
        match self.peers.get_mut(port as usize) {
            Some(slot) => {
                *slot = Some(peer);
                true
            }
            None => false,
        }
    }

    pub fn unbind_peer(&mut self, port: u8) -> Option<Box<dyn WirelessFeedback>> {
        self.peers.get_mut(port as usize).and_then(Option::take)
    }

    /// Port modes captured when the bridge was built
    pub fn modes(&self) -> &[DeviceMode] {
        &self.modes
    }

    pub fn timers(&self) -> &FeedbackTimers {
        &self.timers
    }

    /// Decodes one request and forwards it to the port's peer
    ///
    /// Bounded rumble arms the port's auto-stop timer, any other rumble
    /// releases it. Other feedback types leave the timer alone. Safe to call
    /// outside a tokio runtime, in which case no timer is armed (see
    /// [`FeedbackTimers::start`]). Returns whether a wireless send was
    /// attempted.
    pub fn dispatch(&mut self, raw: &RawFeedback) -> bool {
        let port = raw.wired_id;
        let Some(mode) = self.modes.get(port as usize).copied() else {
            trace!("Feedback for unknown port {}", port);
            return false;
        };

        let fb = self.device.decode_feedback(mode, raw);
        if fb.fb_type == FbType::Rumble {
            if fb.state && fb.duration_us > 0 {
                self.timers.start(port, Duration::from_micros(fb.duration_us));
            } else {
                self.timers.stop(port);
            }
        }

        match self.peers.get_mut(port as usize).and_then(Option::as_mut) {
            Some(peer) => {
                debug!(
                    "Forwarding {} {} to port {} peer",
                    fb.fb_type,
                    if fb.state { "on" } else { "off" },
                    port
                );
                peer.send(&fb);
                true
            }
            None => false,
        }
    }
}
