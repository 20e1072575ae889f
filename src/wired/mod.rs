//! Wired console side
//!
//! Every supported console implements [`WiredDevice`]; the configured
//! [`WiredSystem`] picks the implementation and each port's [`DeviceMode`]
//! picks the calibration tables and wire layout inside it.
//!
//! # Per-cycle contract
//!
//! ```text
//! meta_init(all ports) ──► mapping cycle ──► encode(port) for each updated port
//!                                                  │
//!                                            [WiredData] ──► transmit path
//! ```
//!
//! Encoders see every port's buffer: consoles that multiplex several
//! controllers into one frame write each port into the shared buffer.
//!
//! [`WiredData`] is shared with the transmit path, which may run from
//! interrupt context, so all of its fields are atomics.

pub mod vampire4sa;

use crate::controller::generic::GenericCtrl;
use crate::feedback::{GenericFb, RawFeedback};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};
use std::sync::Arc;

pub use vampire4sa::Vampire4Sa;

/// Number of wired ports handled by the adapter
pub const WIRED_MAX_DEV: usize = 4;

/// Words of packed output per port
pub const WIRED_OUTPUT_WORDS: usize = 4;

/// Relative pointing accumulators per port
pub const WIRED_ACCUMULATORS: usize = 2;

/// Peripheral a wired port emulates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceMode {
    #[default]
    Pad,
    PadAlt,
    Mouse,
    Keyboard,
}

impl Display for DeviceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceMode::Pad => write!(f, "pad"),
            DeviceMode::PadAlt => write!(f, "pad-alt"),
            DeviceMode::Mouse => write!(f, "mouse"),
            DeviceMode::Keyboard => write!(f, "keyboard"),
        }
    }
}

/// Console the adapter is plugged into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WiredSystem {
    /// Not detected yet, nothing is bridged
    #[default]
    Auto,
    #[serde(rename = "vampire4sa")]
    Vampire4Sa,
}

impl WiredSystem {
    /// Encoder set of this system, `None` while undetected
    pub fn device(self) -> Option<Arc<dyn WiredDevice>> {
        match self {
            WiredSystem::Auto => None,
            WiredSystem::Vampire4Sa => Some(Arc::new(Vampire4Sa)),
        }
    }
}

impl Display for WiredSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WiredSystem::Auto => write!(f, "auto"),
            WiredSystem::Vampire4Sa => write!(f, "vampire4sa"),
        }
    }
}

/// Encoder/decoder set of one console
pub trait WiredDevice: Send + Sync {
    fn name(&self) -> &'static str;

    /// Resets every output state and binds masks and calibration per port
    fn meta_init(&self, modes: &[DeviceMode], outputs: &mut [GenericCtrl]);

    /// Writes the idle wire image of a port
    fn init_buffer(&self, mode: DeviceMode, data: &WiredData);

    /// Serializes the canonical state of port `ctrl.index` into the wire
    /// buffers
    fn encode(&self, mode: DeviceMode, ctrl: &GenericCtrl, buffers: &[WiredData]);

    /// Snapshot the transmit path sends on the console's next latch of `port`
    fn latch(&self, _port: u8, _mode: DeviceMode, _buffers: &[WiredData]) -> Option<Latch> {
        None
    }

    /// Converts a console feedback request into canonical form
    ///
    /// The default understands the generic rumble payload:
    /// `[on, duration_us (u32 LE)]`, an empty payload meaning stop.
    fn decode_feedback(&self, _mode: DeviceMode, raw: &RawFeedback) -> GenericFb {
        let payload = raw.payload();
        let state = payload.first().map(|b| *b != 0).unwrap_or(false);
        let duration_us = match payload.get(1..5) {
            Some(bytes) => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as u64,
            None => 0,
        };
        GenericFb {
            wired_id: raw.wired_id,
            fb_type: raw.fb_type,
            state,
            duration_us: if state { duration_us } else { 0 },
        }
    }
}

/// Command byte and payload sent on a console latch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latch {
    pub cmd: u8,
    /// Sent MSB first
    pub payload: u32,
}

/// Pointing-device axis accumulator shared with the transmit path
///
/// The encoder adds relative deltas or stores absolute positions, the
/// transmit path takes the value. Relative values are cleared on take.
#[derive(Debug, Default)]
pub struct AxisAccumulator {
    value: AtomicI32,
    relative: AtomicBool,
}

impl AxisAccumulator {
    pub fn reset(&self, relative: bool) {
        self.relative.store(relative, Ordering::Release);
        self.value.store(0, Ordering::Release);
    }

    /// Adds a relative delta, saturating at the i32 range
    pub fn add(&self, delta: i32) {
        self.relative.store(true, Ordering::Release);
        // fetch_update only fails when the closure returns None
        let _ = self
            .value
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| Some(v.saturating_add(delta)));
    }

    /// Stores an absolute position
    pub fn set(&self, value: i32) {
        self.relative.store(false, Ordering::Release);
        self.value.store(value, Ordering::Release);
    }

    pub fn is_relative(&self) -> bool {
        self.relative.load(Ordering::Acquire)
    }

    /// Reads the value, clearing it when relative
    pub fn take(&self) -> i32 {
        if self.is_relative() {
            self.value.swap(0, Ordering::AcqRel)
        } else {
            self.value.load(Ordering::Acquire)
        }
    }

    /// [`take`](Self::take) clamped to a signed byte
    pub fn take_i8(&self) -> i8 {
        self.take().clamp(i8::MIN as i32, i8::MAX as i32) as i8
    }
}

/// Wire image of one port
#[derive(Debug, Default)]
pub struct WiredData {
    pub index: u8,
    output: [AtomicU32; WIRED_OUTPUT_WORDS],
    accumulators: [AxisAccumulator; WIRED_ACCUMULATORS],
}

impl WiredData {
    pub fn new(index: u8) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    pub fn word(&self, idx: usize) -> u32 {
        self.output[idx].load(Ordering::Acquire)
    }

    pub fn store_word(&self, idx: usize, value: u32) {
        self.output[idx].store(value, Ordering::Release);
    }

    /// Sets `set` and clears `clear` in one atomic step
    pub fn update_word(&self, idx: usize, set: u32, clear: u32) -> u32 {
        let prev = self.output[idx]
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| Some((v & !clear) | set))
            .unwrap_or_else(|v| v);
        (prev & !clear) | set
    }

    pub fn accumulator(&self, idx: usize) -> &AxisAccumulator {
        &self.accumulators[idx]
    }
}

/// Wire images of every port, shared between the encoder and transmit sides
pub type WiredBuffers = Arc<[WiredData]>;

/// Allocates `count` port buffers
pub fn wired_buffers(count: usize) -> WiredBuffers {
    (0..count).map(|i| WiredData::new(i as u8)).collect()
}
