//! Adapter context
//!
//! Owns the canonical input state, the per-port output states and wire
//! buffers, and the feedback queue. Nothing is bridged until a wired system
//! has been configured:
//!
//! ```text
//! Adapter<Unconfigured> ──configure(system)──► Adapter<Bridging> ──bridge(dev_id, report)──► PortMask
//!          ▲                                          │
//!          └───────────────── disconnect ─────────────┘
//! ```

use crate::config::AdapterConfig;
use crate::controller::{GenericCtrl, WirelessDecoder};
use crate::error::AdapterError;
use crate::feedback::{FeedbackBridge, FeedbackQueue, FeedbackTimers, RawFeedback};
use crate::mapping::{run_mapping_cycle, PortMask};
use crate::wired::{wired_buffers, DeviceMode, Latch, WiredBuffers, WiredDevice, WiredSystem, WIRED_MAX_DEV};
use statum::{machine, state};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

#[state]
#[derive(Debug, Clone)]
pub enum AdapterState {
    Unconfigured,
    Bridging,
}

#[machine]
pub struct Adapter<S: AdapterState> {
    config: AdapterConfig,
    modes: [DeviceMode; WIRED_MAX_DEV],
    input: GenericCtrl,
    outputs: [GenericCtrl; WIRED_MAX_DEV],
    device: Option<Arc<dyn WiredDevice>>,
    buffers: WiredBuffers,
    decoder: Arc<dyn WirelessDecoder>,
    queue: Arc<FeedbackQueue>,
}

impl<S: AdapterState> Adapter<S> {
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn modes(&self) -> &[DeviceMode; WIRED_MAX_DEV] {
        &self.modes
    }

    /// Wire buffers, shared with the transmit path
    pub fn buffers(&self) -> WiredBuffers {
        Arc::clone(&self.buffers)
    }

    pub fn feedback_queue(&self) -> Arc<FeedbackQueue> {
        Arc::clone(&self.queue)
    }

    /// Queues a console feedback request, dropping it when the queue is full
    pub fn submit_feedback(&self, request: RawFeedback) {
        self.queue.submit(request);
    }
}

impl Adapter<Unconfigured> {
    pub fn create(config: AdapterConfig, decoder: Arc<dyn WirelessDecoder>) -> Self {
        let modes = config.modes();
        Self::new(
            config,
            modes,
            GenericCtrl::new(0),
            std::array::from_fn(|i| GenericCtrl::new(i as u8)),
            None,
            wired_buffers(WIRED_MAX_DEV),
            decoder,
            Arc::new(FeedbackQueue::new()),
        )
    }

    /// Selects the wired system and writes the idle image of every port
    ///
    /// `WiredSystem::Auto` keeps the system named in the configuration.
    pub fn configure(mut self, system: WiredSystem) -> Result<Adapter<Bridging>, AdapterError> {
        if system != WiredSystem::Auto {
            self.config.system = system;
        }
        self.config.validate()?;

        let device = self.config.system.device().ok_or_else(|| {
            AdapterError::InvalidConfig("no wired system detected or configured".to_string())
        })?;

        self.modes = self.config.modes();
        for (mode, data) in self.modes.iter().zip(self.buffers.iter()) {
            device.init_buffer(*mode, data);
        }
        info!(
            "Bridging to {} with {} decoder, modes {:?}",
            device.name(),
            self.decoder.name(),
            self.modes
        );

        self.device = Some(device);
        Ok(self.transition())
    }
}

impl Adapter<Bridging> {
    /// Runs one mapping cycle for a report of wireless source `dev_id`
    ///
    /// Returns the ports whose wire buffers were updated. A report the
    /// decoder rejects abandons the cycle before any output is touched.
    pub fn bridge(&mut self, dev_id: u8, raw: &[u8]) -> Result<PortMask, AdapterError> {
        let Some(device) = self.device.as_ref() else {
            return Err(AdapterError::InvalidConfig("adapter has no wired device".to_string()));
        };
        let table = self
            .config
            .input(dev_id)
            .ok_or(AdapterError::UnknownDevice(dev_id))?;

        if let Err(e) = self.decoder.decode(raw, &mut self.input) {
            debug!("Dropping report from source {}: {}", dev_id, e);
            return Err(e);
        }
        self.input.index = dev_id;

        device.meta_init(&self.modes, &mut self.outputs);
        let updated = run_mapping_cycle(&self.input, table.rules(), &mut self.outputs);

        for port in updated.ports() {
            let idx = port as usize;
            device.encode(self.modes[idx], &self.outputs[idx], &self.buffers);
        }
        trace!("Source {} updated ports {:#06b}", dev_id, updated.0);
        Ok(updated)
    }

    pub fn device(&self) -> Option<Arc<dyn WiredDevice>> {
        self.device.clone()
    }

    /// Canonical state of a port as left by the last cycle
    pub fn output(&self, port: u8) -> Option<&GenericCtrl> {
        self.outputs.get(port as usize)
    }

    /// Transmit-side snapshot of a port
    pub fn latch(&self, port: u8) -> Option<Latch> {
        let device = self.device.as_ref()?;
        device.latch(port, *self.modes.get(port as usize)?, &self.buffers)
    }

    /// Builds the feedback bridge of the configured device
    ///
    /// The bridge keeps the port modes of this configuration. After
    /// [`disconnect`](Self::disconnect) and a new `configure`, build a fresh
    /// bridge; an older one keeps decoding with the previous modes.
    pub fn feedback_bridge(&self) -> Option<FeedbackBridge> {
        let device = self.device.clone()?;
        let timers = FeedbackTimers::new(self.feedback_queue(), WIRED_MAX_DEV);
        Some(FeedbackBridge::new(device, self.modes.to_vec(), timers))
    }

    /// Drops the wired system, e.g. when the console is unplugged
    ///
    /// Feedback bridges built from this configuration become stale.
    pub fn disconnect(mut self) -> Adapter<Unconfigured> {
        warn!("Wired system disconnected");
        self.device = None;
        self.config.system = WiredSystem::Auto;
        self.transition()
    }
}
