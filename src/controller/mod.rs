//! Canonical controller representation
//!
//! Decouples wireless input sources from wired output encoders:
//!
//! 1. [`button_id`] - Button/axis identity space and sign conventions
//! 2. [`generic`] - Canonical controller state and calibration metadata
//! 3. [`wireless`] - Normalization boundary for wireless reports
//!
//! # Architecture
//!
//! ```text
//! Wireless report ──► WirelessDecoder ──► GenericCtrl (input)
//!                                              │
//!                                        mapping engine
//!                                              ▼
//!                                   GenericCtrl (one per port) ──► WiredDevice
//! ```

pub mod button_id;
pub mod generic;
pub mod wireless;

pub use button_id::{axis_of, axis_to_endpoint_mask, sign, AxisId, ButtonId};
pub use generic::{AxisState, CtrlMeta, GenericCtrl};
pub use wireless::{GenericHidDecoder, WirelessDecoder};
