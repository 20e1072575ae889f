//! Remapping of the canonical input state onto canonical port states.
//!
//! The remap table of a wireless source is an ordered list of [`MapRule`]s.
//! [`run_mapping_cycle`] applies it once per incoming report and returns the
//! [`PortMask`] of wired ports that need encoding.

pub mod engine;
pub mod rule;

pub use engine::run_mapping_cycle;
pub use rule::{Algorithm, InputConfig, MapRule, PortMask};
