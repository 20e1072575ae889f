//! Error types of the adapter core

use thiserror::Error;

/// Errors surfaced by the adapter core
///
/// None of these are fatal; the caller drops the offending report or
/// configuration and keeps going.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// The wireless payload could not be normalized; the cycle is abandoned
    #[error("unsupported report: {0}")]
    UnsupportedReport(String),

    /// A report arrived for a wireless source with no remap table
    #[error("unknown wireless device: {0}")]
    UnknownDevice(u8),

    /// The configuration cannot be applied
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
