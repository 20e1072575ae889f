//! Bluetooth controller to legacy console adapter core
//!
//! Wireless reports are normalized into a canonical controller state,
//! remapped per wired port and serialized into console wire buffers.
//! Console feedback travels the other way through a bounded queue.

pub mod adapter;
pub mod config;
pub mod controller;
pub mod error;
pub mod feedback;
pub mod mapping;
pub mod wired;

pub use adapter::{Adapter, Bridging, Unconfigured};
pub use config::AdapterConfig;
pub use error::AdapterError;
