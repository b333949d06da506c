//! Nullable infrastructure for deterministic testing.
//!
//! Inspired by the "A-frame architecture" pattern from RsNano.
//! Backends and devices are abstracted behind traits; this crate provides
//! test-friendly implementations that:
//! - Deliver pre-configured values
//! - Record how they were driven
//! - Never touch real compute devices
//!
//! Usage: put nullables in a `Pool` or drive them against a `RaceContext`.

pub mod backend;
pub mod device;

pub use backend::{FailingBackend, NullBackend};
pub use device::SoftwareDevice;
