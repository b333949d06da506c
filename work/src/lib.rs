//! Block-lattice proof-of-work.
//!
//! A work value is an 8-byte nonce whose Blake2b-64 digest against a
//! 32-byte root meets a difficulty threshold. Not mining: a small
//! computational cost attached to every block as spam protection.
//!
//! Generation races one or more [`WorkBackend`]s over a shared
//! [`RaceContext`]; the first verified candidate wins and the rest are
//! cancelled. [`Pool`] wires this up for a set of backends.

pub mod accelerator;
pub mod backend;
pub mod config;
pub mod context;
pub mod cpu;
pub mod difficulty;
pub mod error;
pub mod pool;
pub mod validator;

pub use accelerator::{discover_devices, AcceleratorBackend, AcceleratorDevice};
pub use backend::{UnsupportedBackend, WorkBackend};
pub use config::WorkConfig;
pub use context::{DeliveryStats, RaceContext};
pub use cpu::CpuBackend;
pub use difficulty::{
    compute_difficulty, multiplier_of, V1_BASE_DIFFICULTY, V2_BASE_DIFFICULTY,
    V2_RECEIVE_DIFFICULTY,
};
pub use error::WorkError;
pub use pool::{default_pool, generate_work, PendingWork, Pool, PoolBuilder};
pub use validator::{is_valid, work_value};

pub use latticepow_types::{Difficulty, Root, Work};

/// Copy up to 8 bytes into a [`Work`], zero-padding or truncating.
pub fn new_work(bytes: &[u8]) -> Work {
    Work::new(bytes)
}
