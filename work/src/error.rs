use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkError {
    #[error("that backend does not support this type of work method")]
    NotSupported,

    #[error("no accelerator device found")]
    NoDeviceAvailable,

    #[error("no default pool available")]
    NoDefaultPoolAvailable,

    #[error("pool has no backends configured")]
    EmptyPool,

    #[error("work generation cancelled")]
    Cancelled,

    #[error("work generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("all {racers} backends failed, last error: {last}")]
    AllBackendsFailed { racers: usize, last: String },

    #[error("backend {backend} failed: {reason}")]
    Backend { backend: String, reason: String },

    #[error("config error: {0}")]
    Config(String),
}
