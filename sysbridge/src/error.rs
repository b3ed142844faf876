//! Error taxonomy for the bridge core.
//!
//! Session I/O failures deliberately have no variant here: a broken
//! viewer connection ends that one session inside `viewer` and is never
//! propagated.

use std::path::PathBuf;

use thiserror::Error;

/// The metrics source could not produce a snapshot.
#[derive(Debug, Error)]
pub enum SampleError {
    /// The configured mount point was not found among the host's disks.
    #[error("mount point {0:?} not found in disk list")]
    MountPointMissing(PathBuf),
}

/// A publish trigger failed. Terminal per-call; the caller retries by
/// triggering again.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("metrics sampling failed: {0}")]
    SamplingFailed(#[from] SampleError),

    #[error("broker unavailable: {0}")]
    BrokerUnavailable(#[from] lapin::Error),

    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The consumer's broker link failed. Fatal for this consumer instance;
/// reconnection policy belongs to process supervision.
#[derive(Debug, Error)]
pub enum SubscribeError {
    #[error("broker unavailable: {0}")]
    BrokerUnavailable(#[from] lapin::Error),

    #[error("broker delivery stream ended")]
    DeliveryStreamClosed,
}
