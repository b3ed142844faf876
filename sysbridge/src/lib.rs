//! Core of a host-metrics publish/subscribe bridge.
//!
//! A publisher samples the host and broadcasts one JSON snapshot over a
//! durable fanout exchange; a consumer holds only the most recent
//! snapshot and rebroadcasts it to any number of WebSocket viewers on a
//! fixed cadence. This crate carries everything both binaries share:
//! the wire type, the latest-value cache, the broker adapter, the
//! sampler, and the viewer session loop.

pub mod broker;
pub mod cache;
pub mod config;
pub mod error;
pub mod publish;
pub mod sampler;
pub mod snapshot;
pub mod viewer;

pub use broker::BrokerConfig;
pub use cache::LatestValueCache;
pub use error::{PublishError, SampleError, SubscribeError};
pub use sampler::MetricsSource;
pub use snapshot::{DiskUsage, MemoryUsage, Snapshot};
pub use viewer::ViewerState;
