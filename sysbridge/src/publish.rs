//! The publish trigger: sample, encode, broadcast.

use tracing::info;

use crate::broker::{publish_raw, BrokerConfig};
use crate::error::PublishError;
use crate::sampler::MetricsSource;
use crate::snapshot::Snapshot;

/// Sample the host and publish the snapshot to the fanout exchange.
///
/// Stateless per call: each trigger samples fresh, opens its own broker
/// connection, and surfaces any failure to the caller without retrying.
/// Returns the published snapshot so the trigger surface can echo it.
pub async fn publish_current_metrics(
    source: &MetricsSource,
    broker: &BrokerConfig,
) -> Result<Snapshot, PublishError> {
    let snapshot = source.sample().await?;
    let payload = serde_json::to_vec(&snapshot)?;
    publish_raw(broker, &payload).await?;
    info!(timestamp = %snapshot.timestamp, "metrics snapshot published");
    Ok(snapshot)
}
