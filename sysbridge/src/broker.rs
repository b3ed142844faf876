//! Thin adapter over the AMQP fanout exchange.
//!
//! The broker owns topology and delivery semantics; this module only
//! issues idempotent declares, publishes raw payloads, and runs the
//! consumer's single long-lived subscription. Deliveries are consumed
//! with `no_ack` — acknowledged on receipt, loss tolerated, because
//! only the latest value matters.

use std::sync::Arc;

use futures_util::StreamExt;
use lapin::{
    options::{
        BasicConsumeOptions, BasicPublishOptions, ExchangeDeclareOptions, QueueBindOptions,
        QueueDeclareOptions,
    },
    types::FieldTable,
    BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind,
};
use tracing::{debug, info, warn};

use crate::cache::LatestValueCache;
use crate::config::{bool_var, parse_var, str_var};
use crate::error::SubscribeError;
use crate::snapshot::Snapshot;

/// Broker connection and topology settings, all env-supplied.
///
/// `RABBITMQ_HOST` (localhost), `RABBITMQ_PORT` (5672),
/// `EXCHANGE_NAME` (system_info), `EXCHANGE_TYPE` (fanout),
/// `QUEUE_NAME` (Consumer), `QUEUE_EXCLUSIVE` (true).
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub exchange: String,
    pub exchange_type: String,
    pub queue: String,
    pub queue_exclusive: bool,
}

impl BrokerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            host: str_var(&get, "RABBITMQ_HOST", "localhost"),
            port: parse_var(&get, "RABBITMQ_PORT", 5672),
            exchange: str_var(&get, "EXCHANGE_NAME", "system_info"),
            exchange_type: str_var(&get, "EXCHANGE_TYPE", "fanout"),
            queue: str_var(&get, "QUEUE_NAME", "Consumer"),
            queue_exclusive: bool_var(&get, "QUEUE_EXCLUSIVE", true),
        }
    }

    pub fn amqp_url(&self) -> String {
        format!("amqp://{}:{}/%2f", self.host, self.port)
    }

    fn exchange_kind(&self) -> ExchangeKind {
        match self.exchange_type.as_str() {
            "direct" => ExchangeKind::Direct,
            "fanout" => ExchangeKind::Fanout,
            "headers" => ExchangeKind::Headers,
            "topic" => ExchangeKind::Topic,
            other => ExchangeKind::Custom(other.to_string()),
        }
    }
}

/// Declare the durable exchange. Safe to repeat.
async fn declare_exchange(channel: &Channel, cfg: &BrokerConfig) -> Result<(), lapin::Error> {
    channel
        .exchange_declare(
            &cfg.exchange,
            cfg.exchange_kind(),
            ExchangeDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await
}

/// Publish one encoded snapshot to the exchange. Opens a fresh
/// connection and closes it afterwards; triggers are infrequent enough
/// that per-call connection overhead beats holding broker resources.
pub async fn publish_raw(cfg: &BrokerConfig, payload: &[u8]) -> Result<(), lapin::Error> {
    let conn = Connection::connect(&cfg.amqp_url(), ConnectionProperties::default()).await?;
    let channel = conn.create_channel().await?;
    declare_exchange(&channel, cfg).await?;

    channel
        .basic_publish(
            &cfg.exchange,
            // fanout ignores the routing key
            "",
            BasicPublishOptions::default(),
            payload,
            BasicProperties::default(),
        )
        .await?
        .await?;

    debug!(exchange = %cfg.exchange, bytes = payload.len(), "snapshot published");
    // The publish is already confirmed; a noisy close is not a failed publish.
    if let Err(e) = conn.close(200, "publish complete").await {
        warn!("broker connection close failed after publish: {e}");
    }
    Ok(())
}

/// Decode one delivery and fold it into the cache. Malformed payloads
/// are logged and dropped; the subscription keeps running.
async fn apply_delivery(cache: &LatestValueCache, payload: &[u8]) {
    match serde_json::from_slice::<Snapshot>(payload) {
        Ok(snapshot) => {
            debug!(timestamp = %snapshot.timestamp, "snapshot received");
            cache.update(snapshot).await;
        }
        Err(e) => warn!("discarding malformed broker message: {e}"),
    }
}

/// The consumer's single long-lived subscription: declare and bind a
/// queue (no routing filter — every consumer instance sees every
/// publish), then overwrite `cache` with each decoded delivery.
///
/// Malformed payloads are logged and dropped without ending the loop.
/// Returns only on broker-link failure, which is fatal for this
/// consumer instance; restarting is the supervisor's job.
pub async fn run_subscription(
    cfg: &BrokerConfig,
    cache: Arc<LatestValueCache>,
) -> Result<(), SubscribeError> {
    let conn = Connection::connect(&cfg.amqp_url(), ConnectionProperties::default()).await?;
    let channel = conn.create_channel().await?;
    declare_exchange(&channel, cfg).await?;

    let queue = channel
        .queue_declare(
            &cfg.queue,
            QueueDeclareOptions {
                exclusive: cfg.queue_exclusive,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await?;
    channel
        .queue_bind(
            queue.name().as_str(),
            &cfg.exchange,
            "",
            QueueBindOptions::default(),
            FieldTable::default(),
        )
        .await?;

    let mut consumer = channel
        .basic_consume(
            queue.name().as_str(),
            "sysbridge_consumer",
            BasicConsumeOptions {
                no_ack: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await?;

    info!(
        exchange = %cfg.exchange,
        queue = %queue.name().as_str(),
        "subscribed to broker"
    );

    while let Some(delivery) = consumer.next().await {
        let delivery = delivery?;
        apply_delivery(&cache, &delivery.data).await;
    }

    Err(SubscribeError::DeliveryStreamClosed)
}
