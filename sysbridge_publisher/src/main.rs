//! Entry point for the publisher service.

mod http;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use http::{publisher_router, PublisherState};
use sysbridge::config::PublisherConfig;
use sysbridge::{BrokerConfig, MetricsSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = PublisherConfig::from_env();
    let broker = BrokerConfig::from_env();
    info!(
        broker = %broker.amqp_url(),
        exchange = %broker.exchange,
        mount = %cfg.disk_mount_point.display(),
        "publisher starting"
    );

    let state = PublisherState {
        source: Arc::new(MetricsSource::new(cfg.disk_mount_point.clone())),
        broker,
    };

    let listener = tokio::net::TcpListener::bind((cfg.host.as_str(), cfg.port)).await?;
    info!("publish trigger at http://{}:{}/publish", cfg.host, cfg.port);
    axum::serve(listener, publisher_router(state)).await?;
    Ok(())
}
