//! Entry point for the consumer service: one broker subscription, any
//! number of viewer sessions.

use std::future::IntoFuture;
use std::sync::Arc;

use axum::{response::Html, routing::get};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sysbridge::broker::run_subscription;
use sysbridge::config::ConsumerConfig;
use sysbridge::viewer::viewer_router;
use sysbridge::{BrokerConfig, LatestValueCache, ViewerState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = ConsumerConfig::from_env();
    let broker = BrokerConfig::from_env();
    info!(
        broker = %broker.amqp_url(),
        exchange = %broker.exchange,
        "consumer starting"
    );

    let cache = Arc::new(LatestValueCache::new());

    let sub_cache = cache.clone();
    let mut subscription =
        tokio::spawn(async move { run_subscription(&broker, sub_cache).await });

    let state = ViewerState::new(cache, cfg.push_interval);
    let app = viewer_router(state).route("/", get(index));

    let listener = tokio::net::TcpListener::bind((cfg.host.as_str(), cfg.port)).await?;
    info!("viewer page at http://{}:{}/", cfg.host, cfg.port);

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    tokio::select! {
        res = server.into_future() => {
            res?;
            subscription.abort();
        }
        res = &mut subscription => {
            // The broker link is this instance's lifeline; exit non-zero
            // and let the supervisor restart us.
            let err = match res {
                Ok(Err(e)) => anyhow::Error::from(e),
                Ok(Ok(())) => anyhow::anyhow!("broker subscription ended"),
                Err(join) => anyhow::Error::from(join),
            };
            error!("broker subscription failed: {err}");
            return Err(err);
        }
    }
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(include_str!("../assets/index.html"))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
