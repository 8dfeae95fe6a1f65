use crate::config::Config;
use crate::nonce::NonceGenerator;
use crate::services::{
    indexer::GraphIndexer, oracle::ContractMembershipOracle, storage::StorageGateway,
};
use crate::session::SessionIssuer;
use crate::state::{AppState, Parameters, Services};
use crate::time::DefaultTimeService;
use crate::wallet::WalletAddress;
use anyhow::Context;
use axum::{routing::get, Router};
use axum_prometheus::{
    metrics_exporter_prometheus::PrometheusBuilder, EndpointLabel, PrometheusMetricLayerBuilder,
};
use chrono::Utc;
use std::net::SocketAddr;
use tokio::{join, net::TcpListener, signal};
use tracing::info;

pub async fn run(config: Config) -> anyhow::Result<()> {
    let token_secret = config.secrets.token.load().context("loading token secret")?;
    let nonce_secret = config.secrets.nonce.load().context("loading nonce secret")?;
    let contract_address: WalletAddress = config
        .chain
        .contract_address
        .parse()
        .context("invalid contract address")?;
    let services = Services {
        oracle: Box::new(
            ContractMembershipOracle::new(&config.chain).context("failed to build contract client")?,
        ),
        index: Box::new(GraphIndexer::new(&config.indexer)?),
        storage: StorageGateway::new(&config.storage)?,
        time: Box::new(DefaultTimeService),
    };
    let state = AppState {
        parameters: Parameters {
            nonces: NonceGenerator::new(nonce_secret),
            sessions: SessionIssuer::new(token_secret.as_bytes()),
            contract_address,
            started_at: Utc::now(),
        },
        services,
    };
    info!("Checking membership against contract {contract_address} via {}", config.chain.rpc_url);

    // Create a custom prometheus layer that ignores unknown paths and returns `/unknown` instead so
    // crawlers/malicious actors can't create high cardinality metrics by hitting unknown routes.
    let (prometheus_layer, metrics_handle) = PrometheusMetricLayerBuilder::new()
        .with_prefix("walletgate")
        .with_endpoint_label_type(EndpointLabel::MatchedPathWithFallbackFn(|_| {
            "/unknown".into()
        }))
        .with_metrics_from_fn(|| {
            PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install metrics recorder")
        })
        .build_pair();
    let router = crate::routes::build_router(state).layer(prometheus_layer);
    let metrics_router =
        Router::new().route("/metrics", get(|| async move { metrics_handle.render() }));

    let app = serve(config.server.bind_endpoint, router, "main");
    let metrics = serve(config.metrics.bind_endpoint, metrics_router, "metrics");
    let (app, metrics) = join!(app, metrics);
    app.context("running main server")?;
    metrics.context("running metrics server")?;
    Ok(())
}

async fn serve(
    endpoint: SocketAddr,
    router: Router,
    server_type: &'static str,
) -> anyhow::Result<()> {
    info!("Starting {server_type} server on {endpoint}");
    let listener = TcpListener::bind(endpoint)
        .await
        .context("failed to bind to endpoint")?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(server_type))
        .await
        .context("failed to serve")
}

async fn shutdown_signal(server_type: &'static str) {
    if signal::ctrl_c().await.is_ok() {
        info!("Shutting down {server_type} server");
    } else {
        // Without a signal handler the server runs until the process is killed.
        std::future::pending::<()>().await;
    }
}
