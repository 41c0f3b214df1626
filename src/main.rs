//! File analysis HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use antiplagiat::analysis::CheckService;
use antiplagiat::artifact::WordCloudRenderer;
use antiplagiat::config::Config;
use antiplagiat::content::{HttpContentClient, RetryPolicy};
use antiplagiat::gateway::{HandlerState, create_router_with_state};
use antiplagiat::store::{PgStore, ReportStore};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check().await);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        content_service = %config.content_service_url,
        "File analysis service starting"
    );

    let store = Arc::new(PgStore::connect(&config.database_url, config.db_pool_size).await?);

    let content = Arc::new(HttpContentClient::new(
        config.content_service_url.clone(),
        RetryPolicy::default().with_timeout(config.http_timeout),
    ));
    let renderer = Arc::new(
        WordCloudRenderer::new(config.word_cloud_url.clone()).with_timeout(config.http_timeout),
    );

    let service = Arc::new(CheckService::new(
        content,
        store.clone(),
        store.clone(),
        renderer,
    ));
    let app = create_router_with_state(HandlerState::new(service));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("File analysis service stopped");
    Ok(())
}

async fn run_health_check() -> i32 {
    let port = std::env::var("ANALYSIS_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8082);

    let url = format!("http://127.0.0.1:{}/health", port);

    let Ok(client) = reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    else {
        return 1;
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
