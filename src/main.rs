mod config;

use clap::Parser as _;
use config::Config;
use idea_analysis::{AppState, build_metrics_layer_and_handle, build_metrics_router, build_router};
use tokio::net::TcpListener;
use tracing::{info, instrument};

#[tokio::main]
#[instrument]
pub async fn main() -> anyhow::Result<()> {
    // Loaded first so RUST_LOG can come from the .env file too.
    let dotenv = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // A missing .env file is fine; the environment may already carry everything.
    if let Err(e) = dotenv {
        info!("No .env file loaded: {}", e);
    }

    let config = Config::parse().validate()?;
    info!("Starting idea analysis server with config: {:?}", config);

    let app_state = AppState::new(config.completion_settings(), config.pool_settings());
    let mut router = build_router(app_state);

    if config.metrics {
        let (prometheus_layer, handle) =
            build_metrics_layer_and_handle(config.metrics_prefix.clone());
        router = router.layer(prometheus_layer);

        let metrics_addr = format!("{}:{}", config.host, config.metrics_port);
        let metrics_listener = TcpListener::bind(&metrics_addr).await?;
        info!("Metrics endpoint listening on {}", metrics_addr);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(metrics_listener, build_metrics_router(handle)).await {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    }

    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Idea analysis server listening on {}", bind_addr);

    axum::serve(listener, router).await?;

    Ok(())
}
