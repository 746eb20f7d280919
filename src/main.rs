use noshow_predictor::{
    api::build_router,
    config::Config,
    serving::{explain::OfflineInsightGenerator, ServingContext},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "noshow_predictor=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    tracing::info!("Starting no-show predictor v{}", env!("CARGO_PKG_VERSION"));

    // Load the pipeline artifact; the server does not start without it.
    let context = ServingContext::from_artifact(
        &config.paths.model_output,
        Arc::new(OfflineInsightGenerator),
    )?;

    // Build HTTP router and serve
    let app = build_router(context);
    let addr = format!("{}:{}", config.server.host, config.server.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("HTTP API server listening on http://{}", addr);
    tracing::info!("   Status: http://{}/", addr);
    tracing::info!("   Predictions: http://{}/predict", addr);
    tracing::info!("   Analysis: http://{}/api/analysis", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
