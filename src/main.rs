use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use event_board::{config::Config, controllers, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Event Board API ({})", config.app.environment);

    // Database, migrations, redis, cache warmup
    let state = AppState::new(config.clone()).await?;
    info!("Database connected, cache warming in background");

    // Create the main router
    let app = Router::new()
        .route("/", get(|| async { "Event Board API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        // Stored posters are served straight from the upload directory
        .nest_service("/uploads", ServeDir::new(&config.uploads.dir))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.uploads.max_upload_bytes))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.app.host, config.app.port);
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
