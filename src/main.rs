use anyhow::Context;
use axum::Router;
use http::{HeaderValue, Method, header};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use session_desk::{
    config::Config,
    routes,
    services::lifecycle,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");

    let state = AppState::new(&config).await?;
    tracing::info!("✅ AppState initialized");

    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::COOKIE,
        ])
        .allow_credentials(true)
        .expose_headers([header::CONTENT_DISPOSITION])
        .max_age(Duration::from_secs(86400));

    let login_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(5)
            .finish()
            .context("Invalid login rate limit configuration")?,
    );

    let login_routes = routes::auth_routes(state.clone())
        .layer(tower_governor::GovernorLayer::new(login_governor_conf));

    let app = routes::with_common_layers(
        Router::new()
            .merge(login_routes)
            .merge(routes::cron_routes(state.clone()))
            .merge(routes::protected_routes(state.clone())),
    )
    .layer(cors);

    match state.config.reset_interval {
        Some(interval) => {
            lifecycle::spawn_reset_job(state.sessions.clone(), interval);
            tracing::info!(
                "✅ Background reset job started (runs every {}s)",
                interval.as_secs()
            );
        }
        None => tracing::info!("⏸️ Background reset job disabled"),
    }

    let addr: SocketAddr = state.config.bind_addr;
    tracing::info!("🚀 Server listening on http://{}", addr);
    tracing::info!("✅ All systems operational");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
