mod answer_key;
mod bank;
mod config;
mod errors;
mod generation;
mod layout;
mod models;
mod routes;
mod shuffle;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::generation::store::PaperStore;
use crate::layout::{default_layout_config, font_gate, load_font_book, metrics_source};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Paperset API v{}", env!("CARGO_PKG_VERSION"));

    // Load font metrics in the background; generation waits on the gate.
    let (publisher, fonts) = font_gate();
    let source = metrics_source(config.font_metrics_path.as_deref());
    tokio::spawn(async move {
        let book = load_font_book(source.as_ref()).await;
        publisher.publish(book);
    });

    let layout = Arc::new(default_layout_config());
    info!(
        "Layout config: {}x{}mm, {}pt questions, column width {:.1}mm",
        layout.page.width,
        layout.page.height,
        layout.question.font_size_pt,
        layout.column_width()
    );

    // Build app state
    let state = AppState {
        store: PaperStore::new(config.batch_retention),
        config: config.clone(),
        fonts,
        layout,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
