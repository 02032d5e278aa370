//! SchemaFlow Evolution API
//!
//! Records schema versions per data source and reports, for any two versions,
//! which columns were added, removed, retyped or re-constrained, and which of
//! those changes break downstream consumers.

use schemaflow_evolution::config::Settings;
use schemaflow_evolution::routes::create_router;
use schemaflow_evolution::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!("🚀 Starting SchemaFlow Evolution...");

    // Load configuration
    let settings = Settings::load()?;
    info!("📋 Configuration loaded successfully");
    if let Some(keep) = settings.evolution.max_versions_per_source {
        info!("🗂  Keeping at most {} versions per source", keep);
    }

    let state = Arc::new(AppState::new(&settings));

    // Build the router
    let app = create_router(state, &settings);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📚 API Endpoints:");
    info!("   GET  /health                                   - Health check");
    info!("   POST /api/sources/:id/versions                 - Record a schema version");
    info!("   GET  /api/sources/:id/versions                 - List versions (newest first)");
    info!("   GET  /api/sources/:id/versions/:versionId      - Get a version");
    info!("   GET  /api/sources/:id/versions/number/:n       - Get a version by number");
    info!("   GET  /api/sources/:id/diff                     - Compare two versions");
    info!("   POST /api/sources/:id/prune                    - Drop old versions");
    info!("   POST /api/diff                                 - Compare inline column lists");
    info!("");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging.
///
/// `LOG_FORMAT=json` switches to JSON lines for log shippers.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,schemaflow_evolution=debug,tower_http=debug")
    });

    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(fmt::layer().json().with_target(true).with_current_span(true))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .compact(),
            )
            .init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
