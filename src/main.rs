//! Debate Clock - countdown board server
//!
//! This is the main entry point for the debate-clock application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use debate_clock::{
    api::create_router,
    config::Config,
    state::AppState,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("debate_clock={},tower_http=info", config.log_level()))
        .init();

    info!("Starting debate-clock server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, prep={}s, main={}s, presets={:?}",
        config.host, config.port, config.prep_seconds, config.main_seconds, config.presets
    );

    // Create the board; its timers tick on this runtime
    let state = Arc::new(AppState::new(config.port, config.host.clone(), config.board())?);

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /timers            - All clocks and presets");
    info!("  POST /timers/:id/toggle - Start or pause aff, neg or main");
    info!("  POST /timers/:id/reset  - Restore a clock's full duration");
    info!("  POST /timers/:id/time   - Retarget a clock");
    info!("  POST /presets/:seconds  - Select a main speech length");
    info!("  GET  /ring              - Progress ring for the main clock");
    info!("  GET  /events            - Server-sent clock updates and flashes");
    info!("  GET  /status            - Service status");

    // Event streams never end on their own, so stop serving on the first signal
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
