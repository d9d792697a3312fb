//! Timer Bar - a server-driven countdown timer bar
//! 
//! This is the demo server: start, stop and reset a countdown over HTTP and
//! watch its bar events on `/events`.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use timer_bar::{
    config::Config,
    state::AppState,
    api::create_router,
    utils::{shutdown_signal, wait_for_shutdown},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("timer_bar={},tower_http=info", config.log_level()))
        .init();

    info!("Starting timer-bar server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, duration={}ms",
          config.host, config.port, config.duration);

    let state = Arc::new(AppState::new(config.duration));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start    - Start the countdown");
    info!("  POST /stop     - Stop the countdown");
    info!("  POST /reset    - Reset to the full duration");
    info!("  PUT  /duration - Set the duration in milliseconds");
    info!("  GET  /status   - Check current timer state");
    info!("  GET  /events   - Stream bar events (SSE)");
    info!("  GET  /health   - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = wait_for_shutdown(shutdown_signal()) => {}
    }

    state.timer.stop();
    info!("Server shutdown complete");
    Ok(())
}
