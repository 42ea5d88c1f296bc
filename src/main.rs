//! Pomodoro Timer - A Pomodoro countdown timer served over HTTP
//! 
//! This is the main entry point for the pomodoro-timer application.

use tokio::net::TcpListener;
use tracing::info;

use pomodoro_timer::{
    config::Config,
    state::AppState,
    api::create_router,
    tasks::event_logger_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("pomodoro_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting pomodoro-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, reset_policy={:?}",
          config.host, config.port, config.reset_policy);

    let state = AppState::new(config.port, config.host.clone(), config.reset_policy);

    // Log engine events in the background
    tokio::spawn(event_logger_task(state.clone()));

    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start        - Start the countdown");
    info!("  POST /pause        - Pause the countdown");
    info!("  POST /reset        - Reset the countdown");
    info!("  POST /mode/:mode   - Select pomodoro, short-break or long-break");
    info!("  POST /acknowledge  - Acknowledge a finished countdown");
    info!("  GET  /status       - Current timer and server status");
    info!("  GET  /events       - Server-sent timer events");
    info!("  GET  /health       - Health check");

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
