//! Timer event logging background task

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::state::{AppState, TimerEvent};

/// Background task that reports engine events in the server log
pub async fn event_logger_task(state: Arc<AppState>) {
    info!("Starting timer event logger task");

    let mut event_rx = state.subscribe();

    loop {
        match event_rx.recv().await {
            Ok(TimerEvent::Updated { snapshot }) => {
                debug!("Title: {} ({})", snapshot.title, snapshot.display);
            }
            Ok(TimerEvent::ModeSelected { mode }) => {
                info!("Active mode: {}", mode.label());
            }
            Ok(TimerEvent::Completed { mode }) => {
                info!("Timer completed! {} finished, waiting for acknowledgement", mode.label());
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Event logger lagged, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => {
                debug!("Event channel closed, stopping event logger");
                break;
            }
        }
    }
}
