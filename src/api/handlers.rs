//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use crate::state::{AppState, TimerEvent, TimerMode, TimerSnapshot};
use super::responses::{AcknowledgeResponse, ApiResponse, HealthResponse, StatusResponse};

fn control_response(
    action: &str,
    message: &str,
    result: Result<TimerSnapshot, String>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match result {
        Ok(snapshot) => {
            info!("{} endpoint called - {}", action, snapshot.display);
            Ok(Json(ApiResponse::from_snapshot(
                message.to_string(),
                snapshot,
            )))
        }
        Err(e) => {
            error!("Failed to {} timer: {}", action, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /start - Start the countdown
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    control_response("start", "Timer started", state.start())
}

/// Handle POST /pause - Pause the countdown
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    control_response("pause", "Timer paused", state.pause())
}

/// Handle POST /reset - Stop and restore the reset duration
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    control_response("reset", "Timer reset", state.reset())
}

/// Handle POST /mode/:mode - Select pomodoro, short-break or long-break
pub async fn mode_handler(
    State(state): State<Arc<AppState>>,
    Path(mode): Path<String>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let mode: TimerMode = match mode.parse() {
        Ok(mode) => mode,
        Err(e) => {
            warn!("{}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    match state.set_mode(mode) {
        Ok(snapshot) => {
            info!("Mode endpoint called - switched to {}", mode);
            Ok(Json(ApiResponse::from_snapshot(
                format!("{} selected", mode.label()),
                snapshot,
            )))
        }
        Err(e) => {
            error!("Failed to set timer mode: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /acknowledge - Dismiss the completion notice
pub async fn acknowledge_handler(State(state): State<Arc<AppState>>) -> Result<Json<AcknowledgeResponse>, StatusCode> {
    match state.acknowledge_completion() {
        Ok(acknowledged) => Ok(Json(AcknowledgeResponse {
            acknowledged,
            timestamp: chrono::Utc::now(),
        })),
        Err(e) => {
            error!("Failed to acknowledge completion: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /status - Return current timer status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = match state.get_snapshot() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to get timer snapshot: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let pending_completion = match state.get_pending_completion() {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to get pending completion: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let reset_policy = match state.get_reset_policy() {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to get reset policy: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        pending_completion,
        reset_policy,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /events - Stream timer events as Server-Sent Events
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let event_rx = state.subscribe();

    let events = stream::unfold(event_rx, |mut event_rx| async move {
        loop {
            match event_rx.recv().await {
                Ok(event) => {
                    let name = match &event {
                        TimerEvent::Updated { .. } => "updated",
                        TimerEvent::ModeSelected { .. } => "mode_selected",
                        TimerEvent::Completed { .. } => "completed",
                    };
                    let sse = Event::default().event(name).json_data(&event);
                    return Some((sse, event_rx));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event stream lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
