//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use crate::state::AppState;
use super::responses::{ApiResponse, DurationRequest, HealthResponse, RemainingRequest, StatusResponse};

/// Handle POST /start - Start the countdown
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)> {
    match state.start() {
        Ok(timer) => {
            info!("Start endpoint called - countdown running");
            Ok(Json(ApiResponse::running("Timer started".to_string(), timer)))
        }
        Err(e) => {
            error!("Failed to start timer: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(format!("Failed to start timer: {}", e), state.timer.snapshot())),
            ))
        }
    }
}

/// Handle POST /stop - Stop the countdown and keep the remaining time
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let timer = state.stop();
    info!("Stop endpoint called - countdown stopped");
    Json(ApiResponse::stopped("Timer stopped".to_string(), timer))
}

/// Handle POST /reset - Restore the full duration
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)> {
    match state.reset() {
        Ok(timer) => {
            info!("Reset endpoint called - countdown reset");
            Ok(Json(ApiResponse::from_timer("Timer reset".to_string(), timer)))
        }
        Err(e) => {
            error!("Failed to reset timer: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(format!("Failed to reset timer: {}", e), state.timer.snapshot())),
            ))
        }
    }
}

/// Handle PUT /duration - Change the countdown length
pub async fn duration_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DurationRequest>,
) -> Json<ApiResponse> {
    let timer = state.set_duration(request.milliseconds);
    Json(ApiResponse::from_timer(
        format!("Duration set to {}ms", request.milliseconds),
        timer,
    ))
}

/// Handle PUT /remaining - Change the time left on the bar
pub async fn remaining_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RemainingRequest>,
) -> Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)> {
    match state.set_remaining(request.milliseconds) {
        Ok(timer) => Ok(Json(ApiResponse::from_timer(
            format!("Remaining set to {}ms", timer.remaining_ms),
            timer,
        ))),
        Err(e) => {
            error!("Failed to set remaining time: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(format!("Failed to set remaining time: {}", e), state.timer.snapshot())),
            ))
        }
    }
}

/// Handle GET /status - Return current timer status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    let timer = state.timer.snapshot();

    Json(StatusResponse {
        fraction_remaining: timer.fraction_remaining(),
        timer,
        ended_count: state.ended_count(),
        uptime: state.get_uptime(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /events - Stream bar events to a front-end
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("Events subscriber connected");
    let rx = state.surface.subscribe();

    let events = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(bar_event) => match Event::default().json_data(&bar_event) {
                    Ok(event) => return Some((Ok(event), rx)),
                    Err(e) => warn!("Failed to encode bar event: {}", e),
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Events subscriber lagged, skipped {} events", skipped);
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
