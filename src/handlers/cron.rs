use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::Response,
};
use chrono::Utc;
use serde::Serialize;

use crate::{
    error::{AppError, Result},
    response,
    services::{auth as auth_service, lifecycle},
    state::AppState,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetResponse {
    success: bool,
    message: &'static str,
    timestamp: String,
    reset_count: u64,
}

/// External trigger for the scheduled quota reset.
#[axum::debug_handler]
pub async fn reset_sessions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if !auth_service::verify_cron_header(&state.config, authorization) {
        return Err(AppError::Authentication("Unauthorized".to_string()));
    }

    let reset_count = lifecycle::trigger_scheduled_reset(state.sessions.as_ref()).await?;
    tracing::info!("Cron job executed: reset expired quota sessions");

    response::json(
        StatusCode::OK,
        &ResetResponse {
            success: true,
            message: "Expired quota sessions reset successfully",
            timestamp: Utc::now().to_rfc3339(),
            reset_count,
        },
    )
}
