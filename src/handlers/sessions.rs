use axum::{
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, Result},
    models::session::SessionStatus,
    response,
    services::{lifecycle, sessions as session_service},
    state::AppState,
};

/// The request payload for creating a session.
#[derive(Deserialize)]
pub struct CreateSessionRequest {
    pub name: Option<String>,
    pub variable: Option<String>,
}

/// The request payload for updating a session.
///
/// With only `id` and `status` set this is a status change; otherwise all
/// of `name`, `variable` and `status` are required.
#[derive(Deserialize)]
pub struct UpdateSessionRequest {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub variable: Option<String>,
    pub status: Option<String>,
}

/// The query parameters for deleting a session.
#[derive(Deserialize)]
pub struct DeleteSessionQuery {
    pub id: Option<String>,
}

#[derive(Serialize)]
struct SuccessResponse {
    success: bool,
}

/// Parses a numeric id from a query string value.
pub(crate) fn parse_id(raw: Option<&str>) -> Result<i64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("ID сессии обязателен".to_string()))?
        .parse()
        .map_err(|_| AppError::Validation("ID сессии должен быть числом".to_string()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Lists all sessions.
#[axum::debug_handler]
pub async fn list_sessions(State(state): State<AppState>) -> Result<Response> {
    let sessions = session_service::list(state.sessions.as_ref()).await?;
    response::json(StatusCode::OK, &sessions)
}

/// Creates a new session.
#[axum::debug_handler]
pub async fn create_session(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(req) = payload?;
    let (Some(name), Some(variable)) = (non_empty(req.name), non_empty(req.variable)) else {
        return Err(AppError::Validation(
            "Название и переменная обязательны".to_string(),
        ));
    };

    let session = session_service::create(state.sessions.as_ref(), &name, &variable).await?;
    response::json(StatusCode::OK, &session)
}

/// Updates a session, either fully or just its status.
#[axum::debug_handler]
pub async fn update_session(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UpdateSessionRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(req) = payload?;
    let id = req
        .id
        .ok_or_else(|| AppError::Validation("ID сессии обязателен".to_string()))?;

    let name = non_empty(req.name);
    let variable = non_empty(req.variable);
    let status = non_empty(req.status)
        .map(|s| s.parse::<SessionStatus>())
        .transpose()?;

    let session = match (name, variable, status) {
        (None, None, Some(status)) => {
            lifecycle::set_status(state.sessions.as_ref(), id, status).await?
        }
        (Some(name), Some(variable), Some(status)) => {
            session_service::update(state.sessions.as_ref(), id, &name, &variable, status).await?
        }
        _ => {
            return Err(AppError::Validation(
                "Все поля обязательны для полного обновления".to_string(),
            ));
        }
    };

    response::json(StatusCode::OK, &session)
}

/// Deletes a session.
#[axum::debug_handler]
pub async fn delete_session(
    State(state): State<AppState>,
    Query(query): Query<DeleteSessionQuery>,
) -> Result<Response> {
    let id = parse_id(query.id.as_deref())?;
    session_service::delete(state.sessions.as_ref(), id).await?;
    response::json(StatusCode::OK, &SuccessResponse { success: true })
}
