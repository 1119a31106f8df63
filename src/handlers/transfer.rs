use axum::{
    extract::{Multipart, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, Result},
    handlers::sessions::parse_id,
    models::session::Session,
    response,
    services::transfer as transfer_service,
    state::AppState,
};

/// The query parameters for exporting a session.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportQuery {
    pub session_id: Option<String>,
}

#[derive(Serialize)]
struct ImportResponse {
    success: bool,
    session: Session,
    message: &'static str,
}

/// Downloads a session as a ZIP archive.
#[axum::debug_handler]
pub async fn export_session(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response> {
    let id = parse_id(query.session_id.as_deref())?;
    let exported = transfer_service::export_session(state.sessions.as_ref(), id).await?;

    let disposition = format!("attachment; filename=\"{}\"", exported.file_name);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        exported.bytes,
    )
        .into_response())
}

/// Creates a session from an uploaded archive (`file` + `sessionName`).
#[axum::debug_handler]
pub async fn import_session(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response> {
    let mut archive: Option<Vec<u8>> = None;
    let mut session_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Multipart(format!("Ошибка чтения формы: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Multipart(format!("Ошибка чтения файла: {}", e)))?;
                archive = Some(bytes.to_vec());
            }
            Some("sessionName") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Multipart(format!("Ошибка чтения формы: {}", e)))?;
                session_name = Some(text);
            }
            _ => {}
        }
    }

    let session = transfer_service::import_session(
        state.sessions.as_ref(),
        archive.as_deref(),
        session_name.as_deref().unwrap_or_default(),
    )
    .await?;

    response::json(
        StatusCode::OK,
        &ImportResponse {
            success: true,
            session,
            message: "Сессия успешно импортирована",
        },
    )
}
