use chrono::Utc;

use crate::{
    archive,
    error::{AppError, Result},
    models::session::Session,
    repositories::session::SessionBackend,
    services::sessions,
};

/// A session packed for download.
#[derive(Debug, Clone)]
pub struct ExportedArchive {
    /// Suggested download name, e.g. `my_session_session.zip`.
    pub file_name: String,
    /// The ZIP bytes.
    pub bytes: Vec<u8>,
}

/// Download name for a session: non-alphanumeric ASCII and any non-ASCII
/// character become `_`.
pub fn archive_file_name(session_name: &str) -> String {
    let stem: String = session_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_session.zip", stem)
}

/// Packs one session into an archive.
///
/// # Errors
///
/// `NotFound` when no session has this id.
pub async fn export_session(backend: &dyn SessionBackend, id: i64) -> Result<ExportedArchive> {
    let session = sessions::get(backend, id).await?;
    let bytes = archive::encode(&session, Utc::now())?;

    tracing::info!("📦 Session {} exported ({} bytes)", id, bytes.len());

    Ok(ExportedArchive {
        file_name: archive_file_name(&session.name),
        bytes,
    })
}

/// Creates a new session from an uploaded archive.
///
/// Only the payload is taken from the archive. The name comes from the
/// caller and the status always starts as `Available`.
pub async fn import_session(
    backend: &dyn SessionBackend,
    archive_bytes: Option<&[u8]>,
    new_name: &str,
) -> Result<Session> {
    let bytes = archive_bytes
        .filter(|b| !b.is_empty())
        .ok_or_else(|| AppError::Validation("Файл обязателен".to_string()))?;

    if new_name.trim().is_empty() {
        return Err(AppError::Validation("Название сессии обязательно".to_string()));
    }

    let variable = archive::decode(bytes)?;
    let session = sessions::create(backend, new_name, &variable).await?;

    tracing::info!("📥 Session imported as {} ({})", session.id, session.name);
    Ok(session)
}
