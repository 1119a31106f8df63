use crate::{
    error::{AppError, Result},
    models::session::{Session, SessionStatus},
    repositories::session::SessionBackend,
};

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Сессия {} не найдена", id))
}

fn require_fields(name: &str, variable: &str) -> Result<()> {
    if name.trim().is_empty() || variable.trim().is_empty() {
        return Err(AppError::Validation(
            "Название и переменная обязательны".to_string(),
        ));
    }
    Ok(())
}

/// Lists all sessions, newest first.
pub async fn list(backend: &dyn SessionBackend) -> Result<Vec<Session>> {
    backend.list().await
}

/// Fetches one session.
///
/// # Errors
///
/// `NotFound` when no session has this id.
pub async fn get(backend: &dyn SessionBackend, id: i64) -> Result<Session> {
    backend.find(id).await?.ok_or_else(|| not_found(id))
}

/// Creates a session in the `Available` state.
///
/// # Arguments
///
/// * `backend` - The persistence backend.
/// * `name` - Display name, must not be blank.
/// * `variable` - Credential payload, must not be blank.
pub async fn create(backend: &dyn SessionBackend, name: &str, variable: &str) -> Result<Session> {
    require_fields(name, variable)?;
    let session = backend.insert(name, variable).await?;
    tracing::info!("✅ Session created: {} ({})", session.id, session.name);
    Ok(session)
}

/// Replaces name, variable and status of an existing session.
pub async fn update(
    backend: &dyn SessionBackend,
    id: i64,
    name: &str,
    variable: &str,
    status: SessionStatus,
) -> Result<Session> {
    require_fields(name, variable)?;
    let session = backend
        .update(id, name, variable, status)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!("✅ Session updated: {}", id);
    Ok(session)
}

/// Changes only the status of an existing session.
pub async fn update_status(
    backend: &dyn SessionBackend,
    id: i64,
    status: SessionStatus,
) -> Result<Session> {
    let session = backend
        .update_status(id, status)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!("✅ Session {} status -> {}", id, status);
    Ok(session)
}

/// Deletes a session permanently.
///
/// # Errors
///
/// `NotFound` when no session has this id; nothing is changed in that case.
pub async fn delete(backend: &dyn SessionBackend, id: i64) -> Result<()> {
    if !backend.delete(id).await? {
        return Err(not_found(id));
    }
    tracing::info!("🗑️ Session deleted: {}", id);
    Ok(())
}

/// Returns every quota-expired session to the available pool.
///
/// # Returns
///
/// The number of sessions that changed state.
pub async fn reset_expired_quota(backend: &dyn SessionBackend) -> Result<u64> {
    backend
        .reset_status(SessionStatus::QuotaExpired, SessionStatus::Available)
        .await
}
