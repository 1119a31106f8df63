use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{
    error::AppError,
    services::auth::secrets_match,
    state::AppState,
};

/// Name of the cookie set by a successful login.
pub const AUTH_COOKIE_NAME: &str = "auth-session";

/// A middleware that requires the login cookie to be present and current.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `cookies` - The request cookies.
/// * `request` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// A `Response` or an `AppError::Authentication`.
pub async fn require_auth(
    State(state): State<AppState>,
    cookies: Cookies,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    tracing::debug!("🔐 Checking authentication...");

    let token = cookies
        .get(AUTH_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| {
            tracing::warn!("❌ No {} cookie found", AUTH_COOKIE_NAME);
            AppError::Authentication("Требуется авторизация".to_string())
        })?;

    if !secrets_match(&token, &state.auth_token) {
        tracing::warn!("❌ Stale or forged {} cookie", AUTH_COOKIE_NAME);
        return Err(AppError::Authentication("Требуется авторизация".to_string()));
    }

    tracing::debug!("✅ Request authenticated");

    Ok(next.run(request).await)
}
