use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use tower_cookies::{Cookie, Cookies};
use tower_cookies::cookie::time::Duration;

use crate::{
    error::{AppError, Result},
    middleware_layer::auth::AUTH_COOKIE_NAME,
    response,
    services::auth as auth_service,
    state::AppState,
};

/// The request payload for logging in.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub password: Option<String>,
}

/// The response payload for authentication-related requests.
#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
}

/// Builds the login cookie.
fn create_auth_cookie(value: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_COOKIE_NAME, value);
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(tower_cookies::cookie::SameSite::Lax);
    cookie.set_max_age(Duration::seconds(max_age_secs));
    cookie.set_path("/");
    cookie
}

/// Exchanges the shared password for the auth cookie.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(payload) = payload?;
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("Пароль обязателен".to_string()))?;

    if !auth_service::verify_password(&state.config, &password) {
        return Err(AppError::Authentication("Неверный пароль".to_string()));
    }

    cookies.add(create_auth_cookie(
        state.auth_token.as_str().to_string(),
        state.config.session_max_age_secs,
        state.config.is_production,
    ));
    tracing::info!("✅ Dashboard login");

    response::json(StatusCode::OK, &AuthResponse { success: true })
}

/// Drops the auth cookie.
#[axum::debug_handler]
pub async fn logout(cookies: Cookies) -> Result<Response> {
    let mut cookie = Cookie::new(AUTH_COOKIE_NAME, "");
    cookie.set_max_age(Duration::seconds(0));
    cookie.set_path("/");
    cookies.remove(cookie);

    tracing::info!("✅ Dashboard logout");

    response::json(StatusCode::OK, &AuthResponse { success: true })
}
