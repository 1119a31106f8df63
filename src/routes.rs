use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_cookies::CookieManagerLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::{handlers, middleware_layer, state::AppState};

/// Upper bound for request bodies; session archives and text files are small.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Login and logout. Open to unauthenticated callers.
pub fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .with_state(state)
}

/// The scheduled reset trigger, guarded by its own bearer secret.
pub fn cron_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/cron/reset-sessions", get(handlers::cron::reset_sessions))
        .with_state(state)
}

/// Everything behind the dashboard password.
pub fn protected_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/sessions",
            get(handlers::sessions::list_sessions)
                .post(handlers::sessions::create_session)
                .put(handlers::sessions::update_session)
                .delete(handlers::sessions::delete_session),
        )
        .route("/api/sessions/export", get(handlers::transfer::export_session))
        .route("/api/sessions/import", post(handlers::transfer::import_session))
        .route(
            "/api/translations/analyze",
            post(handlers::analysis::analyze_text_file),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_auth,
        ))
        .with_state(state)
}

/// Tracing, cookies and body limit shared by every route.
pub fn with_common_layers(router: Router) -> Router {
    router
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false))
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

/// The full application router without per-peer rate limiting.
pub fn build_router(state: AppState) -> Router {
    with_common_layers(
        Router::new()
            .merge(auth_routes(state.clone()))
            .merge(cron_routes(state.clone()))
            .merge(protected_routes(state)),
    )
}
