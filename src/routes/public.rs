use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints that answer regardless of the session state. The navigation and
/// session endpoints report on the session; they never require one.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check.
        .route("/health", get(|| async { "ok" }))
        // GET /navigation
        // Menu links visible to the current session (admin links are role-gated).
        .route("/navigation", get(handlers::get_navigation))
        // GET /session
        // The active identity, or null.
        .route("/session", get(handlers::get_session))
        // POST /session/login
        // Opens a session. Single-flight: 409 while another session operation runs.
        .route("/session/login", post(handlers::login))
        // POST /session/logout
        // Closes the session; a no-op when already logged out.
        .route("/session/logout", post(handlers::logout))
}
