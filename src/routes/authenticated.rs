use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Routes for any logged-in user, whatever the role. The router is wrapped in
/// the `CurrentUser` middleware in `create_router`, and handlers take
/// `CurrentUser` again to read the identity.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me
        // Profile of the active identity (avatar, initials, role label).
        .route("/me", get(handlers::get_me))
}
