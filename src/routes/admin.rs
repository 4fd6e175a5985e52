use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, put},
};

/// Admin Router Module
///
/// The two administrative dashboards. Access control lives in each handler's
/// `Gated<Surface>` argument: `AdminDashboard` admits admin and super_admin,
/// `SuperAdminDashboard` admits super_admin only. A super admin is listed
/// explicitly on the admin dashboard; nothing is inherited.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin
        // Admin dashboard. Allow-list: admin, super_admin.
        .route("/admin", get(handlers::get_admin_dashboard))
        // GET /super-admin
        // Super admin dashboard with roster statistics. Allow-list: super_admin.
        .route("/super-admin", get(handlers::get_super_admin_dashboard))
        // GET /super-admin/users
        // Roster of managed users.
        .route("/super-admin/users", get(handlers::list_users))
        // PUT /super-admin/users/{id}/role
        // Changes a user's role through the session store; single-flight.
        .route(
            "/super-admin/users/{id}/role",
            put(handlers::update_user_role),
        )
        // PUT /super-admin/users/{id}/status
        // Suspends or reactivates a user.
        .route(
            "/super-admin/users/{id}/status",
            put(handlers::toggle_user_status),
        )
}
