use crate::{
    AppState,
    auth::{CurrentUser, Gated},
    error::ApiError,
    models::{
        AdminDashboardView, Identity, LoginRequest, NavLink, RoleUpdateResponse, RosterEntry,
        SuperAdminDashboardView, UpdateRoleRequest, UserProfile,
    },
    surfaces::{self, AdminDashboard, SuperAdminDashboard, Surface},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

// --- Session Handlers ---

/// login
///
/// [Public Route] Opens a session. Known demo emails log in as their stored
/// account; an unknown email needs a `role` (register flow).
///
/// *Failure*: one generic 401 for every rejected login, 409 while another session
/// operation is pending.
#[utoipa::path(
    post,
    path = "/session/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened", body = Identity),
        (status = 401, description = "Authentication failed", body = crate::models::ErrorBody),
        (status = 409, description = "Another session operation is pending", body = crate::models::ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Identity>, ApiError> {
    let _permit = state.guard.try_begin().ok_or(ApiError::Busy)?;

    let opened = state
        .session
        .login(&payload.email, &payload.password, payload.role)
        .await?;
    if !opened {
        return Err(ApiError::AuthenticationFailed);
    }

    state
        .session
        .current()
        .map(Json)
        .ok_or(ApiError::AuthenticationFailed)
}

/// logout
///
/// [Public Route] Closes the session. Succeeds when nobody is logged in.
#[utoipa::path(
    post,
    path = "/session/logout",
    responses(
        (status = 204, description = "Session closed"),
        (status = 409, description = "Another session operation is pending", body = crate::models::ErrorBody)
    )
)]
pub async fn logout(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    let _permit = state.guard.try_begin().ok_or(ApiError::Busy)?;
    state.session.logout();
    Ok(StatusCode::NO_CONTENT)
}

/// get_session
///
/// [Public Route] The active identity, or `null` when logged out.
#[utoipa::path(
    get,
    path = "/session",
    responses((status = 200, description = "Active identity, or null when logged out", body = Identity))
)]
pub async fn get_session(State(state): State<AppState>) -> Json<Option<Identity>> {
    Json(state.session.current())
}

/// get_navigation
///
/// [Public Route] The menu links visible to the current session. Admin links only
/// appear for roles in the matching dashboard's allow-list.
#[utoipa::path(
    get,
    path = "/navigation",
    responses((status = 200, description = "Visible links", body = [NavLink]))
)]
pub async fn get_navigation(State(state): State<AppState>) -> Json<Vec<NavLink>> {
    Json(surfaces::visible_links(&state.access))
}

/// get_me
///
/// [Authenticated Route] Profile of the active identity, with avatar and initials.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 401, description = "Authentication required", body = crate::models::ErrorBody)
    )
)]
pub async fn get_me(CurrentUser(identity): CurrentUser) -> Json<UserProfile> {
    Json(UserProfile::from(identity))
}

// --- Dashboard Handlers ---

/// get_admin_dashboard
///
/// [Admin Route] Allow-list: admin, super_admin.
#[utoipa::path(
    get,
    path = "/admin",
    responses(
        (status = 200, description = "Admin dashboard", body = AdminDashboardView),
        (status = 401, description = "Authentication required", body = crate::models::ErrorBody),
        (status = 403, description = "Access denied", body = crate::models::ErrorBody)
    )
)]
pub async fn get_admin_dashboard(
    Gated { identity, .. }: Gated<AdminDashboard>,
    State(state): State<AppState>,
) -> Json<AdminDashboardView> {
    Json(AdminDashboardView {
        welcome: format!("Welcome back, {} ({})", identity.name, identity.role),
        can_manage_roles: state.access.has_any_role(SuperAdminDashboard::ALLOWED),
        identity,
    })
}

/// get_super_admin_dashboard
///
/// [Admin Route] Allow-list: super_admin. Includes the role distribution of the roster.
#[utoipa::path(
    get,
    path = "/super-admin",
    responses(
        (status = 200, description = "Super admin dashboard", body = SuperAdminDashboardView),
        (status = 401, description = "Authentication required", body = crate::models::ErrorBody),
        (status = 403, description = "Access denied", body = crate::models::ErrorBody)
    )
)]
pub async fn get_super_admin_dashboard(
    Gated { identity, .. }: Gated<SuperAdminDashboard>,
    State(state): State<AppState>,
) -> Json<SuperAdminDashboardView> {
    Json(SuperAdminDashboardView {
        welcome: format!("Welcome back, {} ({})", identity.name, identity.role.label()),
        stats: state.roster.stats(),
        identity,
    })
}

/// list_users
///
/// [Admin Route] Allow-list: super_admin.
#[utoipa::path(
    get,
    path = "/super-admin/users",
    responses(
        (status = 200, description = "Roster", body = [RosterEntry]),
        (status = 403, description = "Access denied", body = crate::models::ErrorBody)
    )
)]
pub async fn list_users(
    _gate: Gated<SuperAdminDashboard>,
    State(state): State<AppState>,
) -> Json<Vec<RosterEntry>> {
    Json(state.roster.list())
}

/// update_user_role
///
/// [Admin Route] Allow-list: super_admin. Forwards the change through
/// `SessionStore::update_role` and then updates the roster entry. Setting the role
/// a user already has is answered without calling the session store.
///
/// *Note*: `applied_to_session` is false unless the target is the caller's own
/// account; the active session is never changed for anyone else.
#[utoipa::path(
    put,
    path = "/super-admin/users/{id}/role",
    params(("id" = String, Path, description = "Roster user id")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = RoleUpdateResponse),
        (status = 403, description = "Access denied", body = crate::models::ErrorBody),
        (status = 404, description = "Unknown user", body = crate::models::ErrorBody),
        (status = 409, description = "Another session operation is pending", body = crate::models::ErrorBody)
    )
)]
pub async fn update_user_role(
    Gated { identity, .. }: Gated<SuperAdminDashboard>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<RoleUpdateResponse>, ApiError> {
    let existing = state
        .roster
        .get(&id)
        .ok_or_else(|| ApiError::UserNotFound(id.clone()))?;

    if existing.role == payload.role {
        return Ok(Json(RoleUpdateResponse {
            user: existing,
            applied_to_session: false,
        }));
    }

    let _permit = state.guard.try_begin().ok_or(ApiError::Busy)?;
    let outcome = state.session.update_role(&id, payload.role).await?;

    let user = state
        .roster
        .set_role(&id, payload.role)
        .ok_or_else(|| ApiError::UserNotFound(id.clone()))?;

    tracing::info!(
        actor = %identity.id,
        target = %id,
        role = %payload.role,
        "user role changed"
    );

    Ok(Json(RoleUpdateResponse {
        user,
        applied_to_session: outcome.applied_to_session(),
    }))
}

/// toggle_user_status
///
/// [Admin Route] Allow-list: super_admin. Suspends an active user or reactivates
/// a suspended/inactive one.
#[utoipa::path(
    put,
    path = "/super-admin/users/{id}/status",
    params(("id" = String, Path, description = "Roster user id")),
    responses(
        (status = 200, description = "Status toggled", body = RosterEntry),
        (status = 403, description = "Access denied", body = crate::models::ErrorBody),
        (status = 404, description = "Unknown user", body = crate::models::ErrorBody)
    )
)]
pub async fn toggle_user_status(
    _gate: Gated<SuperAdminDashboard>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RosterEntry>, ApiError> {
    state
        .roster
        .toggle_status(&id)
        .map(Json)
        .ok_or(ApiError::UserNotFound(id))
}
