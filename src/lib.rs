use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// The authentication/authorization core.
pub mod access;
pub mod directory;
pub mod error;
pub mod models;
pub mod session;
pub mod storage;
pub mod surfaces;

// The local shell consuming the core.
pub mod auth;
pub mod config;
pub mod guard;
pub mod handlers;
pub mod roster;

// Module for routing segregation (Public, Authenticated, Admin).
pub mod routes;
use auth::CurrentUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use access::{AccessControl, AccessDecision};
pub use config::AppConfig;
pub use directory::{AccountDirectory, DemoAccountDirectory, DirectoryState};
pub use models::{Identity, Role, RoleSet};
pub use roster::{RosterState, UserRoster};
pub use session::{SessionState, SessionStore};
pub use storage::{FileKeyValueStore, KeyValueState, KeyValueStore, MemoryKeyValueStore};

/// ApiDoc
///
/// OpenAPI document of the shell, served at `/api-docs/openapi.json` and browsable
/// through Swagger UI.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login, handlers::logout, handlers::get_session, handlers::get_navigation,
        handlers::get_me, handlers::get_admin_dashboard, handlers::get_super_admin_dashboard,
        handlers::list_users, handlers::update_user_role, handlers::toggle_user_status
    ),
    components(
        schemas(
            models::Role, models::Identity, models::LoginRequest, models::UpdateRoleRequest,
            models::UserProfile, models::NavLink, models::AdminDashboardView,
            models::SuperAdminDashboardView, models::RoleStats, models::AccountStatus,
            models::RosterEntry, models::RoleUpdateResponse, models::ErrorBody,
        )
    ),
    tags(
        (name = "estate-portal", description = "Estate Portal session and access API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single container of shared services. Cloning is cheap: every field is a
/// handle onto the same instance, so all requests observe one session.
#[derive(Clone)]
pub struct AppState {
    /// The one session of the local operator.
    pub session: SessionState,
    /// Decisions derived from `session`.
    pub access: AccessControl,
    /// User list managed from the super-admin dashboard.
    pub roster: RosterState,
    /// Single-flight flag for session-mutating requests.
    pub guard: guard::OperationGuard,
    pub config: AppConfig,
}

impl AppState {
    /// Wires `AccessControl` to the given session store.
    pub fn new(session: SessionState, roster: RosterState, config: AppConfig) -> Self {
        Self {
            access: AccessControl::new(session.clone()),
            session,
            roster,
            guard: guard::OperationGuard::new(),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

// Let extractors pull single components out of AppState.

impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.session.clone()
    }
}

impl FromRef<AppState> for AccessControl {
    fn from_ref(app_state: &AppState) -> AccessControl {
        app_state.access.clone()
    }
}

/// auth_middleware
///
/// Rejects requests to `authenticated_routes` with the authentication-required
/// fallback when no session is active. The `CurrentUser` extractor does the work.
async fn auth_middleware(_current_user: CurrentUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routes, applies the gating and observability layers, and
/// registers the shared state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        // Admin routes carry their allow-lists in the handler signatures.
        .merge(admin::admin_routes())
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the `http_request` span with method, URI and the `x-request-id`, so every
/// log line of one request (including session events) is correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
