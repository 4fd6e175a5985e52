use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use std::{fmt, marker::PhantomData};
use thiserror::Error;

use crate::{
    access::{AccessControl, AccessDecision},
    models::{ErrorBody, Identity, Role, RoleSet},
    session::SessionState,
    surfaces::Surface,
};

/// GateRejection
///
/// The two fallback states of a gated route. `AccessDenied` carries both the
/// roles the surface accepts and the role the caller actually has.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateRejection {
    #[error("authentication required")]
    AuthenticationRequired,
    #[error("access denied: requires one of [{required}], current role is {actual}")]
    AccessDenied { required: RoleSet, actual: Role },
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        match self {
            GateRejection::AuthenticationRequired => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody::new(
                    "authentication_required",
                    "You need to be logged in to access this page.",
                )),
            )
                .into_response(),
            GateRejection::AccessDenied { required, actual } => (
                StatusCode::FORBIDDEN,
                Json(ErrorBody {
                    error: "access_denied".to_string(),
                    message: format!(
                        "You don't have permission to access this page. Required roles: {required}. Your current role: {actual}."
                    ),
                    required_roles: Some(required.to_vec()),
                    current_role: Some(actual),
                }),
            )
                .into_response(),
        }
    }
}

/// CurrentUser Extractor Result
///
/// The active identity of the local session. Handlers taking this argument are
/// only reached when someone is logged in.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    SessionState: FromRef<S>,
{
    type Rejection = GateRejection;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        SessionState::from_ref(state)
            .current()
            .map(CurrentUser)
            .ok_or(GateRejection::AuthenticationRequired)
    }
}

/// Gated Extractor
///
/// Admits the request only when the session's role is in `T::ALLOWED`. The
/// allow-list is part of the handler's signature (`Gated<AdminDashboard>`).
pub struct Gated<T: Surface> {
    pub identity: Identity,
    surface: PhantomData<fn() -> T>,
}

impl<T: Surface> fmt::Debug for Gated<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gated")
            .field("surface", &T::NAME)
            .field("identity", &self.identity)
            .finish()
    }
}

impl<S, T> FromRequestParts<S> for Gated<T>
where
    S: Send + Sync,
    T: Surface,
    AccessControl: FromRef<S>,
{
    type Rejection = GateRejection;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AccessControl::from_ref(state).decide(T::ALLOWED) {
            AccessDecision::Granted(identity) => Ok(Gated {
                identity,
                surface: PhantomData,
            }),
            AccessDecision::AuthenticationRequired => Err(GateRejection::AuthenticationRequired),
            AccessDecision::Denied { required, actual } => {
                tracing::info!(surface = T::NAME, role = %actual, "access denied");
                Err(GateRejection::AccessDenied { required, actual })
            }
        }
    }
}
