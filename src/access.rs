use crate::{
    models::{Identity, Role, RoleSet},
    session::SessionState,
};

/// AccessDecision
///
/// Outcome of checking the current session against one allow-list. Gating
/// consumers turn `AuthenticationRequired` and `Denied` into their fallback views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Granted(Identity),
    AuthenticationRequired,
    Denied { required: RoleSet, actual: Role },
}

/// AccessControl
///
/// Answers two questions about the session held by `SessionStore`: is anyone
/// logged in, and is their role in a given allow-list. It renders nothing and
/// navigates nowhere.
#[derive(Clone)]
pub struct AccessControl {
    session: SessionState,
}

impl AccessControl {
    pub fn new(session: SessionState) -> Self {
        Self { session }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.current().is_some()
    }

    /// Exact membership of the active role in `allowed`; false when logged out.
    /// An empty allow-list admits nobody.
    pub fn has_any_role(&self, allowed: RoleSet) -> bool {
        self.session
            .current()
            .is_some_and(|identity| allowed.contains(identity.role))
    }

    /// Both checks at once, taken from a single snapshot of the session.
    pub fn decide(&self, allowed: RoleSet) -> AccessDecision {
        match self.session.current() {
            None => AccessDecision::AuthenticationRequired,
            Some(identity) if allowed.contains(identity.role) => AccessDecision::Granted(identity),
            Some(identity) => AccessDecision::Denied {
                required: allowed,
                actual: identity.role,
            },
        }
    }
}
