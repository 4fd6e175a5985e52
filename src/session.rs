//! The session lifecycle: at most one active identity, mirrored into the
//! key-value store under [`SESSION_KEY`].
//!
//! Every mutation writes the store first and memory second. A failed write
//! therefore leaves both sides as they were, and a completed operation always
//! leaves them equal (or both empty).

use parking_lot::RwLock;
use std::sync::Arc;

use crate::{
    directory::DirectoryState,
    error::SessionError,
    models::{Identity, Role},
    storage::KeyValueState,
};

/// Key the serialized identity is stored under.
pub const SESSION_KEY: &str = "auth_user";

/// Written in place of a record that could not be removed on logout.
pub const LOGGED_OUT_RECORD: &str = "null";

/// What `SessionStore::update_role` did locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleUpdate {
    /// The target was the active identity; memory and record now carry the new role.
    AppliedToSession,
    /// The directory accepted the change; the active session was not the target.
    DirectoryOnly,
}

impl RoleUpdate {
    pub fn applied_to_session(self) -> bool {
        self == RoleUpdate::AppliedToSession
    }
}

/// SessionStore
///
/// Owns the current identity. Shared by reference (`SessionState`) with the
/// access-control layer and the HTTP shell; nothing else writes the session
/// record.
///
/// The store does not serialize concurrent calls. Callers that can issue
/// overlapping `login`/`logout`/`update_role` calls must guard them (see
/// `guard::OperationGuard`).
pub struct SessionStore {
    storage: KeyValueState,
    directory: DirectoryState,
    current: RwLock<Option<Identity>>,
}

/// SessionState
///
/// The concrete type used to share the session store across the application.
pub type SessionState = Arc<SessionStore>;

impl SessionStore {
    /// Creates an empty store. Call `initialize` to restore a persisted session.
    pub fn new(storage: KeyValueState, directory: DirectoryState) -> Self {
        Self {
            storage,
            directory,
            current: RwLock::new(None),
        }
    }

    /// initialize
    ///
    /// Restores the persisted session, if any. A record that cannot be read or
    /// decoded into a valid identity is discarded and the session starts empty;
    /// this never fails.
    pub fn initialize(&self) {
        let restored = match self.storage.get_item(SESSION_KEY) {
            Ok(None) => None,
            Ok(Some(raw)) if raw.trim() == LOGGED_OUT_RECORD => {
                self.discard_record();
                None
            }
            Ok(Some(raw)) => match serde_json::from_str::<Identity>(&raw) {
                Ok(identity) if identity.is_valid() => Some(identity),
                Ok(_) => {
                    tracing::warn!("persisted session lacks an id or email, discarding it");
                    self.discard_record();
                    None
                }
                Err(e) => {
                    tracing::warn!(error = %e, "persisted session is corrupt, discarding it");
                    self.discard_record();
                    None
                }
            },
            Err(e) => {
                tracing::error!(error = %e, "failed to read persisted session");
                self.discard_record();
                None
            }
        };

        if let Some(identity) = &restored {
            tracing::info!(user_id = %identity.id, role = %identity.role, "session restored");
        }
        *self.current.write() = restored;
    }

    /// Snapshot of the active identity.
    pub fn current(&self) -> Option<Identity> {
        self.current.read().clone()
    }

    /// login
    ///
    /// Resolves `email` against the directory. A known account is adopted as is;
    /// an unknown email is turned into a new account only when `role` is given.
    /// Returns `Ok(false)` (session untouched) when neither applies.
    ///
    /// The password is accepted and not verified.
    pub async fn login(
        &self,
        email: &str,
        _password: &str,
        role: Option<Role>,
    ) -> Result<bool, SessionError> {
        let identity = match (self.directory.find_by_email(email).await?, role) {
            (Some(account), _) => account,
            (None, Some(role)) => Identity::synthesize(email, role),
            (None, None) => {
                tracing::info!("login rejected: unknown account and no role supplied");
                return Ok(false);
            }
        };

        self.persist(&identity)?;
        tracing::info!(user_id = %identity.id, role = %identity.role, "session opened");
        *self.current.write() = Some(identity);
        Ok(true)
    }

    /// logout
    ///
    /// Clears the active identity and removes the record. Idempotent; the
    /// in-memory session is cleared regardless of storage errors. When the record
    /// cannot be removed it is overwritten with [`LOGGED_OUT_RECORD`], which
    /// `initialize` reads as no session. Only if both writes fail does the old
    /// record survive.
    pub fn logout(&self) {
        if let Err(e) = self.storage.remove_item(SESSION_KEY) {
            tracing::error!(error = %e, "failed to remove persisted session");
            if let Err(e) = self.storage.set_item(SESSION_KEY, LOGGED_OUT_RECORD) {
                tracing::error!(error = %e, "failed to mark persisted session as logged out");
            }
        }
        if let Some(identity) = self.current.write().take() {
            tracing::info!(user_id = %identity.id, "session closed");
        }
    }

    /// update_role
    ///
    /// Applies the change to the active identity if (and only if) `identity_id`
    /// names it, and forwards it to the directory. Updating another user still
    /// succeeds, reported as `RoleUpdate::DirectoryOnly`.
    ///
    /// For the active identity the record is written before the directory is
    /// called, and restored if the directory rejects the change. On error neither
    /// side keeps the new role.
    pub async fn update_role(
        &self,
        identity_id: &str,
        new_role: Role,
    ) -> Result<RoleUpdate, SessionError> {
        let Some(previous) = self.current().filter(|active| active.id == identity_id) else {
            self.directory.update_role(identity_id, new_role).await?;
            tracing::info!(user_id = %identity_id, role = %new_role, "role updated outside the active session");
            return Ok(RoleUpdate::DirectoryOnly);
        };

        let updated = previous.with_role(new_role);
        self.persist(&updated)?;

        if let Err(e) = self.directory.update_role(identity_id, new_role).await {
            if let Err(restore) = self.persist(&previous) {
                tracing::error!(error = %restore, "failed to restore session record after rejected role update");
            }
            return Err(e.into());
        }

        *self.current.write() = Some(updated);
        tracing::info!(user_id = %identity_id, role = %new_role, "session role updated");
        Ok(RoleUpdate::AppliedToSession)
    }

    fn persist(&self, identity: &Identity) -> Result<(), SessionError> {
        let record = serde_json::to_string(identity)?;
        self.storage.set_item(SESSION_KEY, &record)?;
        Ok(())
    }

    fn discard_record(&self) {
        if let Err(e) = self.storage.remove_item(SESSION_KEY) {
            tracing::error!(error = %e, "failed to discard persisted session");
        }
    }
}
