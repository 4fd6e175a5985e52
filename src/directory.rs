use async_trait::async_trait;
use parking_lot::RwLock;
use std::{sync::Arc, time::Duration};

use crate::{
    config::AppConfig,
    error::DirectoryError,
    models::{Identity, Role},
};

/// AccountDirectory Trait
///
/// The account service the session store resolves logins against and forwards
/// role changes to. Both calls suspend: the demo implementation sleeps to stand in
/// for network latency, a real one would perform the request.
///
/// **Send + Sync + async_trait** let the trait object (`Arc<dyn AccountDirectory>`)
/// be shared with the session store across tasks.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Looks up an account by exact email match.
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, DirectoryError>;

    /// Sets the canonical role of account `id`. Unknown ids are accepted.
    async fn update_role(&self, id: &str, role: Role) -> Result<(), DirectoryError>;
}

/// DirectoryState
///
/// The concrete type used to share the account directory.
pub type DirectoryState = Arc<dyn AccountDirectory>;

/// demo_accounts
///
/// The fixed set of known demo accounts.
pub fn demo_accounts() -> Vec<Identity> {
    [
        ("1", "visitor@demo.com", "Demo Visitor", Role::Visitor),
        ("2", "agent@demo.com", "Demo Agent", Role::Agent),
        ("3", "admin@demo.com", "Demo Admin", Role::Admin),
        ("4", "superadmin@demo.com", "Demo Super Admin", Role::SuperAdmin),
    ]
    .into_iter()
    .map(|(id, email, name, role)| Identity {
        id: id.to_string(),
        email: email.to_string(),
        name: name.to_string(),
        role,
    })
    .collect()
}

/// DemoAccountDirectory
///
/// In-memory directory seeded with `demo_accounts()`. Role updates for known ids
/// are recorded, so a later login of that account observes the new role.
pub struct DemoAccountDirectory {
    accounts: RwLock<Vec<Identity>>,
    login_latency: Duration,
    update_latency: Duration,
}

impl DemoAccountDirectory {
    pub fn new(login_latency: Duration, update_latency: Duration) -> Self {
        Self {
            accounts: RwLock::new(demo_accounts()),
            login_latency,
            update_latency,
        }
    }

    pub fn without_latency() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.login_latency, config.role_update_latency)
    }

    /// Snapshot of the account table.
    pub fn accounts(&self) -> Vec<Identity> {
        self.accounts.read().clone()
    }
}

#[async_trait]
impl AccountDirectory for DemoAccountDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, DirectoryError> {
        tokio::time::sleep(self.login_latency).await;

        let found = self
            .accounts
            .read()
            .iter()
            .find(|account| account.email == email)
            .cloned();
        Ok(found)
    }

    async fn update_role(&self, id: &str, role: Role) -> Result<(), DirectoryError> {
        tokio::time::sleep(self.update_latency).await;

        if let Some(account) = self.accounts.write().iter_mut().find(|a| a.id == id) {
            account.role = role;
        } else {
            tracing::debug!(account_id = %id, "role update for an account outside the demo directory");
        }
        Ok(())
    }
}
