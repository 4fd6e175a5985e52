use chrono::NaiveDate;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::models::{AccountStatus, Role, RoleStats, RosterEntry};

/// UserRoster
///
/// The user list managed from the super-admin dashboard. It is consumer state:
/// handlers only mutate it after the super-admin allow-list has been granted and,
/// for role changes, after `SessionStore::update_role` has succeeded.
#[derive(Debug, Default)]
pub struct UserRoster {
    entries: RwLock<Vec<RosterEntry>>,
}

/// RosterState
pub type RosterState = Arc<UserRoster>;

impl UserRoster {
    pub fn new(entries: Vec<RosterEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// The demo roster: the four demo accounts plus one regular visitor.
    pub fn seeded() -> Self {
        let entry = |id: &str, email: &str, name: &str, role: Role, created: (u32, u32), last: (u32, u32)| {
            RosterEntry {
                id: id.to_string(),
                email: email.to_string(),
                name: name.to_string(),
                role,
                created_at: date_in_2024(created),
                last_login: date_in_2024(last),
                status: AccountStatus::Active,
            }
        };

        Self::new(vec![
            entry("1", "visitor@demo.com", "Demo Visitor", Role::Visitor, (1, 15), (1, 20)),
            entry("2", "agent@demo.com", "Demo Agent", Role::Agent, (1, 10), (1, 19)),
            entry("3", "admin@demo.com", "Demo Admin", Role::Admin, (1, 5), (1, 21)),
            entry("4", "superadmin@demo.com", "Demo Super Admin", Role::SuperAdmin, (1, 1), (1, 21)),
            entry("5", "john.doe@example.com", "John Doe", Role::Visitor, (1, 18), (1, 20)),
        ])
    }

    pub fn list(&self) -> Vec<RosterEntry> {
        self.entries.read().clone()
    }

    pub fn get(&self, id: &str) -> Option<RosterEntry> {
        self.entries.read().iter().find(|e| e.id == id).cloned()
    }

    /// Replaces the role of `id`, returning the updated entry.
    pub fn set_role(&self, id: &str, role: Role) -> Option<RosterEntry> {
        let mut entries = self.entries.write();
        let entry = entries.iter_mut().find(|e| e.id == id)?;
        entry.role = role;
        Some(entry.clone())
    }

    /// Active and suspended swap; an inactive account is reactivated.
    pub fn toggle_status(&self, id: &str) -> Option<RosterEntry> {
        let mut entries = self.entries.write();
        let entry = entries.iter_mut().find(|e| e.id == id)?;
        entry.status = match entry.status {
            AccountStatus::Active => AccountStatus::Suspended,
            AccountStatus::Suspended | AccountStatus::Inactive => AccountStatus::Active,
        };
        Some(entry.clone())
    }

    pub fn stats(&self) -> RoleStats {
        self.entries
            .read()
            .iter()
            .fold(RoleStats::default(), |mut stats, entry| {
                stats.total += 1;
                if entry.status == AccountStatus::Active {
                    stats.active += 1;
                }
                match entry.role {
                    Role::SuperAdmin => {
                        stats.super_admins += 1;
                        stats.admins += 1;
                    }
                    Role::Admin => stats.admins += 1,
                    Role::Agent => stats.agents += 1,
                    Role::Visitor => stats.visitors += 1,
                }
                stats
            })
    }
}

fn date_in_2024((month, day): (u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap_or_default()
}
