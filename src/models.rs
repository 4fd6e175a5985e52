use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::{fmt, str::FromStr};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ParseRoleError;

// --- Role Model ---

/// Role
///
/// The authorization unit. There is no ordering between roles: every gated surface
/// names each role it accepts in its own `RoleSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Role {
    Visitor,
    Agent,
    Admin,
    SuperAdmin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Visitor, Role::Agent, Role::Admin, Role::SuperAdmin];

    /// The wire name, identical to the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Visitor => "visitor",
            Role::Agent => "agent",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Human-readable label ("super admin").
    pub fn label(self) -> String {
        self.as_str().replace('_', " ")
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| ParseRoleError(s.to_string()))
    }
}

/// RoleSet
///
/// An allow-list of roles. Built from a literal (`RoleSet::of(&[Role::Admin])`) so
/// that gated surfaces can declare it as a `const`. Membership is exact: a set that
/// names only `Admin` does not admit `SuperAdmin`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RoleSet(u8);

impl RoleSet {
    pub const EMPTY: RoleSet = RoleSet(0);

    pub const fn of(roles: &[Role]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < roles.len() {
            bits |= roles[i].bit();
            i += 1;
        }
        RoleSet(bits)
    }

    pub const fn contains(self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members in declaration order of `Role`.
    pub fn iter(self) -> impl Iterator<Item = Role> {
        Role::ALL.into_iter().filter(move |role| self.contains(*role))
    }

    pub fn to_vec(self) -> Vec<Role> {
        self.iter().collect()
    }
}

impl fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Role::as_str).collect();
        f.write_str(&names.join(", "))
    }
}

impl Serialize for RoleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

// --- Identity ---

/// Identity
///
/// The authenticated user. This is also the exact shape of the persisted session
/// record, so field names are part of the storage format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Identity {
    /// Opaque, unique account id.
    pub id: String,
    pub email: String,
    /// Display name.
    pub name: String,
    pub role: Role,
}

impl Identity {
    /// Builds an identity for an email the directory does not know, using the
    /// email's local part as display name and a fresh random id.
    pub fn synthesize(email: &str, role: Role) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: display_name_from_email(email).to_string(),
            role,
        }
    }

    /// A restored record is only adopted when it carries an id and an email.
    pub fn is_valid(&self) -> bool {
        !self.id.trim().is_empty() && !self.email.trim().is_empty()
    }

    /// Copy of this identity with the role replaced wholesale.
    pub fn with_role(&self, role: Role) -> Self {
        Self {
            role,
            ..self.clone()
        }
    }

    /// Initials of the display name, "U" when there are none.
    pub fn initials(&self) -> String {
        let initials: String = self
            .name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .collect();
        if initials.is_empty() {
            "U".to_string()
        } else {
            initials
        }
    }
}

/// Text before the first '@', or the whole string when there is none.
pub fn display_name_from_email(email: &str) -> &str {
    email.split_once('@').map_or(email, |(local, _)| local)
}

// --- Request Payloads ---

/// LoginRequest
///
/// Input for POST /session/login. `role` is only honoured for emails the
/// directory does not know (the register flow); the password is never checked.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin@demo.com")]
    pub email: String,
    #[schema(example = "demo123")]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// UpdateRoleRequest
///
/// Input for PUT /super-admin/users/{id}/role.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

// --- Response Schemas ---

/// UserProfile
///
/// Output of GET /me: the active identity plus the derived avatar data the
/// header renders.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub role_label: String,
    pub initials: String,
    pub avatar_url: String,
}

impl From<Identity> for UserProfile {
    fn from(identity: Identity) -> Self {
        Self {
            avatar_url: format!(
                "https://api.dicebear.com/7.x/avataaars/svg?seed={}",
                identity.email
            ),
            initials: identity.initials(),
            role_label: identity.role.label(),
            id: identity.id,
            email: identity.email,
            name: identity.name,
            role: identity.role,
        }
    }
}

/// NavLink
///
/// One entry of the navigation menu as visible to the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

/// AdminDashboardView
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminDashboardView {
    pub welcome: String,
    pub identity: Identity,
    /// False for plain admins, who are told to contact a super admin instead.
    pub can_manage_roles: bool,
}

/// SuperAdminDashboardView
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuperAdminDashboardView {
    pub welcome: String,
    pub identity: Identity,
    pub stats: RoleStats,
}

/// RoleStats
///
/// Counts shown on the super-admin dashboard. `admins` includes super admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct RoleStats {
    pub total: usize,
    /// Users whose status is `active`.
    pub active: usize,
    pub admins: usize,
    pub super_admins: usize,
    pub agents: usize,
    pub visitors: usize,
}

/// AccountStatus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Inactive,
    Suspended,
}

/// RosterEntry
///
/// A user as listed on the super-admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RosterEntry {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: NaiveDate,
    pub last_login: NaiveDate,
    pub status: AccountStatus,
}

/// RoleUpdateResponse
///
/// `applied_to_session` tells the caller whether the active session changed; a
/// successful update of another user leaves it untouched.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoleUpdateResponse {
    pub user: RosterEntry,
    pub applied_to_session: bool,
}

/// ErrorBody
///
/// JSON payload of every non-2xx response. The access-denied variant carries the
/// required roles and the caller's actual role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_roles: Option<Vec<Role>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_role: Option<Role>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            required_roles: None,
            current_role: None,
        }
    }
}
