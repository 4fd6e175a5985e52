//! Allow-lists of every gated surface, and the navigation menu derived from them.
//!
//! Each surface lists every role it accepts. There is no "minimum role".

use crate::{
    access::AccessControl,
    models::{NavLink, Role, RoleSet},
};

/// A gated surface with a fixed allow-list. Used as the type parameter of the
/// `auth::Gated` extractor.
pub trait Surface {
    const NAME: &'static str;
    const ALLOWED: RoleSet;
}

/// The admin dashboard (`/admin`).
pub struct AdminDashboard;

impl Surface for AdminDashboard {
    const NAME: &'static str = "admin dashboard";
    const ALLOWED: RoleSet = RoleSet::of(&[Role::Admin, Role::SuperAdmin]);
}

/// The super-admin dashboard and user management (`/super-admin/*`).
pub struct SuperAdminDashboard;

impl Surface for SuperAdminDashboard {
    const NAME: &'static str = "super admin dashboard";
    const ALLOWED: RoleSet = RoleSet::of(&[Role::SuperAdmin]);
}

struct NavEntry {
    label: &'static str,
    href: &'static str,
    /// `None` for links shown to everyone.
    allowed: Option<RoleSet>,
}

const NAVIGATION: &[NavEntry] = &[
    NavEntry { label: "Home", href: "/", allowed: None },
    NavEntry { label: "Properties", href: "/properties", allowed: None },
    NavEntry { label: "Agents", href: "/agents", allowed: None },
    NavEntry { label: "Pricing", href: "/pricing", allowed: None },
    NavEntry { label: "Contact", href: "/contact", allowed: None },
    NavEntry { label: "Admin", href: "/admin", allowed: Some(AdminDashboard::ALLOWED) },
    NavEntry {
        label: "Super Admin",
        href: "/super-admin",
        allowed: Some(SuperAdminDashboard::ALLOWED),
    },
];

/// visible_links
///
/// The navigation menu as the current session should see it.
pub fn visible_links(access: &AccessControl) -> Vec<NavLink> {
    NAVIGATION
        .iter()
        .filter(|entry| entry.allowed.is_none_or(|allowed| access.has_any_role(allowed)))
        .map(|entry| NavLink {
            label: entry.label.to_string(),
            href: entry.href.to_string(),
        })
        .collect()
}
