use estate_portal::{
    AccessControl, AccessDecision, DemoAccountDirectory, DirectoryState, KeyValueState,
    MemoryKeyValueStore, Role, RoleSet, SessionState, SessionStore,
    surfaces::{self, AdminDashboard, SuperAdminDashboard, Surface},
};
use std::sync::Arc;

// --- Helper Functions ---

fn empty_session() -> SessionState {
    Arc::new(SessionStore::new(
        Arc::new(MemoryKeyValueStore::new()) as KeyValueState,
        Arc::new(DemoAccountDirectory::without_latency()) as DirectoryState,
    ))
}

async fn logged_in(email: &str) -> (SessionState, AccessControl) {
    let session = empty_session();
    assert!(session.login(email, "demo123", None).await.unwrap());
    let access = AccessControl::new(session.clone());
    (session, access)
}

fn labels(access: &AccessControl) -> Vec<String> {
    surfaces::visible_links(access)
        .into_iter()
        .map(|link| link.label)
        .collect()
}

const ALL: RoleSet = RoleSet::of(&Role::ALL);

// --- AccessControl ---

#[tokio::test]
async fn test_logged_out_session_is_denied_everything() {
    let access = AccessControl::new(empty_session());

    assert!(!access.is_authenticated());
    assert!(!access.has_any_role(ALL));
    assert_eq!(access.decide(ALL), AccessDecision::AuthenticationRequired);
}

#[tokio::test]
async fn test_empty_allow_list_admits_nobody() {
    for email in [
        "visitor@demo.com",
        "agent@demo.com",
        "admin@demo.com",
        "superadmin@demo.com",
    ] {
        let (_session, access) = logged_in(email).await;

        assert!(access.is_authenticated());
        assert!(!access.has_any_role(RoleSet::EMPTY), "{email} passed an empty allow-list");
    }
}

#[tokio::test]
async fn test_super_admin_does_not_inherit_admin() {
    let (_session, access) = logged_in("superadmin@demo.com").await;

    assert!(!access.has_any_role(RoleSet::of(&[Role::Admin])));
}

#[tokio::test]
async fn test_admin_end_to_end() {
    let (_session, access) = logged_in("admin@demo.com").await;

    assert!(access.is_authenticated());
    assert!(access.has_any_role(RoleSet::of(&[Role::Admin, Role::SuperAdmin])));
    assert!(!access.has_any_role(RoleSet::of(&[Role::SuperAdmin])));
}

#[tokio::test]
async fn test_membership_is_exact_for_every_role() {
    for (email, role) in [
        ("visitor@demo.com", Role::Visitor),
        ("agent@demo.com", Role::Agent),
        ("admin@demo.com", Role::Admin),
        ("superadmin@demo.com", Role::SuperAdmin),
    ] {
        let (_session, access) = logged_in(email).await;

        for other in Role::ALL {
            assert_eq!(
                access.has_any_role(RoleSet::of(&[other])),
                other == role,
                "{role} checked against [{other}]"
            );
        }
    }
}

#[tokio::test]
async fn test_denied_decision_names_required_and_actual_roles() {
    let (_session, access) = logged_in("agent@demo.com").await;

    assert_eq!(
        access.decide(AdminDashboard::ALLOWED),
        AccessDecision::Denied {
            required: RoleSet::of(&[Role::Admin, Role::SuperAdmin]),
            actual: Role::Agent,
        }
    );
}

#[tokio::test]
async fn test_granted_decision_carries_identity() {
    let (session, access) = logged_in("superadmin@demo.com").await;

    assert_eq!(
        access.decide(SuperAdminDashboard::ALLOWED),
        AccessDecision::Granted(session.current().unwrap())
    );
}

#[tokio::test]
async fn test_decisions_follow_session_changes() {
    let (session, access) = logged_in("admin@demo.com").await;
    assert!(access.has_any_role(AdminDashboard::ALLOWED));

    session.update_role("3", Role::Visitor).await.unwrap();
    assert!(!access.has_any_role(AdminDashboard::ALLOWED));

    session.logout();
    assert!(!access.is_authenticated());
    assert_eq!(access.decide(AdminDashboard::ALLOWED), AccessDecision::AuthenticationRequired);
}

// --- Surfaces & Navigation ---

#[test]
fn test_surface_allow_lists_are_explicit() {
    assert_eq!(
        AdminDashboard::ALLOWED.to_vec(),
        vec![Role::Admin, Role::SuperAdmin]
    );
    assert_eq!(SuperAdminDashboard::ALLOWED.to_vec(), vec![Role::SuperAdmin]);
}

#[tokio::test]
async fn test_navigation_for_anonymous_and_plain_roles() {
    let public = vec!["Home", "Properties", "Agents", "Pricing", "Contact"];

    assert_eq!(labels(&AccessControl::new(empty_session())), public);

    let (_session, visitor) = logged_in("visitor@demo.com").await;
    assert_eq!(labels(&visitor), public);

    let (_session, agent) = logged_in("agent@demo.com").await;
    assert_eq!(labels(&agent), public);
}

#[tokio::test]
async fn test_navigation_for_admin_roles() {
    let (_session, admin) = logged_in("admin@demo.com").await;
    let admin_links = labels(&admin);
    assert!(admin_links.contains(&"Admin".to_string()));
    assert!(!admin_links.contains(&"Super Admin".to_string()));

    let (_session, super_admin) = logged_in("superadmin@demo.com").await;
    let super_links = labels(&super_admin);
    assert!(super_links.contains(&"Admin".to_string()));
    assert!(super_links.contains(&"Super Admin".to_string()));
    assert_eq!(super_links.len(), 7);
}
