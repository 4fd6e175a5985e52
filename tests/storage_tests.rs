use estate_portal::{
    DemoAccountDirectory, DirectoryState, FileKeyValueStore, KeyValueState, KeyValueStore,
    MemoryKeyValueStore, Role, SessionStore, error::StorageError, session::SESSION_KEY,
};
use std::{fs, path::PathBuf, sync::Arc};
use uuid::Uuid;

// --- Setup/Teardown Utilities ---

/// A store rooted in a fresh directory under the system temp dir.
fn temp_store() -> (FileKeyValueStore, PathBuf) {
    let root = std::env::temp_dir().join(format!("estate-portal-test-{}", Uuid::new_v4()));
    (FileKeyValueStore::new(&root), root)
}

fn cleanup(root: &PathBuf) {
    let _ = fs::remove_dir_all(root);
}

#[cfg(test)]
mod file_store_tests {
    use super::*;

    #[test]
    fn test_missing_key_reads_as_none() {
        let (store, root) = temp_store();

        // The directory does not exist yet; that is still "no record".
        assert_eq!(store.get_item(SESSION_KEY).unwrap(), None);
        assert!(!root.exists());
    }

    #[test]
    fn test_set_replaces_whole_record() {
        let (store, root) = temp_store();

        store.set_item(SESSION_KEY, r#"{"first":true,"long":"xxxxxxxx"}"#).unwrap();
        store.set_item(SESSION_KEY, r#"{"second":true}"#).unwrap();

        assert_eq!(
            store.get_item(SESSION_KEY).unwrap().as_deref(),
            Some(r#"{"second":true}"#)
        );
        // No staging file is left behind.
        let names: Vec<_> = fs::read_dir(&root)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec![format!("{SESSION_KEY}.json")]);

        cleanup(&root);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (store, root) = temp_store();
        store.set_item(SESSION_KEY, "{}").unwrap();

        store.remove_item(SESSION_KEY).unwrap();
        store.remove_item(SESSION_KEY).unwrap();

        assert_eq!(store.get_item(SESSION_KEY).unwrap(), None);
        cleanup(&root);
    }

    #[test]
    fn test_path_like_keys_are_rejected() {
        let (store, root) = temp_store();

        for key in ["", ".", "..", "../etc/passwd", "a/b", "a\\b", "auth user"] {
            assert!(
                matches!(store.set_item(key, "{}"), Err(StorageError::InvalidKey(_))),
                "key {key:?} should be rejected"
            );
            assert!(matches!(store.get_item(key), Err(StorageError::InvalidKey(_))));
        }
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn test_file_backed_session_survives_reload() {
        let (store, root) = temp_store();
        let storage = Arc::new(store) as KeyValueState;
        let directory = Arc::new(DemoAccountDirectory::without_latency()) as DirectoryState;

        let session = SessionStore::new(storage.clone(), directory.clone());
        session.initialize();
        assert!(session.login("agent@demo.com", "demo123", None).await.unwrap());

        let reloaded = SessionStore::new(storage.clone(), directory.clone());
        reloaded.initialize();
        assert_eq!(reloaded.current().unwrap().role, Role::Agent);

        reloaded.logout();
        let after_logout = SessionStore::new(storage, directory);
        after_logout.initialize();
        assert_eq!(after_logout.current(), None);

        cleanup(&root);
    }

    #[test]
    fn test_corrupt_file_is_discarded_on_initialize() {
        let (store, root) = temp_store();
        store.set_item(SESSION_KEY, "{ definitely not an identity").unwrap();
        let storage = Arc::new(store) as KeyValueState;

        let session = SessionStore::new(
            storage.clone(),
            Arc::new(DemoAccountDirectory::without_latency()) as DirectoryState,
        );
        session.initialize();

        assert_eq!(session.current(), None);
        assert_eq!(storage.get_item(SESSION_KEY).unwrap(), None);
        cleanup(&root);
    }
}

#[cfg(test)]
mod memory_store_tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryKeyValueStore::new();

        store.set_item("k", "v").unwrap();
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("v"));

        store.remove_item("k").unwrap();
        assert_eq!(store.get_item("k").unwrap(), None);
    }

    #[test]
    fn test_memory_store_failing_mode() {
        let store = MemoryKeyValueStore::new_failing();

        assert!(matches!(store.get_item("k"), Err(StorageError::Unavailable(_))));
        assert!(store.set_item("k", "v").is_err());
        assert!(store.remove_item("k").is_err());

        store.set_failing(false);
        assert_eq!(store.get_item("k").unwrap(), None);
    }
}
