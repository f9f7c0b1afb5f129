//! Roster lifecycle against a real file on disk.

use std::collections::HashSet;

use modulock_core::{CredentialKey, Error, Uid};
use modulock_storage::{CredentialStore, JsonFileBackend, MemoryBackend};
use proptest::prelude::*;
use tempfile::TempDir;

fn uid(text: &str) -> Uid {
    Uid::parse(text).unwrap()
}

#[test]
fn registration_conflicts_and_removal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users.json");
    let mut store = CredentialStore::open(JsonFileBackend::new(&path));
    assert!(store.is_empty());

    store.add("R1", "Alice", "AB12CD34").unwrap();
    assert_eq!(store.find_by_uid(&uid("AB12CD34")), Some("Alice"));

    assert!(matches!(
        store.add("R1", "Bob", "FFFFFFFF"),
        Err(Error::Conflict { key: CredentialKey::Ra, .. })
    ));
    assert!(matches!(
        store.add("R2", "Bob", "AB12CD34"),
        Err(Error::Conflict { key: CredentialKey::Uid, .. })
    ));

    store.remove("R1").unwrap();
    assert!(matches!(store.remove("R1"), Err(Error::NotFound { .. })));
    assert!(store.is_empty());
}

#[test]
fn roster_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users.json");

    {
        let mut store = CredentialStore::open(JsonFileBackend::new(&path));
        store.add("R1", "Alice", "ab12cd34").unwrap();
        store.add("R2", "Bob", "0A0B").unwrap();
        store.add("R3", "Carol", "FF").unwrap();
        store.remove("R2").unwrap();
    }

    let store = CredentialStore::open(JsonFileBackend::new(&path));
    let names: Vec<&str> = store.list().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Alice", "Carol"]);
    assert_eq!(store.find_by_uid(&uid("AB12CD34")), Some("Alice"));
}

#[test]
fn corrupt_file_degrades_to_empty_roster() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users.json");
    std::fs::write(&path, b"\x00\x01 garbage").unwrap();

    let mut store = CredentialStore::new(JsonFileBackend::new(&path));
    assert!(matches!(store.load(), Err(Error::Persistence(_))));
    assert!(store.is_empty());

    // The store stays usable and the next save repairs the file.
    store.add("R1", "Alice", "AB12CD34").unwrap();
    let reopened = CredentialStore::open(JsonFileBackend::new(&path));
    assert_eq!(reopened.len(), 1);
}

#[derive(Debug, Clone)]
enum Op {
    Add(u8, u8),
    Remove(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..8, 0u8..8).prop_map(|(ra, uid)| Op::Add(ra, uid)),
        (0u8..8).prop_map(Op::Remove),
    ]
}

proptest! {
    #[test]
    fn keys_stay_unique_and_roster_reloads(ops in proptest::collection::vec(op(), 0..40)) {
        let backend = MemoryBackend::new();
        let mut store = CredentialStore::new(backend.clone());

        for op in ops {
            match op {
                Op::Add(ra, raw) => {
                    let ra = format!("R{ra}");
                    let uid = format!("{raw:02x}");
                    let expect_ok = store.find_by_ra(&ra).is_none()
                        && store.find_by_uid(&Uid::parse(&uid).unwrap()).is_none();
                    prop_assert_eq!(store.add(&ra, "User", &uid).is_ok(), expect_ok);
                }
                Op::Remove(ra) => {
                    let ra = format!("R{ra}");
                    let present = store.find_by_ra(&ra).is_some();
                    let before = store.list().to_vec();
                    prop_assert_eq!(store.remove(&ra).is_ok(), present);
                    if !present {
                        prop_assert_eq!(store.list(), before.as_slice());
                    }
                }
            }

            let ras: HashSet<&str> = store.list().iter().map(|c| c.ra.as_str()).collect();
            let uids: HashSet<&str> = store.list().iter().map(|c| c.uid.as_str()).collect();
            prop_assert_eq!(ras.len(), store.len());
            prop_assert_eq!(uids.len(), store.len());
        }

        let reloaded = CredentialStore::open(backend.clone());
        prop_assert_eq!(reloaded.list(), store.list());
    }
}
