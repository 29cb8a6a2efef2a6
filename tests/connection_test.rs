use serde_json::json;

use extnodes::connection::{self, ConnectionStore, Credential};
use extnodes::nodes::ner::TextAnalyticsConnection;

/// Helper: a temp dir with a database path inside it.
fn temp_db() -> (String, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("extnodes.db");
    (path.to_str().unwrap().to_string(), dir)
}

fn westeurope() -> TextAnalyticsConnection {
    TextAnalyticsConnection {
        key: "k-123".to_string(),
        region: "westeurope".to_string(),
    }
}

// ── Storage CRUD ──────────────────────────────────────────────────

#[test]
fn get_returns_none_when_missing() {
    let store = ConnectionStore::open(":memory:").unwrap();
    assert!(store.get("default").unwrap().is_none());
}

#[test]
fn set_and_get_text_analytics() {
    let store = ConnectionStore::open(":memory:").unwrap();
    store
        .set("default", Credential::TextAnalytics(westeurope()))
        .unwrap();

    match store.get("default").unwrap().unwrap() {
        Credential::TextAnalytics(c) => assert_eq!(c, westeurope()),
    }
}

#[test]
fn set_overwrites_existing() {
    let store = ConnectionStore::open(":memory:").unwrap();
    store
        .set("default", Credential::TextAnalytics(westeurope()))
        .unwrap();
    store
        .set(
            "default",
            Credential::TextAnalytics(TextAnalyticsConnection {
                key: "k-456".to_string(),
                region: "eastus".to_string(),
            }),
        )
        .unwrap();

    let Credential::TextAnalytics(c) = store.get("default").unwrap().unwrap();
    assert_eq!(c.region, "eastus");
}

#[test]
fn remove_deletes_connection() {
    let store = ConnectionStore::open(":memory:").unwrap();
    store
        .set("default", Credential::TextAnalytics(westeurope()))
        .unwrap();
    store.remove("default").unwrap();
    assert!(store.get("default").unwrap().is_none());
}

#[test]
fn names_are_sorted() {
    let store = ConnectionStore::open(":memory:").unwrap();
    store
        .set("prod", Credential::TextAnalytics(westeurope()))
        .unwrap();
    store
        .set("dev", Credential::TextAnalytics(westeurope()))
        .unwrap();
    assert_eq!(store.names().unwrap(), ["dev", "prod"]);
}

#[test]
fn credential_serializes_with_type_tag() {
    let json = serde_json::to_value(Credential::TextAnalytics(westeurope())).unwrap();
    assert_eq!(
        json,
        json!({"type": "textanalytics", "key": "k-123", "region": "westeurope"})
    );
}

#[test]
fn resolve_returns_stored_connection() {
    let store = ConnectionStore::open(":memory:").unwrap();
    store
        .set("default", Credential::TextAnalytics(westeurope()))
        .unwrap();
    assert_eq!(
        store.resolve_text_analytics("default").unwrap(),
        Some(westeurope())
    );
}

// ── connect / disconnect ──────────────────────────────────────────

#[test]
fn connect_persists_to_file() {
    let (path, _dir) = temp_db();
    connection::connect(&path, "default", "k-123", " westeurope ").unwrap();

    let store = ConnectionStore::open(&path).unwrap();
    let Credential::TextAnalytics(c) = store.get("default").unwrap().unwrap();
    assert_eq!(c, westeurope());
}

#[test]
fn connect_rejects_empty_key() {
    let (path, _dir) = temp_db();
    assert!(connection::connect(&path, "default", "", "westeurope").is_err());
}

#[test]
fn disconnect_removes_connection() {
    let (path, _dir) = temp_db();
    connection::connect(&path, "default", "k-123", "westeurope").unwrap();
    connection::disconnect(&path, "default").unwrap();

    let store = ConnectionStore::open(&path).unwrap();
    assert!(store.get("default").unwrap().is_none());
}

// ── injection ─────────────────────────────────────────────────────

#[test]
fn inject_adds_missing_connection() {
    let mut config = json!({"text": "hi"});
    connection::inject(&mut config, &westeurope()).unwrap();
    assert_eq!(config["connection"]["region"], "westeurope");
}

#[test]
fn inject_keeps_explicit_connection() {
    let mut config = json!({"connection": {"key": "mine", "region": "eastus"}});
    connection::inject(&mut config, &westeurope()).unwrap();
    assert_eq!(config["connection"]["key"], "mine");
}

#[test]
fn inject_rejects_non_object_config() {
    let mut config = json!("text");
    assert!(connection::inject(&mut config, &westeurope()).is_err());
}
