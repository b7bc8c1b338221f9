use storyline_core::{Entry, Property, SnapshotCache, TextRun};
use tempfile::TempDir;

fn titled_entry(id: &str, title: &str) -> Entry {
    let mut entry = Entry::new(id);
    entry.properties.insert(
        "Name".to_string(),
        Property::Title {
            title: vec![TextRun::new(title)],
        },
    );
    entry
}

fn cache_in(dir: &TempDir) -> SnapshotCache {
    SnapshotCache::new(dir.path().join("snapshot.json"))
}

#[test]
fn save_then_load_round_trips_for_matching_database_id() {
    let dir = TempDir::new().expect("temp dir");
    let cache = cache_in(&dir);
    let entries = vec![titled_entry("a", "First"), titled_entry("b", "Second")];

    cache.save("db-1", &entries);
    let loaded = cache.load("db-1").expect("snapshot should hit");

    assert_eq!(loaded, entries);
}

#[test]
fn load_with_different_database_id_misses_without_deleting() {
    let dir = TempDir::new().expect("temp dir");
    let cache = cache_in(&dir);
    cache.save("db-1", &[titled_entry("a", "First")]);

    assert!(cache.load("db-2").is_none());
    // The file stays; the original id still hits.
    assert!(cache.path().exists());
    assert!(cache.load("db-1").is_some());
}

#[test]
fn missing_file_is_a_miss() {
    let dir = TempDir::new().expect("temp dir");
    assert!(cache_in(&dir).load("db-1").is_none());
}

#[test]
fn corrupt_file_is_a_miss() {
    let dir = TempDir::new().expect("temp dir");
    let cache = cache_in(&dir);
    std::fs::write(cache.path(), "{not json").expect("write corrupt file");

    assert!(cache.load("db-1").is_none());
}

#[test]
fn unexpected_shape_is_a_miss() {
    let dir = TempDir::new().expect("temp dir");
    let cache = cache_in(&dir);
    std::fs::write(cache.path(), r#"{"database_id": "db-1"}"#).expect("write partial file");

    assert!(cache.load("db-1").is_none());
}

#[test]
fn unsupported_schema_version_is_a_miss() {
    let dir = TempDir::new().expect("temp dir");
    let cache = cache_in(&dir);
    let body = serde_json::json!({
        "database_id": "db-1",
        "fetched_at": "2026-08-06T12:00:00Z",
        "all_entries": [],
        "schema_version": 99
    });
    std::fs::write(cache.path(), body.to_string()).expect("write future snapshot");

    assert!(cache.load("db-1").is_none());
}

#[test]
fn save_overwrites_the_single_snapshot() {
    let dir = TempDir::new().expect("temp dir");
    let cache = cache_in(&dir);

    cache.save("db-1", &[titled_entry("a", "First")]);
    cache.save("db-2", &[titled_entry("b", "Second")]);

    // Last save wins: db-1 now misses, db-2 hits.
    assert!(cache.load("db-1").is_none());
    let loaded = cache.load("db-2").expect("latest snapshot should hit");
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, "b");
}

#[test]
fn save_into_unwritable_location_is_swallowed() {
    let cache = SnapshotCache::new("/nonexistent-root/storyline/snapshot.json");
    // Must not panic or surface an error.
    cache.save("db-1", &[titled_entry("a", "First")]);
    assert!(cache.load("db-1").is_none());
}

#[test]
fn snapshot_file_uses_the_documented_keys() {
    let dir = TempDir::new().expect("temp dir");
    let cache = cache_in(&dir);
    cache.save("db-1", &[titled_entry("a", "First")]);

    let raw = std::fs::read_to_string(cache.path()).expect("snapshot file exists");
    let body: serde_json::Value = serde_json::from_str(&raw).expect("snapshot is json");

    assert_eq!(body["database_id"], "db-1");
    assert_eq!(body["schema_version"], 1);
    assert!(body["fetched_at"].is_string());
    assert_eq!(body["all_entries"].as_array().map(Vec::len), Some(1));
}
