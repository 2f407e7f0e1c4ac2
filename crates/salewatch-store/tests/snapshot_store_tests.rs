// Integration tests for the file-backed snapshot store

#![allow(clippy::unwrap_used, clippy::expect_used)]

use salewatch_core::core_types::schema;
use salewatch_core::model::record::ATTR_LIST_PRICE_TEXT;
use salewatch_core::{MemoryEventSink, Money, Record, RunContext, RunEvent, Snapshot, WatchErrorKind};
use salewatch_store::SnapshotStore;
use std::fs;
use std::str::FromStr;
use std::sync::Arc;
use tempfile::TempDir;

fn setup() -> (TempDir, SnapshotStore) {
    let dir = TempDir::new().expect("Failed to create temp store directory");
    let store = SnapshotStore::new(dir.path().join("snapshot.json"));
    (dir, store)
}

fn ctx() -> (RunContext, Arc<MemoryEventSink>) {
    let sink = Arc::new(MemoryEventSink::new());
    (RunContext::new(sink.clone()), sink)
}

fn sample_snapshot() -> Snapshot {
    let deck = Record::new("https://shop.example.com/p/deck-1", "Baker Deck 8.0")
        .with_price(Money::from_str("39.95").unwrap())
        .with_list_price(Money::from_str("64.95").unwrap())
        .with_attribute("store", "Zumiez");
    let wheel = Record::new("https://shop.example.com/p/wheel-1", "Spitfire 52mm");
    [
        ("Zumiez_Decks", vec![deck]),
        ("Zumiez_Wheels", vec![wheel]),
        ("CCS_Decks", Vec::new()),
    ]
    .into_iter()
    .collect()
}

#[test]
fn test_round_trip_preserves_every_field() {
    let (_dir, store) = setup();
    let (ctx, sink) = ctx();
    let snapshot = sample_snapshot();

    store.save(&snapshot, &ctx).unwrap();
    let loaded = store.load(&ctx);

    assert_eq!(loaded, snapshot);
    assert_eq!(sink.count(schema::EVENT_STORE_SAVED), 1);
    assert_eq!(sink.count(schema::EVENT_STORE_LOADED), 1);
}

#[test]
fn test_money_scale_survives_round_trip() {
    let (_dir, store) = setup();
    let (ctx, _sink) = ctx();
    let snapshot = sample_snapshot();

    store.save(&snapshot, &ctx).unwrap();
    let loaded = store.try_load().unwrap().unwrap();

    let price = loaded.get("Zumiez_Decks").unwrap()[0].current_price.unwrap();
    assert_eq!(price.to_string(), "39.95");
}

#[test]
fn test_missing_store_loads_empty_without_error() {
    let (_dir, store) = setup();
    let (ctx, sink) = ctx();

    let loaded = store.load(&ctx);

    assert!(loaded.is_empty());
    assert_eq!(sink.count(schema::EVENT_STORE_MISSING), 1);
    assert_eq!(sink.count(schema::EVENT_STORE_CORRUPT), 0);
}

#[test]
fn test_corrupt_store_loads_empty_and_is_quarantined() {
    let (_dir, store) = setup();
    let (ctx, sink) = ctx();
    fs::write(store.path(), b"{\"format_version\": 1, \"sour").unwrap();

    let loaded = store.load(&ctx);

    assert!(loaded.is_empty());
    assert!(!store.path().exists());
    assert_eq!(
        fs::read(store.quarantine_path(ctx.run_id())).unwrap(),
        b"{\"format_version\": 1, \"sour"
    );

    let events = sink.events();
    let corrupt = events
        .iter()
        .find_map(|e| match e {
            RunEvent::StoreCorrupt {
                error,
                quarantined_to,
                ..
            } => Some((error.clone(), quarantined_to.clone())),
            _ => None,
        })
        .expect("StoreCorrupt event emitted");
    assert_eq!(corrupt.0.kind(), WatchErrorKind::StoreCorrupt);
    assert!(corrupt.1.is_some());
}

#[test]
fn test_repeated_corruption_keeps_every_quarantined_file() {
    let (dir, store) = setup();
    let (first, _) = ctx();
    let (second, _) = ctx();

    fs::write(store.path(), b"first garbage").unwrap();
    store.load(&first);
    fs::write(store.path(), b"second garbage").unwrap();
    store.load(&second);

    assert_eq!(fs::read(store.quarantine_path(first.run_id())).unwrap(), b"first garbage");
    assert_eq!(fs::read(store.quarantine_path(second.run_id())).unwrap(), b"second garbage");
    let quarantined = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().contains(".corrupt-"))
        .count();
    assert_eq!(quarantined, 2);
}

#[test]
fn test_unreadable_store_is_left_in_place() {
    let (_dir, store) = setup();
    let (ctx, sink) = ctx();
    // A directory at the store path exists but cannot be read as a file
    fs::create_dir(store.path()).unwrap();

    let loaded = store.load(&ctx);

    assert!(loaded.is_empty());
    assert!(store.path().is_dir());
    assert!(!store.quarantine_path(ctx.run_id()).exists());
    assert_eq!(sink.count(schema::EVENT_STORE_UNREADABLE), 1);
    assert_eq!(sink.count(schema::EVENT_STORE_CORRUPT), 0);
}

#[test]
fn test_legacy_store_with_unreadable_list_price_still_loads() {
    let (_dir, store) = setup();
    let (ctx, sink) = ctx();
    fs::write(
        store.path(),
        r#"{
            "Zumiez_Decks": [
                {"name": "A", "url": "https://z/a", "price_new": "$30.00", "price_old": "$50.00"},
                {"name": "B", "url": "https://z/b", "price_new": "$20.00", "price_old": "N/A"}
            ],
            "CCS_Wheels": [
                {"name": "C", "url": "https://c/c", "price_new": "$12.00"}
            ]
        }"#,
    )
    .unwrap();

    let loaded = store.load(&ctx);

    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.record_count(), 3);
    assert!(store.path().exists());
    assert_eq!(sink.count(schema::EVENT_STORE_CORRUPT), 0);
    let b = &loaded.get("Zumiez_Decks").unwrap()[1];
    assert_eq!(b.current_price, Some(Money::from_str("20.00").unwrap()));
    assert_eq!(b.previous_list_price, None);
    assert_eq!(b.attributes.get(ATTR_LIST_PRICE_TEXT).unwrap(), "N/A");
}

#[test]
fn test_digest_mismatch_is_corruption() {
    let (_dir, store) = setup();
    let (ctx, _sink) = ctx();
    store.save(&sample_snapshot(), &ctx).unwrap();

    let tampered = fs::read_to_string(store.path())
        .unwrap()
        .replace("39.95", "9.95");
    fs::write(store.path(), tampered).unwrap();

    let err = store.try_load().unwrap_err();
    assert_eq!(err.kind(), WatchErrorKind::StoreCorrupt);
    assert!(err.message().contains("digest mismatch"));
}

#[test]
fn test_unsupported_format_version_is_corruption() {
    let (_dir, store) = setup();
    fs::write(
        store.path(),
        r#"{"format_version": 99, "saved_at": "2026-01-01T00:00:00Z", "run_id": "r", "sources_digest": "", "sources": {}}"#,
    )
    .unwrap();

    let err = store.try_load().unwrap_err();
    assert_eq!(err.kind(), WatchErrorKind::StoreCorrupt);
}

#[test]
fn test_legacy_format_is_accepted() {
    let (_dir, store) = setup();
    fs::write(
        store.path(),
        r#"{
            "Zumiez_Wheels": [
                {"name": "Spitfire 52mm", "url": "https://z/1", "price_new": "$24.00", "price_old": "$40.00", "store": "Zumiez"},
                {"name": "Bones 54mm", "url": "https://z/2", "price_new": null}
            ]
        }"#,
    )
    .unwrap();

    let stored = store.try_load_stored().unwrap().unwrap();

    assert!(stored.is_legacy());
    let records = stored.snapshot.get("Zumiez_Wheels").unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].display_name, "Spitfire 52mm");
    assert_eq!(records[0].current_price, Some(Money::from_str("24.00").unwrap()));
    assert_eq!(records[0].previous_list_price, Some(Money::from_str("40").unwrap()));
    assert_eq!(records[0].attributes.get("store").unwrap(), "Zumiez");
    assert_eq!(records[1].current_price, None);
}

#[test]
fn test_legacy_store_is_rewritten_as_envelope_on_save() {
    let (_dir, store) = setup();
    let (ctx, _sink) = ctx();
    fs::write(
        store.path(),
        r#"{"A": [{"name": "x", "url": "https://a/x", "price_new": "1.00"}]}"#,
    )
    .unwrap();

    let loaded = store.load(&ctx);
    store.save(&loaded, &ctx).unwrap();

    let stored = store.try_load_stored().unwrap().unwrap();
    assert!(!stored.is_legacy());
    assert_eq!(stored.snapshot, loaded);
}

#[test]
fn test_save_leaves_no_temp_file() {
    let (dir, store) = setup();
    let (ctx, _sink) = ctx();

    store.save(&sample_snapshot(), &ctx).unwrap();
    store.save(&Snapshot::new(), &ctx).unwrap();

    let leftovers = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_str()
                .map(|s| s.ends_with(".tmp"))
                .unwrap_or(false)
        })
        .count();
    assert_eq!(leftovers, 0);
    assert!(store.try_load().unwrap().unwrap().is_empty());
}

#[test]
fn test_save_failure_emits_write_failed() {
    let dir = TempDir::new().unwrap();
    // Parent "directory" is a regular file, so the write cannot succeed
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, b"").unwrap();
    let store = SnapshotStore::new(blocker.join("snapshot.json"));
    let (ctx, sink) = ctx();

    let err = store.save(&sample_snapshot(), &ctx).unwrap_err();

    assert_eq!(err.kind(), WatchErrorKind::Io);
    assert_eq!(err.run_id(), Some(ctx.run_id()));
    assert_eq!(sink.count(schema::EVENT_STORE_WRITE_FAILED), 1);
}
