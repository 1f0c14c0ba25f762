//! Integration tests for `SqliteArchive`.

use chrono::{DateTime, Duration, TimeZone, Utc};
use commandsvc_archive::SqliteArchive;
use commandsvc_core::archive::{ARCHIVE_NAMESPACE, Archive, ArchiveKey};
use commandsvc_core::codec;
use commandsvc_core::error::ArchiveError;
use commandsvc_core::event::Event;
use commandsvc_mdm::{Command, Payload};

async fn ready_archive() -> SqliteArchive {
    let archive = SqliteArchive::in_memory(ARCHIVE_NAMESPACE).await.unwrap();
    archive.ensure_namespace().await.unwrap();
    archive
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

fn event_at(time: DateTime<Utc>, command: Command) -> Event {
    Event {
        id: uuid::Uuid::new_v4(),
        time,
        payload: Payload::new(command),
    }
}

// --- namespace ---

#[tokio::test]
async fn test_ensure_namespace_is_idempotent() {
    let archive = ready_archive().await;

    archive.ensure_namespace().await.unwrap();
    archive.ensure_namespace().await.unwrap();

    assert!(archive.scan(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_put_into_missing_namespace_fails_without_writing() {
    let archive = ready_archive().await;
    let other = archive.with_namespace("never.created");
    let key = ArchiveKey::from_time(base_time()).unwrap();

    let result = other.put(&key, b"value").await;

    match result {
        Err(ArchiveError::MissingNamespace(namespace)) => assert_eq!(namespace, "never.created"),
        other => panic!("expected MissingNamespace, got {other:?}"),
    }
    assert!(other.get(&key).await.unwrap().is_none());
    assert!(archive.get(&key).await.unwrap().is_none());
}

// --- put + get ---

#[tokio::test]
async fn test_put_and_get_encoded_event() {
    let archive = ready_archive().await;
    let event = event_at(
        base_time() + Duration::nanoseconds(123_456_789),
        Command::DeviceInformation {
            queries: vec!["UDID".into()],
        },
    );
    let key = event.archive_key().unwrap();

    archive.put(&key, &codec::encode(&event).unwrap()).await.unwrap();

    let stored = archive.get(&key).await.unwrap().unwrap();
    assert_eq!(codec::decode(&stored).unwrap(), event);
}

// --- ordering ---

#[tokio::test]
async fn test_scan_returns_events_in_creation_time_order() {
    let archive = ready_archive().await;
    // Offsets chosen so decimal renderings of the nanosecond keys differ in
    // length; insertion order is deliberately shuffled.
    let offsets = [1_000_000_000_i64, 7, 999, 10_000_000_000, 1_000];
    for offset in offsets {
        let event = event_at(base_time() + Duration::nanoseconds(offset), Command::ProfileList);
        archive
            .put(&event.archive_key().unwrap(), &codec::encode(&event).unwrap())
            .await
            .unwrap();
    }

    let records = archive.scan(None).await.unwrap();

    let times: Vec<_> = records
        .iter()
        .map(|record| codec::decode(&record.value).unwrap().time)
        .collect();
    let mut expected = offsets.to_vec();
    expected.sort_unstable();
    let expected: Vec<_> = expected
        .into_iter()
        .map(|offset| base_time() + Duration::nanoseconds(offset))
        .collect();
    assert_eq!(times, expected);
    for record in &records {
        assert_eq!(record.key.time(), codec::decode(&record.value).unwrap().time);
    }
}

#[tokio::test]
async fn test_scan_from_key_is_inclusive() {
    let archive = ready_archive().await;
    let keys: Vec<_> = (0..4)
        .map(|i| ArchiveKey::from_time(base_time() + Duration::seconds(i)).unwrap())
        .collect();
    for key in &keys {
        archive.put(key, b"v").await.unwrap();
    }

    let records = archive.scan(Some(&keys[2])).await.unwrap();

    let scanned: Vec<_> = records.iter().map(|record| record.key).collect();
    assert_eq!(scanned, keys[2..].to_vec());
}

// --- collisions ---

#[tokio::test]
async fn test_events_with_identical_time_overwrite_one_record() {
    let archive = ready_archive().await;
    let first = event_at(base_time(), Command::RestartDevice);
    let second = event_at(base_time(), Command::ShutDownDevice);
    assert_eq!(first.archive_key().unwrap(), second.archive_key().unwrap());

    archive
        .put(&first.archive_key().unwrap(), &codec::encode(&first).unwrap())
        .await
        .unwrap();
    archive
        .put(&second.archive_key().unwrap(), &codec::encode(&second).unwrap())
        .await
        .unwrap();

    let records = archive.scan(None).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(codec::decode(&records[0].value).unwrap(), second);
}

// --- isolation ---

#[tokio::test]
async fn test_namespaces_are_isolated() {
    let archive = ready_archive().await;
    let other = archive.with_namespace("other");
    other.ensure_namespace().await.unwrap();
    let key = ArchiveKey::from_time(base_time()).unwrap();

    archive.put(&key, b"mine").await.unwrap();
    other.put(&key, b"theirs").await.unwrap();

    assert_eq!(archive.get(&key).await.unwrap().unwrap(), b"mine");
    assert_eq!(other.get(&key).await.unwrap().unwrap(), b"theirs");
    assert_eq!(archive.scan(None).await.unwrap().len(), 1);
}

// --- concurrency ---

#[tokio::test]
async fn test_concurrent_puts_are_all_committed() {
    let archive = ready_archive().await;

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let archive = archive.clone();
            tokio::spawn(async move {
                let key = ArchiveKey::from_time(base_time() + Duration::milliseconds(i)).unwrap();
                archive.put(&key, &i.to_be_bytes()).await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let records = archive.scan(None).await.unwrap();
    assert_eq!(records.len(), 16);
    assert!(records.windows(2).all(|pair| pair[0].key < pair[1].key));
}
