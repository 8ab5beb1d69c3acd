//! Push behaviour against the in-memory store
//!
//! Covers threshold routing, the stable-pointer + snapshot dual write,
//! envelope contents, dry-run and fail-fast on encrypt errors.

mod common;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use boot_sync::{
    EncryptionPolicy, MemoryStore, Namespace, RevisionStrategy, SyncConfig, SyncError, Uploader,
};
use chrono::{TimeZone, Utc};
use common::{relative_paths, write_file, FakeKms, KEY_ID};
use tempfile::TempDir;

fn namespace() -> Namespace {
    Namespace::new("dev", "app", "latest")
}

fn push_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
}

#[tokio::test]
async fn threshold_file_is_encrypted_and_larger_file_is_raw() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "at-limit.txt", vec![b'a'; 4000]);
    write_file(dir.path(), "over-limit.bin", vec![b'b'; 4001]);

    let store = MemoryStore::new();
    let kms = FakeKms::new();
    let uploader = Uploader::new(&store, &kms, namespace(), KEY_ID)
        .with_strategies(vec![RevisionStrategy::fixed("latest")]);

    let report = uploader.push_at(dir.path(), push_time()).await.unwrap();

    assert_eq!(
        store.keys(),
        vec![
            "dev/app/latest/at-limit.txt.enc",
            "dev/app/latest/over-limit.bin",
        ]
    );
    assert_eq!(report.encrypted(), 1);
    assert_eq!(store.object("dev/app/latest/over-limit.bin").unwrap(), vec![b'b'; 4001]);
    assert_eq!(kms.calls(), vec![format!("encrypt:{}:4000", KEY_ID)]);
}

#[tokio::test]
async fn injected_policy_moves_the_threshold() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "small.env", "A=1\n");

    let store = MemoryStore::new();
    let kms = FakeKms::new();
    let uploader = Uploader::new(&store, &kms, namespace(), KEY_ID)
        .with_policy(EncryptionPolicy::new(2))
        .with_strategies(vec![RevisionStrategy::fixed("latest")]);

    uploader.push_at(dir.path(), push_time()).await.unwrap();

    assert_eq!(store.keys(), vec!["dev/app/latest/small.env"]);
    assert!(kms.calls().is_empty());
}

#[tokio::test]
async fn push_writes_latest_and_snapshot_with_same_structure() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "boot.env", "DATABASE_URL=postgres://db/app\n");
    write_file(dir.path(), "certs/tls.pem", "-----BEGIN CERTIFICATE-----\n");
    write_file(dir.path(), "assets/blob.bin", vec![0u8; 8192]);
    std::fs::create_dir_all(dir.path().join("empty")).unwrap();

    let store = MemoryStore::new();
    let kms = FakeKms::new();
    let uploader = Uploader::new(&store, &kms, namespace(), KEY_ID);

    let report = uploader.push_at(dir.path(), push_time()).await.unwrap();

    assert_eq!(report.revisions, vec!["latest", "20260314.0930"]);
    assert_eq!(report.files(), 3);

    let keys = store.keys();
    let latest = relative_paths(&keys, "dev/app/latest");
    let snapshot = relative_paths(&keys, "dev/app/20260314.0930");
    assert_eq!(latest, vec!["assets/blob.bin", "boot.env", "certs/tls.pem"]);
    assert_eq!(latest, snapshot);
    assert_eq!(keys.len(), 6);
}

#[tokio::test]
async fn envelope_body_is_base64_of_kms_ciphertext() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "secret.txt", "hunter2");

    let store = MemoryStore::new();
    let kms = FakeKms::new();
    Uploader::new(&store, &kms, namespace(), KEY_ID)
        .with_strategies(vec![RevisionStrategy::fixed("latest")])
        .push_at(dir.path(), push_time())
        .await
        .unwrap();

    let body = store.object("dev/app/latest/secret.txt.enc").unwrap();
    assert_eq!(
        BASE64.decode(&body).unwrap(),
        FakeKms::seal(KEY_ID, b"hunter2")
    );
}

#[tokio::test]
async fn repush_overwrites_the_stable_revision() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "readme.txt", vec![b'1'; 5000]);

    let store = MemoryStore::new();
    let kms = FakeKms::new();
    let uploader = Uploader::new(&store, &kms, namespace(), KEY_ID);

    uploader.push_at(dir.path(), push_time()).await.unwrap();
    write_file(dir.path(), "readme.txt", vec![b'2'; 5000]);
    let later = Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 0).unwrap();
    uploader.push_at(dir.path(), later).await.unwrap();

    assert_eq!(store.object("dev/app/latest/readme.txt").unwrap(), vec![b'2'; 5000]);
    assert_eq!(store.object("dev/app/20260314.0930/readme.txt").unwrap(), vec![b'1'; 5000]);
    assert_eq!(store.object("dev/app/20260314.1000/readme.txt").unwrap(), vec![b'2'; 5000]);
}

#[tokio::test]
async fn dry_run_puts_nothing() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "boot.env", "A=1\n");
    write_file(dir.path(), "big.bin", vec![0u8; 5000]);

    let store = MemoryStore::new();
    let kms = FakeKms::new();
    let report = Uploader::new(&store, &kms, namespace(), KEY_ID)
        .with_dry_run(true)
        .push_at(dir.path(), push_time())
        .await
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.uploads.len(), 4);
    assert!(store.put_log().is_empty());
}

#[tokio::test]
async fn encrypt_failure_aborts_push() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.txt", "first");
    write_file(dir.path(), "b.txt", "second");

    let store = MemoryStore::new();
    let kms = FakeKms::with_key("alias/other");
    let err = Uploader::new(&store, &kms, namespace(), KEY_ID)
        .push_at(dir.path(), push_time())
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Push { ref path, .. } if path == "a.txt"));
    assert!(matches!(err.root_cause(), SyncError::Kms { operation: "encrypt", .. }));
    assert!(store.put_log().is_empty());
    assert_eq!(kms.calls().len(), 1);
}

#[tokio::test]
async fn push_from_config_requires_kms_key() {
    let store = MemoryStore::new();
    let kms = FakeKms::new();
    let config = SyncConfig {
        bucket: Some("acme-secrets".to_string()),
        ..Default::default()
    };

    let err = Uploader::from_config(&store, &kms, &config).err().unwrap();
    assert!(matches!(err, SyncError::Config { .. }));
}

#[tokio::test]
async fn push_rejects_missing_root() {
    let dir = TempDir::new().unwrap();
    let store = MemoryStore::new();
    let kms = FakeKms::new();

    let err = Uploader::new(&store, &kms, namespace(), KEY_ID)
        .push_at(&dir.path().join("missing"), push_time())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Io { operation: "stat", .. }));
}

#[tokio::test]
async fn invalid_snapshot_format_fails_before_any_put() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "boot.env", "A=1\n");

    let store = MemoryStore::new();
    let kms = FakeKms::new();
    let err = Uploader::new(&store, &kms, namespace(), KEY_ID)
        .with_strategies(vec![
            RevisionStrategy::fixed("latest"),
            RevisionStrategy::Timestamp {
                format: "%Y%m%d.%Q".to_string(),
            },
        ])
        .push_at(dir.path(), push_time())
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Config { .. }));
    assert!(store.put_log().is_empty());
    assert!(kms.calls().is_empty());
}
