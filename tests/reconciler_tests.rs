//! # Reconciler Integration Tests
//!
//! End-to-end ensure runs against an in-memory object store.

mod common;

use common::{reconciler_for, resource, FakeStore};
use s3_file_resource::controller::Outcome;
use s3_file_resource::provider::StoreError;
use s3_file_resource::resource::EnsureState;

#[tokio::test]
async fn test_present_downloads_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("readme.txt");
    let store = FakeStore::new().with_object("bucket1", "readme.txt", b"hello");
    let reconciler = reconciler_for(&store);

    let outcome = reconciler
        .ensure(&resource(&path, "/bucket1/readme.txt", EnsureState::Present))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Created { bytes: 5 });
    assert_eq!(std::fs::read(&path).unwrap(), b"hello");
    assert_eq!(store.gets(), 1);
}

#[tokio::test]
async fn test_present_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("readme.txt");
    let store = FakeStore::new().with_object("bucket1", "readme.txt", b"hello");
    let reconciler = reconciler_for(&store);
    let spec = resource(&path, "/bucket1/readme.txt", EnsureState::Present);

    reconciler.ensure(&spec).await.unwrap();
    store.put("bucket1", "readme.txt", b"changed remotely");
    let second = reconciler.ensure(&spec).await.unwrap();

    assert_eq!(second, Outcome::AlreadyPresent);
    assert_eq!(store.heads(), 0);
    assert_eq!(store.gets(), 1);
    assert_eq!(std::fs::read(&path).unwrap(), b"hello");
}

#[tokio::test]
async fn test_latest_converges_and_then_stays_quiet() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.yaml");
    std::fs::write(&path, b"old: true\n").unwrap();
    let store = FakeStore::new().with_object("config", "app/settings.yaml", b"new: true\n");
    let reconciler = reconciler_for(&store);
    let spec = resource(&path, "/config/app/settings.yaml", EnsureState::Latest);

    let first = reconciler.ensure(&spec).await.unwrap();
    let second = reconciler.ensure(&spec).await.unwrap();

    assert_eq!(first, Outcome::Updated { bytes: 10 });
    assert_eq!(second, Outcome::Unchanged);
    assert_eq!(store.heads(), 2);
    assert_eq!(store.gets(), 1);
    assert_eq!(std::fs::read(&path).unwrap(), b"new: true\n");
}

#[tokio::test]
async fn test_latest_missing_file_downloads_without_head() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file.bin");
    let store = FakeStore::new().with_object("bucket", "deep/nested/file.bin", &[1, 2, 3]);
    let reconciler = reconciler_for(&store);

    let outcome = reconciler
        .ensure(&resource(&path, "/bucket/deep/nested/file.bin", EnsureState::Latest))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Created { bytes: 3 });
    assert_eq!(store.heads(), 0);
}

#[tokio::test]
async fn test_head_failure_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file.txt");
    std::fs::write(&path, b"local").unwrap();
    let store = FakeStore::new();
    let reconciler = reconciler_for(&store);

    let err = reconciler
        .ensure(&resource(&path, "/bucket/missing.txt", EnsureState::Latest))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "NotFound");
    assert_eq!(store.gets(), 0);
    assert_eq!(std::fs::read(&path).unwrap(), b"local");
}

#[tokio::test]
async fn test_failed_download_keeps_previous_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file.txt");
    std::fs::write(&path, b"previous").unwrap();
    let store = FakeStore::new().with_object("bucket", "file.txt", b"replacement content");
    store.fail_gets_with(StoreError::new("RequestTimeout", "connection reset"));
    let reconciler = reconciler_for(&store);

    let err = reconciler
        .ensure(&resource(&path, "/bucket/file.txt", EnsureState::Latest))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "RequestTimeout");
    assert_eq!(std::fs::read(&path).unwrap(), b"previous");
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_multipart_etag_always_downloads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("large.bin");
    std::fs::write(&path, b"same bytes").unwrap();
    let store = FakeStore::new().with_object("bucket", "large.bin", b"same bytes");
    store.override_etag("bucket", "large.bin", "\"9b2cf535f27731c974343645a3985328-2\"");
    let reconciler = reconciler_for(&store);

    let outcome = reconciler
        .ensure(&resource(&path, "/bucket/large.bin", EnsureState::Latest))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Updated { bytes: 10 });
}

#[tokio::test]
async fn test_absent_removes_then_reports_absent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file.txt");
    std::fs::write(&path, b"x").unwrap();
    let store = FakeStore::new();
    let reconciler = reconciler_for(&store);
    let spec = resource(&path, "/bucket/file.txt", EnsureState::Absent);

    assert_eq!(reconciler.ensure(&spec).await.unwrap(), Outcome::Removed);
    assert!(!path.exists());
    assert_eq!(reconciler.ensure(&spec).await.unwrap(), Outcome::AlreadyAbsent);
    assert!(store.connected_regions().is_empty());
}

#[tokio::test]
async fn test_source_without_key_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file.txt");
    let store = FakeStore::new();
    let reconciler = reconciler_for(&store);

    let err = reconciler
        .ensure(&resource(&path, "/bucket-only", EnsureState::Present))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "LocatorError");
    assert!(store.connected_regions().is_empty());
}

#[tokio::test]
async fn test_missing_configuration_aborts_before_network() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file.txt");
    let store = FakeStore::new().with_object("bucket", "file.txt", b"x");
    let reconciler = reconciler_for(&store);
    let spec = s3_file_resource::resource::ResourceSpec::new(
        &path,
        "/bucket/file.txt",
        EnsureState::Present,
    );

    let err = reconciler.ensure(&spec).await.unwrap_err();

    assert_eq!(err.to_string(), "no valid configuration found");
    assert!(store.connected_regions().is_empty());
    assert!(!path.exists());
}
