//! HTTP-level tests for the storing service client.

mod common;

use std::time::{Duration, Instant};

use antiplagiat::content::{ContentError, ContentSource, HttpContentClient, RetryPolicy};
use common::harness::{fast_retry, spawn_fake_services};
use tokio_test::assert_ok;

#[tokio::test]
async fn test_body_download_succeeds_first_try() {
    let (server, fake) = spawn_fake_services().await.expect("fake services should start");
    fake.add_work(1, "Ann", "hw1", "hello body");

    let client = HttpContentClient::new(server.url(), fast_retry());
    let body = assert_ok!(client.fetch_body(1).await);

    assert_eq!(body, "hello body");
    assert_eq!(fake.download_hits(1), 1);
}

#[tokio::test]
async fn test_body_download_recovers_after_transient_failures() {
    let (server, fake) = spawn_fake_services().await.expect("fake services should start");
    fake.add_work(1, "Ann", "hw1", "eventually here");
    fake.fail_downloads(1, 2);

    let client = HttpContentClient::new(server.url(), fast_retry());
    let body = client.fetch_body(1).await.expect("third attempt should succeed");

    assert_eq!(body, "eventually here");
    assert_eq!(fake.download_hits(1), 3);
}

#[tokio::test]
async fn test_body_download_gives_up_after_three_attempts() {
    let (server, fake) = spawn_fake_services().await.expect("fake services should start");
    fake.add_work(1, "Ann", "hw1", "never served");
    fake.fail_downloads_forever(1);

    let client = HttpContentClient::new(server.url(), fast_retry());
    let err = client.fetch_body(1).await.unwrap_err();

    match err {
        ContentError::ContentUnavailable {
            work_id,
            attempts,
            last_error,
        } => {
            assert_eq!(work_id, 1);
            assert_eq!(attempts, 3);
            assert!(last_error.contains("503"), "last error: {last_error}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fake.download_hits(1), 3);
}

#[tokio::test]
async fn test_backoff_is_linear_and_skipped_after_last_attempt() {
    let (server, fake) = spawn_fake_services().await.expect("fake services should start");
    fake.fail_downloads_forever(1);

    let policy = RetryPolicy::default()
        .with_backoff_step(Duration::from_millis(100))
        .with_timeout(Duration::from_secs(2));
    let client = HttpContentClient::new(server.url(), policy);

    let start = Instant::now();
    let _ = client.fetch_body(1).await;
    let elapsed = start.elapsed();

    // 100ms after attempt 1, 200ms after attempt 2, nothing after attempt 3.
    assert!(elapsed >= Duration::from_millis(300), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(1500), "elapsed {:?}", elapsed);
}

#[tokio::test]
async fn test_missing_work_download_is_retried_then_unavailable() {
    let (server, fake) = spawn_fake_services().await.expect("fake services should start");

    let client = HttpContentClient::new(server.url(), fast_retry());
    let err = client.fetch_body(42).await.unwrap_err();

    assert!(matches!(err, ContentError::ContentUnavailable { .. }));
    assert_eq!(fake.download_hits(42), 3);
}

#[tokio::test]
async fn test_metadata_fetch() {
    let (server, fake) = spawn_fake_services().await.expect("fake services should start");
    fake.add_work(5, "Bob", "essay", "text");

    let client = HttpContentClient::new(server.url(), fast_retry());
    let meta = client.fetch_metadata(5).await.expect("metadata should load");

    assert_eq!(meta.student_name, "Bob");
    assert_eq!(meta.assignment_name, "essay");
    assert!(meta.uploaded_at.is_some());
}

#[tokio::test]
async fn test_metadata_not_found_is_not_retried() {
    let (server, fake) = spawn_fake_services().await.expect("fake services should start");

    let client = HttpContentClient::new(server.url(), fast_retry());
    let err = client.fetch_metadata(9).await.unwrap_err();

    assert!(matches!(err, ContentError::MetadataUnavailable { work_id: 9, .. }));
    assert_eq!(fake.metadata_hits(9), 1);
}

#[tokio::test]
async fn test_metadata_decode_failure_is_unavailable() {
    let (server, fake) = spawn_fake_services().await.expect("fake services should start");
    fake.add_work(3, "Cid", "hw", "text");
    fake.break_metadata(3);

    let client = HttpContentClient::new(server.url(), fast_retry());
    let err = client.fetch_metadata(3).await.unwrap_err();

    assert!(matches!(err, ContentError::MetadataUnavailable { .. }));
    assert_eq!(fake.metadata_hits(3), 1);
}
