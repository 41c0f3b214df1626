//! End-to-end HTTP tests for the check pipeline.

mod common;

use antiplagiat::analysis::{METADATA_UNAVAILABLE, NO_MATCH_FOUND};
use common::harness::TestEnv;
use reqwest::StatusCode;
use serde_json::Value;

async fn post_check(env: &TestEnv, work_id: &str) -> (StatusCode, Value) {
    let resp = env
        .client()
        .post(format!("{}/check/{}", env.app.url(), work_id))
        .send()
        .await
        .expect("request should complete");
    let status = resp.status();
    let body = resp.json().await.unwrap_or(Value::Null);
    (status, body)
}

async fn get_report(env: &TestEnv, id: &Value) -> (StatusCode, Value) {
    let resp = env
        .client()
        .get(format!("{}/get-report/{}", env.app.url(), id))
        .send()
        .await
        .expect("request should complete");
    let status = resp.status();
    let body = resp.json().await.unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let env = TestEnv::start().await.expect("env should start");

    let resp = env
        .client()
        .get(format!("{}/health", env.app.url()))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_superset_peer_yields_full_score_report() {
    let env = TestEnv::start().await.expect("env should start");
    env.add_work(1, "Ann", "hw1", "the quick brown fox");
    env.add_work(2, "Bob", "hw1", "the quick brown fox jumps");

    let (status, summary) = post_check(&env, "1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["status"], "checked");
    assert_eq!(summary["plagiat_score"], 100.0);

    let (status, report) = get_report(&env, &summary["id"]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["plagiat_sources"], "Bob (work #2): 100.00%");
    let url = report["word_cloud_url"].as_str().expect("word cloud stored");
    assert!(url.starts_with(&format!("{}/wordcloud?", env.fakes.url())));
    assert!(url.contains("format=png"));
}

#[tokio::test]
async fn test_zero_peers_reports_no_match() {
    let env = TestEnv::start().await.expect("env should start");
    env.add_work(1, "Ann", "hw1", "unique submission");
    env.add_work(2, "Bob", "hw2", "unique submission");

    let (status, summary) = post_check(&env, "1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["plagiat_score"], 0.0);

    let (_, report) = get_report(&env, &summary["id"]).await;
    assert_eq!(report["plagiat_sources"], NO_MATCH_FOUND);
}

#[tokio::test]
async fn test_candidate_unreachable_fails_without_report() {
    let env = TestEnv::start().await.expect("env should start");
    env.add_work(1, "Ann", "hw1", "text");
    env.fake.fail_downloads_forever(1);

    let (status, body) = post_check(&env, "1").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], 500);
    assert_eq!(env.fake.download_hits(1), 3);
    assert_eq!(env.store.report_count(), 0);
}

#[tokio::test]
async fn test_check_twice_runs_pipeline_once() {
    let env = TestEnv::start().await.expect("env should start");
    env.add_work(1, "Ann", "hw1", "the quick brown fox");
    env.add_work(2, "Bob", "hw1", "a lazy dog");

    let (_, first) = post_check(&env, "1").await;
    let (_, second) = post_check(&env, "1").await;

    assert_eq!(first["id"], second["id"]);
    assert_eq!(env.fake.download_hits(1), 1);
    assert_eq!(env.fake.download_hits(2), 1);
    assert_eq!(env.fake.word_cloud_hits(), 1);
}

#[tokio::test]
async fn test_broken_metadata_degrades_report() {
    let env = TestEnv::start().await.expect("env should start");
    env.add_work(1, "Ann", "hw1", "identical");
    env.add_work(2, "Bob", "hw1", "identical");
    env.fake.break_metadata(1);

    let (status, summary) = post_check(&env, "1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["plagiat_score"], 0.0);

    let (_, report) = get_report(&env, &summary["id"]).await;
    assert_eq!(report["plagiat_sources"], METADATA_UNAVAILABLE);
    assert_eq!(env.fake.download_hits(2), 0);
}

#[tokio::test]
async fn test_unreachable_peers_are_counted() {
    let env = TestEnv::start().await.expect("env should start");
    env.add_work(1, "Ann", "hw1", "one two three four");
    env.add_work(2, "Bob", "hw1", "one two three four");
    env.add_work(3, "Cid", "hw1", "one two three");
    env.add_work(4, "Dee", "hw1", "five six");
    env.fake.fail_downloads_forever(2);

    let (status, summary) = post_check(&env, "1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["plagiat_score"], 75.0);

    let (_, report) = get_report(&env, &summary["id"]).await;
    assert_eq!(
        report["plagiat_sources"],
        "Cid (work #3): 75.00% [1 peer(s) skipped]"
    );
    assert_eq!(env.fake.download_hits(2), 3);
}

#[tokio::test]
async fn test_word_cloud_failure_is_not_fatal() {
    let env = TestEnv::start().await.expect("env should start");
    env.add_work(1, "Ann", "hw1", "some words here");
    env.fake.fail_word_cloud(true);

    let (status, summary) = post_check(&env, "1").await;
    assert_eq!(status, StatusCode::OK);

    let (_, report) = get_report(&env, &summary["id"]).await;
    assert!(report["word_cloud_url"].is_null());
    assert_eq!(env.fake.word_cloud_hits(), 1);
}

#[tokio::test]
async fn test_malformed_identifiers_are_rejected() {
    let env = TestEnv::start().await.expect("env should start");

    let (status, _) = post_check(&env, "abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_check(&env, "-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_report_is_not_found() {
    let env = TestEnv::start().await.expect("env should start");

    let (status, body) = get_report(&env, &Value::from(777)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}
