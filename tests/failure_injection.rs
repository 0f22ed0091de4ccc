//! Failure injection tests: upstream rejections and transport failures.

use std::time::Duration;

use reqwest::StatusCode;

mod common;

use common::{client, relay_config, start_relay, MockUpstream};

const READING: &str = "power,meter=garage watts=412.5";

#[tokio::test]
async fn test_unauthorized_is_passed_through() {
    let upstream = MockUpstream::start(401, "unauthorized").await;
    let relay = start_relay(relay_config(upstream.url())).await;

    let res = client().post(relay.ingest_url()).body(READING).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.text().await.unwrap(), "InfluxDB Error (401): unauthorized");
    assert_eq!(upstream.calls(), 1, "no retries expected");
    relay.shutdown.trigger();
}

#[tokio::test]
async fn test_upstream_status_changes_are_observed() {
    let upstream = MockUpstream::start(503, "service unavailable").await;
    let relay = start_relay(relay_config(upstream.url())).await;
    let client = client();

    let res = client.post(relay.ingest_url()).body(READING).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.text().await.unwrap(), "InfluxDB Error (503): service unavailable");

    upstream.reply_with(204, "");
    let res = client.post(relay.ingest_url()).body(READING).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    upstream.reply_with(404, r#"{"code":"not found","message":"bucket \"sensors\" not found"}"#);
    let res = client.post(relay.ingest_url()).body(READING).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        res.text().await.unwrap(),
        r#"InfluxDB Error (404): {"code":"not found","message":"bucket \"sensors\" not found"}"#
    );

    assert_eq!(upstream.calls(), 3);
    relay.shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_upstream_is_500() {
    let dead_addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let mut config = relay_config(format!("http://{}/api/v2/write", dead_addr));
    config.timeouts.upstream_connect_secs = Some(2);
    let relay = start_relay(config).await;

    let res = client().post(relay.ingest_url()).body(READING).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = res.text().await.unwrap();
    assert!(body.starts_with("Internal server error during fetch: "), "{}", body);
    assert!(body.len() > "Internal server error during fetch: ".len(), "{}", body);
    relay.shutdown.trigger();
}

#[tokio::test]
async fn test_missing_upstream_url_is_500() {
    let relay = start_relay(relay_config(String::new())).await;

    let res = client().post(relay.ingest_url()).body(READING).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res
        .text()
        .await
        .unwrap()
        .starts_with("Internal server error during fetch: "));
    relay.shutdown.trigger();
}

#[tokio::test]
async fn test_upstream_timeout_is_500() {
    let upstream = MockUpstream::start(204, "").await;
    upstream.delay_by(Duration::from_secs(3));

    let mut config = relay_config(upstream.url());
    config.timeouts.upstream_request_secs = Some(1);
    let relay = start_relay(config).await;

    let res = client().post(relay.ingest_url()).body(READING).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    let body = res.text().await.unwrap();
    assert!(body.starts_with("Internal server error during fetch: "), "{}", body);
    assert!(body.contains("timed out"), "{}", body);
    assert_eq!(upstream.calls(), 1);
    relay.shutdown.trigger();
}

#[tokio::test]
async fn test_slow_upstream_is_awaited_by_default() {
    let upstream = MockUpstream::start(204, "").await;
    upstream.delay_by(Duration::from_secs(3));
    let relay = start_relay(relay_config(upstream.url())).await;

    let res = client().post(relay.ingest_url()).body(READING).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "Data received and forwarded successfully.");
    assert_eq!(upstream.calls(), 1);
    relay.shutdown.trigger();
}
