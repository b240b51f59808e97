//! Contract Test: Instance Metadata Service
//!
//! Constraints verified:
//! - IMDSv2 token is requested once and sent on every read
//! - Token failure degrades to token-less reads
//! - Availability means the instance-id attribute answers
//! - Missing attributes are metadata errors

use registrar_core::Error;
use registrar_core::traits::MetadataSource;
use registrar_metadata_imds::ImdsMetadataSource;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source(server: &MockServer) -> ImdsMetadataSource {
    ImdsMetadataSource::new(Some(server.uri()), Duration::from_secs(2))
        .expect("source construction succeeds")
}

async fn mount_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("PUT"))
        .and(path("/latest/api/token"))
        .and(header("X-aws-ec2-metadata-token-ttl-seconds", "21600"))
        .respond_with(ResponseTemplate::new(200).set_body_string("session-token"))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn reads_with_session_token() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/latest/meta-data/public-ipv4"))
        .and(header("X-aws-ec2-metadata-token", "session-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("54.1.2.3"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/latest/meta-data/local-ipv4"))
        .and(header("X-aws-ec2-metadata-token", "session-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("10.0.0.5"))
        .mount(&server)
        .await;

    let source = source(&server);

    assert_eq!(source.get_metadata("/public-ipv4").await.unwrap(), "54.1.2.3");
    assert_eq!(source.get_metadata("/local-ipv4").await.unwrap(), "10.0.0.5");
}

#[tokio::test]
async fn token_failure_falls_back_to_v1() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/latest/api/token"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/latest/meta-data/local-ipv4"))
        .respond_with(ResponseTemplate::new(200).set_body_string("10.0.0.5"))
        .mount(&server)
        .await;

    let source = source(&server);

    assert_eq!(source.get_metadata("/local-ipv4").await.unwrap(), "10.0.0.5");
    assert_eq!(source.get_metadata("/local-ipv4").await.unwrap(), "10.0.0.5");

    let requests = server.received_requests().await.expect("recording enabled");
    let reads: Vec<_> = requests
        .iter()
        .filter(|r| r.method.as_str() == "GET")
        .collect();
    assert_eq!(reads.len(), 2);
    assert!(
        reads
            .iter()
            .all(|r| r.headers.get("X-aws-ec2-metadata-token").is_none())
    );
}

#[tokio::test]
async fn available_when_instance_id_answers() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/latest/meta-data/instance-id"))
        .respond_with(ResponseTemplate::new(200).set_body_string("i-0123456789abcdef0"))
        .mount(&server)
        .await;

    assert!(source(&server).available().await);
}

#[tokio::test]
async fn unavailable_when_instance_id_fails() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(!source(&server).available().await);
}

#[tokio::test]
async fn unreachable_endpoint_is_unavailable() {
    let source = ImdsMetadataSource::new(
        Some("http://127.0.0.1:1".to_string()),
        Duration::from_secs(1),
    )
    .expect("source construction succeeds");

    assert!(!source.available().await);
}

#[tokio::test]
async fn missing_attribute_is_a_metadata_error() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/latest/meta-data/public-ipv4"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = source(&server).get_metadata("/public-ipv4").await;

    assert!(matches!(result, Err(Error::Metadata(msg)) if msg.contains("404")));
}
