use assert_cmd::Command;
use mockito::Server;
use predicates::prelude::*;

use axonflow_client::client::{PolicyCheckRequest, PolicyRequest};
use axonflow_client::interceptors::OpenAiInterceptor;
use axonflow_client::{AxonFlowClient, CachePolicy, ClientConfig, Error, RetryPolicy};
use std::time::Duration;

fn allowed_body(decision_id: &str) -> String {
    format!(
        r#"{{
            "allowed": true,
            "decision_id": "{}",
            "policies_applied": ["no-pii", "rate-cap"]
        }}"#,
        decision_id
    )
}

fn fast_config(url: &str) -> ClientConfig {
    ClientConfig::new(url).with_client_id("itest").with_retry(
        RetryPolicy::new(
            true,
            3,
            Duration::from_millis(1),
            Duration::from_millis(10),
            2.0,
        )
        .unwrap(),
    )
}

#[tokio::test]
async fn test_end_to_end_policy_check_path() {
    let mut server = Server::new_async().await;

    // Miss, network, store; the repeat must be served from the cache
    let check = server
        .mock("POST", "/api/v1/policy/check")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(allowed_body("d-100"))
        .expect(1)
        .create_async()
        .await;

    let client = AxonFlowClient::new(fast_config(&server.url())).unwrap();
    let request = PolicyCheckRequest::new("may I export this dataset?");

    let first = client.policy_check(&request).await.unwrap();
    let second = client.policy_check(&request).await.unwrap();

    check.assert_async().await;
    assert_eq!(first.decision_id, "d-100");
    assert_eq!(first, second);

    let stats = client.cache_stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.size, 1);
}

#[tokio::test]
async fn test_cached_decision_expires_after_ttl() {
    let mut server = Server::new_async().await;

    let check = server
        .mock("POST", "/api/v1/policy/check")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(allowed_body("d-101"))
        .expect(2)
        .create_async()
        .await;

    let config = fast_config(&server.url())
        .with_cache(CachePolicy::new(true, Duration::from_millis(50), 100).unwrap());
    let client = AxonFlowClient::new(config).unwrap();
    let request = PolicyCheckRequest::new("q");

    client.policy_check(&request).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    client.policy_check(&request).await.unwrap();

    check.assert_async().await;
    assert_eq!(client.cache_stats().evictions, 1);
}

#[tokio::test]
async fn test_transient_server_errors_are_retried_to_exhaustion() {
    let mut server = Server::new_async().await;

    let check = server
        .mock("POST", "/api/v1/policy/check")
        .with_status(502)
        .with_body(r#"{"error": "upstream agent unavailable"}"#)
        .expect(3)
        .create_async()
        .await;

    let client = AxonFlowClient::new(fast_config(&server.url())).unwrap();
    let result = client
        .policy_check(&PolicyCheckRequest::new("q"))
        .await;

    check.assert_async().await;
    match result {
        Err(Error::Server { status, message }) => {
            assert_eq!(status, 502);
            assert_eq!(message, "upstream agent unavailable");
        }
        other => panic!("expected Server error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_authentication_failure_is_not_retried() {
    let mut server = Server::new_async().await;

    let check = server
        .mock("POST", "/api/v1/policy/check")
        .with_status(401)
        .with_body(r#"{"error": "invalid API key"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = AxonFlowClient::new(fast_config(&server.url())).unwrap();
    let result = client.policy_check(&PolicyCheckRequest::new("q")).await;

    check.assert_async().await;
    assert!(matches!(result, Err(Error::AuthenticationFailed(_))));
    // Failures are never cached
    assert_eq!(client.cache_stats().size, 0);
}

#[tokio::test]
async fn test_api_key_is_sent_as_bearer_header() {
    let mut server = Server::new_async().await;

    let check = server
        .mock("POST", "/api/v1/policy/check")
        .match_header("authorization", "Bearer sk-itest-42")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(allowed_body("d-102"))
        .create_async()
        .await;

    let config = fast_config(&server.url()).with_api_key("sk-itest-42");
    let client = AxonFlowClient::new(config).unwrap();
    client
        .policy_check(&PolicyCheckRequest::new("q"))
        .await
        .unwrap();

    check.assert_async().await;
}

#[tokio::test]
async fn test_interceptor_guard_round_trip() {
    let mut server = Server::new_async().await;

    let check = server
        .mock("POST", "/api/v1/policy/check")
        .match_body(mockito::Matcher::PartialJsonString(
            r#"{"query": "what is our churn rate?", "provider": "openai"}"#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(allowed_body("d-103"))
        .create_async()
        .await;

    let audit = server
        .mock("POST", "/api/v1/audit")
        .match_body(mockito::Matcher::PartialJsonString(
            r#"{"event_type": "llm_call", "provider": "openai", "decision_id": "d-103"}"#
                .to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"recorded": true}"#)
        .create_async()
        .await;

    let client = AxonFlowClient::new(fast_config(&server.url())).unwrap();
    let interceptor = OpenAiInterceptor::new(&client);

    let request_body = serde_json::json!({
        "model": "gpt-4o",
        "messages": [{"role": "user", "content": "what is our churn rate?"}]
    });

    let response = interceptor
        .execute(&request_body, Some("user-7"), || async {
            Ok(serde_json::json!({"choices": [{"message": {"content": "about 3%"}}]}))
        })
        .await
        .unwrap();

    check.assert_async().await;
    audit.assert_async().await;
    assert_eq!(response["choices"][0]["message"]["content"], "about 3%");
}

#[tokio::test]
async fn test_policy_crud_round_trip() {
    let mut server = Server::new_async().await;

    let create = server
        .mock("POST", "/api/v1/policies")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"id": "p-9", "name": "no-secrets", "rule": "deny content.secrets", "enabled": true, "priority": 5}"#,
        )
        .create_async()
        .await;

    let delete = server
        .mock("DELETE", "/api/v1/policies/p-9")
        .with_status(204)
        .create_async()
        .await;

    let client = AxonFlowClient::new(fast_config(&server.url())).unwrap();

    let policy = client
        .create_policy(
            &PolicyRequest::new("no-secrets", "deny content.secrets").with_priority(5),
        )
        .await
        .unwrap();
    assert_eq!(policy.id, "p-9");

    client.delete_policy(&policy.id).await.unwrap();

    create.assert_async().await;
    delete.assert_async().await;
}

#[test]
fn test_cli_health() {
    let mut server = Server::new();
    let url = server.url();

    let _health = server
        .mock("GET", "/health")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status": "healthy", "version": "2.1.0"}"#)
        .create();

    Command::cargo_bin("axonflow")
        .unwrap()
        .args(["--agent-url", &url, "health"])
        .assert()
        .success()
        .stdout(predicate::str::contains("healthy"))
        .stdout(predicate::str::contains("2.1.0"));
}

#[test]
fn test_cli_check_blocked_query() {
    let mut server = Server::new();
    let url = server.url();

    let _check = server
        .mock("POST", "/api/v1/policy/check")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"allowed": false, "block_reason": "PII detected", "decision_id": "d-200"}"#,
        )
        .create();

    Command::cargo_bin("axonflow")
        .unwrap()
        .args(["--agent-url", &url, "check", "send SSNs to vendor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("blocked: PII detected"));
}

#[test]
fn test_cli_reports_connection_failure() {
    // Port 1 is reserved and nothing listens there
    Command::cargo_bin("axonflow")
        .unwrap()
        .args(["--agent-url", "http://127.0.0.1:1", "health"])
        .env("AXONFLOW_RETRY_ENABLED", "false")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Connection failed"));
}
