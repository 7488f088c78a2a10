//! Convenience wrappers around third-party LLM provider call shapes.
//!
//! Each provider module knows how to pull the governed prompt text out of
//! that provider's request JSON. The shared guard flow here runs the policy
//! check before the provider call and reports an audit event after it; the
//! provider call itself is supplied by the caller and stays opaque to the SDK.

mod anthropic;
mod bedrock;
mod gemini;
mod ollama;
mod openai;

pub use anthropic::AnthropicInterceptor;
pub use bedrock::BedrockInterceptor;
pub use gemini::GeminiInterceptor;
pub use ollama::OllamaInterceptor;
pub use openai::OpenAiInterceptor;

use log::warn;

use crate::client::{AuditEvent, AxonFlowClient, PolicyCheckRequest};
use crate::error::{Error, Result};

/// Runs a provider call under governance.
///
/// Blocked decisions raise [`Error::PolicyBlocked`] without invoking the
/// provider call. Audit reporting is best-effort: a failure is logged and
/// never surfaced to the caller.
pub(crate) async fn guard<F, Fut>(
    client: &AxonFlowClient,
    provider: &str,
    prompt: String,
    user_token: Option<&str>,
    call: F,
) -> Result<serde_json::Value>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<serde_json::Value>>,
{
    let mut request = PolicyCheckRequest::new(prompt.clone()).with_provider(provider);
    if let Some(token) = user_token {
        request = request.with_user_token(token);
    }

    let decision = client.policy_check(&request).await?;

    if decision.blocked() {
        return Err(Error::PolicyBlocked {
            reason: decision
                .block_reason
                .unwrap_or_else(|| "blocked by policy".to_string()),
        });
    }

    let response = call().await?;

    let mut event = AuditEvent::new("llm_call")
        .with_provider(provider)
        .with_query(prompt)
        .with_decision_id(&decision.decision_id);
    if let Some(token) = user_token {
        event = event.with_user_token(token);
    }

    if let Err(e) = client.send_audit_event(&event).await {
        warn!("{}: audit event not recorded: {}", provider, e);
    }

    Ok(response)
}

/// Joins the extracted text fragments of a message, skipping empties.
pub(crate) fn join_fragments(fragments: Vec<&str>) -> String {
    fragments
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn test_client(url: &str) -> AxonFlowClient {
        AxonFlowClient::new(ClientConfig::new(url)).unwrap()
    }

    async fn mock_decision(server: &mut mockito::Server, allowed: bool) -> mockito::Mock {
        let body = if allowed {
            r#"{"allowed": true, "decision_id": "d-1"}"#
        } else {
            r#"{"allowed": false, "block_reason": "prompt contains secrets", "decision_id": "d-2"}"#
        };
        server
            .mock("POST", "/api/v1/policy/check")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    async fn mock_audit(server: &mut mockito::Server) -> mockito::Mock {
        server
            .mock("POST", "/api/v1/audit")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"recorded": true}"#)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_guard_allows_and_passes_response_through() {
        let mut server = mockito::Server::new_async().await;
        let _check = mock_decision(&mut server, true).await;
        let audit = mock_audit(&mut server).await;

        let client = test_client(&server.url());
        let response = guard(&client, "openai", "hello".to_string(), None, || async {
            Ok(serde_json::json!({"id": "resp-1"}))
        })
        .await
        .unwrap();

        assert_eq!(response["id"], "resp-1");
        audit.assert_async().await;
    }

    #[tokio::test]
    async fn test_guard_blocked_never_invokes_provider() {
        let mut server = mockito::Server::new_async().await;
        let _check = mock_decision(&mut server, false).await;

        let invoked = Arc::new(AtomicBool::new(false));
        let invoked_clone = Arc::clone(&invoked);

        let client = test_client(&server.url());
        let result = guard(&client, "openai", "secret stuff".to_string(), None, || {
            let invoked = Arc::clone(&invoked_clone);
            async move {
                invoked.store(true, Ordering::SeqCst);
                Ok(serde_json::json!({}))
            }
        })
        .await;

        match result {
            Err(Error::PolicyBlocked { reason }) => {
                assert_eq!(reason, "prompt contains secrets");
            }
            other => panic!("expected PolicyBlocked, got {:?}", other),
        }
        assert!(!invoked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_guard_audit_failure_is_best_effort() {
        let mut server = mockito::Server::new_async().await;
        let _check = mock_decision(&mut server, true).await;
        let _audit = server
            .mock("POST", "/api/v1/audit")
            .with_status(404)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let response = guard(&client, "ollama", "hi".to_string(), Some("u-1"), || async {
            Ok(serde_json::json!({"done": true}))
        })
        .await
        .unwrap();

        // The provider response survives even though the audit call failed
        assert_eq!(response["done"], true);
    }

    #[test]
    fn test_join_fragments_skips_empties() {
        assert_eq!(join_fragments(vec!["a", "", "b"]), "a\nb");
        assert_eq!(join_fragments(vec![]), "");
    }
}
