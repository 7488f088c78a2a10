//! Interceptor for Amazon Bedrock model invocations.

use serde_json::Value;

use super::{guard, join_fragments};
use crate::client::AxonFlowClient;
use crate::error::Result;

pub struct BedrockInterceptor<'a> {
    client: &'a AxonFlowClient,
}

impl<'a> BedrockInterceptor<'a> {
    pub fn new(client: &'a AxonFlowClient) -> Self {
        Self { client }
    }

    /// Pulls the governed prompt out of a Bedrock request body.
    ///
    /// Converse-API bodies carry `messages[].content[].text`; legacy
    /// InvokeModel bodies carry a top-level `inputText`.
    pub fn extract_prompt(body: &Value) -> String {
        if let Some(messages) = body.get("messages").and_then(Value::as_array) {
            let last_user = messages
                .iter()
                .rev()
                .find(|m| m.get("role").and_then(Value::as_str) == Some("user"));

            if let Some(Value::Array(content)) = last_user.and_then(|m| m.get("content")) {
                return join_fragments(
                    content
                        .iter()
                        .filter_map(|c| c.get("text").and_then(Value::as_str))
                        .collect(),
                );
            }
        }

        body.get("inputText")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string()
    }

    /// Runs the supplied Bedrock call under governance.
    #[tracing::instrument(skip(self, request_body, call))]
    pub async fn execute<F, Fut>(
        &self,
        request_body: &Value,
        user_token: Option<&str>,
        call: F,
    ) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Value>>,
    {
        let prompt = Self::extract_prompt(request_body);
        guard(self.client, "bedrock", prompt, user_token, call).await
    }
}
