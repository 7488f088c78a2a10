//! Interceptor for Anthropic messages-API style calls.

use serde_json::Value;

use super::{guard, join_fragments};
use crate::client::AxonFlowClient;
use crate::error::Result;

pub struct AnthropicInterceptor<'a> {
    client: &'a AxonFlowClient,
}

impl<'a> AnthropicInterceptor<'a> {
    pub fn new(client: &'a AxonFlowClient) -> Self {
        Self { client }
    }

    /// Pulls the governed prompt out of a messages-API request body: the
    /// content of the last `user` message, which is either a string or a list
    /// of content blocks whose `text` blocks are joined.
    pub fn extract_prompt(body: &Value) -> String {
        let Some(messages) = body.get("messages").and_then(Value::as_array) else {
            return String::new();
        };

        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.get("role").and_then(Value::as_str) == Some("user"));

        match last_user.and_then(|m| m.get("content")) {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Array(blocks)) => join_fragments(
                blocks
                    .iter()
                    .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
                    .filter_map(|b| b.get("text").and_then(Value::as_str))
                    .collect(),
            ),
            _ => String::new(),
        }
    }

    /// Runs the supplied Anthropic call under governance.
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
        guard(self.client, "anthropic", prompt, user_token, call).await
    }
}
