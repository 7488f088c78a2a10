//! Interceptor for OpenAI chat-completions style calls.

use serde_json::Value;

use super::{guard, join_fragments};
use crate::client::AxonFlowClient;
use crate::error::Result;

pub struct OpenAiInterceptor<'a> {
    client: &'a AxonFlowClient,
}

impl<'a> OpenAiInterceptor<'a> {
    pub fn new(client: &'a AxonFlowClient) -> Self {
        Self { client }
    }

    /// Pulls the governed prompt out of a chat-completions request body:
    /// the content of the last `user` message. Content may be a plain string
    /// or an array of content parts; unrecognized shapes extract as empty.
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
            Some(Value::Array(parts)) => join_fragments(
                parts
                    .iter()
                    .filter(|p| p.get("type").and_then(Value::as_str) == Some("text"))
                    .filter_map(|p| p.get("text").and_then(Value::as_str))
                    .collect(),
            ),
            _ => String::new(),
        }
    }

    /// Runs the supplied OpenAI call under governance.
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
        guard(self.client, "openai", prompt, user_token, call).await
    }
}
