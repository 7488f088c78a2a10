//! Interceptor for Gemini generateContent style calls.

use serde_json::Value;

use super::{guard, join_fragments};
use crate::client::AxonFlowClient;
use crate::error::Result;

pub struct GeminiInterceptor<'a> {
    client: &'a AxonFlowClient,
}

impl<'a> GeminiInterceptor<'a> {
    pub fn new(client: &'a AxonFlowClient) -> Self {
        Self { client }
    }

    /// Pulls the governed prompt out of a generateContent request body: the
    /// joined `text` parts of the last entry in `contents`.
    pub fn extract_prompt(body: &Value) -> String {
        let Some(contents) = body.get("contents").and_then(Value::as_array) else {
            return String::new();
        };

        let Some(parts) = contents
            .last()
            .and_then(|c| c.get("parts"))
            .and_then(Value::as_array)
        else {
            return String::new();
        };

        join_fragments(
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect(),
        )
    }

    /// Runs the supplied Gemini call under governance.
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
        guard(self.client, "gemini", prompt, user_token, call).await
    }
}
