//! Interceptor for Ollama generate/chat calls.

use serde_json::Value;

use super::guard;
use crate::client::AxonFlowClient;
use crate::error::Result;

pub struct OllamaInterceptor<'a> {
    client: &'a AxonFlowClient,
}

impl<'a> OllamaInterceptor<'a> {
    pub fn new(client: &'a AxonFlowClient) -> Self {
        Self { client }
    }

    /// Pulls the governed prompt out of an Ollama request body: `prompt` for
    /// the generate API, falling back to the last `user` message of the chat
    /// API.
    pub fn extract_prompt(body: &Value) -> String {
        if let Some(prompt) = body.get("prompt").and_then(Value::as_str) {
            return prompt.to_string();
        }

        body.get("messages")
            .and_then(Value::as_array)
            .and_then(|messages| {
                messages
                    .iter()
                    .rev()
                    .find(|m| m.get("role").and_then(Value::as_str) == Some("user"))
            })
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string()
    }

    /// Runs the supplied Ollama call under governance.
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
        guard(self.client, "ollama", prompt, user_token, call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_prompt_generate_api() {
        let body = json!({"model": "llama3", "prompt": "why is the sky blue?"});
        assert_eq!(
            OllamaInterceptor::extract_prompt(&body),
            "why is the sky blue?"
        );
    }

    #[test]
    fn test_extract_prompt_chat_api() {
        let body = json!({
            "model": "llama3",
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "name three rivers"}
            ]
        });
        assert_eq!(OllamaInterceptor::extract_prompt(&body), "name three rivers");
    }

    #[test]
    fn test_extract_prompt_missing_shape_is_empty() {
        assert_eq!(OllamaInterceptor::extract_prompt(&json!({})), "");
        assert_eq!(
            OllamaInterceptor::extract_prompt(&json!({"messages": []})),
            ""
        );
    }
}
