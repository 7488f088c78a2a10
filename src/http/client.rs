//! HTTP client with built-in retry logic and error handling.

use log::debug;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::retry::{RetryPolicy, with_retry};

/// HTTP client with built-in retry logic for AxonFlow API calls.
///
/// Every verb helper runs through the retry executor; transient transport
/// failures and 5xx responses are retried per the configured policy while
/// classified client errors propagate immediately.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    retry: RetryPolicy,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Performs a GET request and deserializes the JSON response.
    #[tracing::instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {}...", url);

        with_retry(&self.retry, "GET", || async {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(Error::from_reqwest)?;
            decode_json(response).await
        })
        .await
    }

    /// Performs a POST request with a JSON body and deserializes the response.
    #[tracing::instrument(skip(self, body))]
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        debug!("POST {}...", url);

        with_retry(&self.retry, "POST", || async {
            let response = self
                .client
                .post(url)
                .json(body)
                .send()
                .await
                .map_err(Error::from_reqwest)?;
            decode_json(response).await
        })
        .await
    }

    /// Performs a PUT request with a JSON body and deserializes the response.
    #[tracing::instrument(skip(self, body))]
    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        debug!("PUT {}...", url);

        with_retry(&self.retry, "PUT", || async {
            let response = self
                .client
                .put(url)
                .json(body)
                .send()
                .await
                .map_err(Error::from_reqwest)?;
            decode_json(response).await
        })
        .await
    }

    /// Performs a DELETE request, discarding any response body.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, url: &str) -> Result<()> {
        debug!("DELETE {}...", url);

        with_retry(&self.retry, "DELETE", || async {
            let response = self
                .client
                .delete(url)
                .send()
                .await
                .map_err(Error::from_reqwest)?;
            check_status(response).await.map(|_| ())
        })
        .await
    }
}

/// Verifies the response status and deserializes the JSON body.
async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = check_status(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| Error::Serialization(format!("failed to parse JSON response: {}", e)))
}

/// Classifies non-2xx responses into the error taxonomy.
///
/// The server reports failures as `{"error": "..."}`; when the body is not
/// that shape, the raw text (or the status line) is used instead.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(Error::from_status(status, extract_error_message(status, &body)))
}

fn extract_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("error").and_then(|e| e.as_str()) {
            return message.to_string();
        }
    }
    if body.trim().is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        body.trim().to_string()
    }
}
