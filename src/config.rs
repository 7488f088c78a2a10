//! Client configuration, loadable from the environment.

use log::debug;
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CachePolicy;
use crate::error::{Error, Result};
use crate::retry::RetryPolicy;

/// SDK version stamped from git tags at build time.
pub const SDK_VERSION: &str = env!("AXONFLOW_SDK_VERSION");

const DEFAULT_AGENT_URL: &str = "http://localhost:8080";
const DEFAULT_CLIENT_ID: &str = "default";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Connection settings for an [`AxonFlowClient`](crate::client::AxonFlowClient).
///
/// Built either explicitly through the setters or from `AXONFLOW_*`
/// environment variables via [`ClientConfig::from_env`]. Immutable once the
/// client is constructed.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub agent_url: String,
    pub api_key: Option<String>,
    pub client_id: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub cache: CachePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            agent_url: DEFAULT_AGENT_URL.to_string(),
            api_key: None,
            client_id: DEFAULT_CLIENT_ID.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            retry: RetryPolicy::default(),
            cache: CachePolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(agent_url: impl Into<String>) -> Self {
        Self {
            agent_url: agent_url.into(),
            ..Self::default()
        }
    }

    /// Reads the configuration from `AXONFLOW_*` environment variables.
    ///
    /// Absent variables fall back to defaults; present but unparseable
    /// numeric values are rejected rather than silently ignored.
    pub fn from_env() -> Result<Self> {
        let agent_url =
            env::var("AXONFLOW_AGENT_URL").unwrap_or_else(|_| DEFAULT_AGENT_URL.to_string());
        let api_key = env::var("AXONFLOW_API_KEY").ok();
        let client_id =
            env::var("AXONFLOW_CLIENT_ID").unwrap_or_else(|_| DEFAULT_CLIENT_ID.to_string());
        let timeout = Duration::from_millis(env_parse("AXONFLOW_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?);

        let retry_defaults = RetryPolicy::default();
        let retry = RetryPolicy::new(
            env_parse("AXONFLOW_RETRY_ENABLED", retry_defaults.enabled)?,
            env_parse("AXONFLOW_RETRY_MAX_ATTEMPTS", retry_defaults.max_attempts)?,
            Duration::from_millis(env_parse(
                "AXONFLOW_RETRY_INITIAL_DELAY_MS",
                retry_defaults.initial_delay.as_millis() as u64,
            )?),
            Duration::from_millis(env_parse(
                "AXONFLOW_RETRY_MAX_DELAY_MS",
                retry_defaults.max_delay.as_millis() as u64,
            )?),
            env_parse("AXONFLOW_RETRY_MULTIPLIER", retry_defaults.multiplier)?,
        )?;

        let cache_defaults = CachePolicy::default();
        let cache = CachePolicy::new(
            env_parse("AXONFLOW_CACHE_ENABLED", cache_defaults.enabled)?,
            Duration::from_millis(env_parse(
                "AXONFLOW_CACHE_TTL_MS",
                cache_defaults.ttl.as_millis() as u64,
            )?),
            env_parse("AXONFLOW_CACHE_MAX_ENTRIES", cache_defaults.max_entries)?,
        )?;

        Ok(Self {
            agent_url,
            api_key,
            client_id,
            timeout,
            retry,
            cache,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_cache(mut self, cache: CachePolicy) -> Self {
        self.cache = cache;
        self
    }

    /// Builds the shared reqwest client: user agent, per-request timeout and,
    /// when an API key is configured, a sensitive bearer header on every
    /// request.
    pub fn build_http_client(&self) -> Result<Client> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.api_key {
            let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| Error::Validation(format!("invalid API key: {}", e)))?;
            auth_value.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth_value);
            debug!("Using AXONFLOW_API_KEY for authentication");
        }

        Client::builder()
            .user_agent(format!("axonflow-rust-sdk/{}", SDK_VERSION))
            .default_headers(headers)
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::Validation(format!("failed to build HTTP client: {}", e)))
    }
}

/// Parses an environment variable, falling back to `default` when absent.
fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Validation(format!("invalid value for {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}
