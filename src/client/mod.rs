//! AxonFlow governance client.
//!
//! The client owns the orchestrated request path for policy checks: derive a
//! cache key from the request, look it up, on a miss go to the network
//! through the retry executor, and store only allowed decisions back.

mod policies;
pub mod types;

use async_trait::async_trait;
use log::debug;

use crate::cache::{CacheStats, ResponseCache, cache_key};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::HttpClient;

pub use types::{
    AuditEvent, HealthStatus, Plan, PlanRequest, PlanStep, Policy, PolicyCheckRequest,
    PolicyDecision, PolicyRequest,
};

/// Governance operations downstream code may want to mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Governance: Send + Sync {
    async fn policy_check(&self, request: &PolicyCheckRequest) -> Result<PolicyDecision>;
    async fn health(&self) -> Result<HealthStatus>;
}

/// Client for the AxonFlow policy/governance service.
pub struct AxonFlowClient {
    http: HttpClient,
    agent_url: String,
    client_id: String,
    cache: ResponseCache,
}

impl AxonFlowClient {
    /// Creates a client from an explicit configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = config.build_http_client()?;
        Ok(Self {
            http: HttpClient::new(client, config.retry.clone()),
            agent_url: config.agent_url.trim_end_matches('/').to_string(),
            client_id: config.client_id,
            cache: ResponseCache::new(config.cache),
        })
    }

    /// Creates a client configured from `AXONFLOW_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn agent_url(&self) -> &str {
        &self.agent_url
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Checks a query against the governance policies.
    ///
    /// Identical queries from the same client are served from the response
    /// cache within its TTL. Only allowed decisions are cached; blocked
    /// decisions always go back to the network so that policy changes take
    /// effect immediately.
    #[tracing::instrument(skip(self, request))]
    pub async fn policy_check(&self, request: &PolicyCheckRequest) -> Result<PolicyDecision> {
        let request = self.with_default_client_id(request);
        let key = cache_key("policy_check", &request.query, Some(&request.client_id));

        if let Some(decision) = self.cache.get::<PolicyDecision>(&key) {
            debug!("policy check served from cache");
            return Ok(decision);
        }

        let decision = self.post_policy_check(&request).await?;

        if decision.allowed {
            self.cache.put(&key, &decision);
        }

        Ok(decision)
    }

    /// Checks a query against the governance policies, bypassing the cache.
    #[tracing::instrument(skip(self, request))]
    pub async fn policy_check_uncached(
        &self,
        request: &PolicyCheckRequest,
    ) -> Result<PolicyDecision> {
        let request = self.with_default_client_id(request);
        self.post_policy_check(&request).await
    }

    async fn post_policy_check(&self, request: &PolicyCheckRequest) -> Result<PolicyDecision> {
        let url = format!("{}/api/v1/policy/check", self.agent_url);
        self.http.post_json(&url, request).await
    }

    /// Queries the agent health endpoint. Never cached.
    #[tracing::instrument(skip(self))]
    pub async fn health(&self) -> Result<HealthStatus> {
        let url = format!("{}/health", self.agent_url);
        self.http.get_json(&url).await
    }

    /// Reports an audit event to the agent.
    #[tracing::instrument(skip(self, event))]
    pub async fn send_audit_event(&self, event: &AuditEvent) -> Result<()> {
        let url = format!("{}/api/v1/audit", self.agent_url);
        let _: serde_json::Value = self.http.post_json(&url, event).await?;
        Ok(())
    }

    /// Returns a snapshot of the response cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drops the cached decision for one query, if any.
    pub fn invalidate_cached_decision(&self, query: &str, client_id: Option<&str>) {
        let client_id = client_id.unwrap_or(&self.client_id);
        self.cache
            .invalidate(&cache_key("policy_check", query, Some(client_id)));
    }

    /// Drops all cached decisions.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub(crate) fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Fills in the configured client id when the request left it empty.
    fn with_default_client_id(&self, request: &PolicyCheckRequest) -> PolicyCheckRequest {
        let mut request = request.clone();
        if request.client_id.is_empty() {
            request.client_id = self.client_id.clone();
        }
        request
    }
}

#[async_trait]
impl Governance for AxonFlowClient {
    async fn policy_check(&self, request: &PolicyCheckRequest) -> Result<PolicyDecision> {
        AxonFlowClient::policy_check(self, request).await
    }

    async fn health(&self) -> Result<HealthStatus> {
        AxonFlowClient::health(self).await
    }
}
