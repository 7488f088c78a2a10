//! Policy and plan CRUD pass-through calls.

use super::AxonFlowClient;
use super::types::{Plan, PlanRequest, Policy, PolicyRequest};
use crate::error::Result;

impl AxonFlowClient {
    #[tracing::instrument(skip(self))]
    pub async fn list_policies(&self) -> Result<Vec<Policy>> {
        let url = format!("{}/api/v1/policies", self.agent_url());
        self.http().get_json(&url).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_policy(&self, id: &str) -> Result<Policy> {
        let url = format!("{}/api/v1/policies/{}", self.agent_url(), id);
        self.http().get_json(&url).await
    }

    #[tracing::instrument(skip(self, request))]
    pub async fn create_policy(&self, request: &PolicyRequest) -> Result<Policy> {
        let url = format!("{}/api/v1/policies", self.agent_url());
        self.http().post_json(&url, request).await
    }

    #[tracing::instrument(skip(self, request))]
    pub async fn update_policy(&self, id: &str, request: &PolicyRequest) -> Result<Policy> {
        let url = format!("{}/api/v1/policies/{}", self.agent_url(), id);
        self.http().put_json(&url, request).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_policy(&self, id: &str) -> Result<()> {
        let url = format!("{}/api/v1/policies/{}", self.agent_url(), id);
        self.http().delete(&url).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_plans(&self) -> Result<Vec<Plan>> {
        let url = format!("{}/api/v1/plans", self.agent_url());
        self.http().get_json(&url).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_plan(&self, id: &str) -> Result<Plan> {
        let url = format!("{}/api/v1/plans/{}", self.agent_url(), id);
        self.http().get_json(&url).await
    }

    #[tracing::instrument(skip(self, request))]
    pub async fn create_plan(&self, request: &PlanRequest) -> Result<Plan> {
        let url = format!("{}/api/v1/plans", self.agent_url());
        self.http().post_json(&url, request).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_plan(&self, id: &str) -> Result<()> {
        let url = format!("{}/api/v1/plans/{}", self.agent_url(), id);
        self.http().delete(&url).await
    }
}
