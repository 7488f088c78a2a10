//! Request and response types for the AxonFlow API.

use serde::{Deserialize, Serialize};

/// Policy check request submitted to the governance agent.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PolicyCheckRequest {
    pub query: String,
    pub client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl PolicyCheckRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            client_id: String::new(),
            user_token: None,
            provider: None,
            context: None,
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_user_token(mut self, user_token: impl Into<String>) -> Self {
        self.user_token = Some(user_token.into());
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }
}

/// Outcome of a policy check.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PolicyDecision {
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
    pub decision_id: String,
    #[serde(default)]
    pub policies_applied: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl PolicyDecision {
    /// True when the governance service refused the request.
    pub fn blocked(&self) -> bool {
        !self.allowed
    }
}

/// Audit event reported back to the agent after a governed call.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AuditEvent {
    pub event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            provider: None,
            query: None,
            decision_id: None,
            user_token: None,
            metadata: None,
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_decision_id(mut self, decision_id: impl Into<String>) -> Self {
        self.decision_id = Some(decision_id.into());
        self
    }

    pub fn with_user_token(mut self, user_token: impl Into<String>) -> Self {
        self.user_token = Some(user_token.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Service health report.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl HealthStatus {
    pub fn healthy(&self) -> bool {
        self.status == "healthy" || self.status == "ok"
    }
}

/// A governance policy as stored by the service.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Policy {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub rule: String,
    pub enabled: bool,
    #[serde(default)]
    pub priority: i32,
}

/// Body for policy create/update calls.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PolicyRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub rule: String,
    pub enabled: bool,
    #[serde(default)]
    pub priority: i32,
}

impl PolicyRequest {
    pub fn new(name: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            rule: rule.into(),
            enabled: true,
            priority: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// One step of a multi-agent execution plan.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PlanStep {
    pub tool: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

/// A governed multi-agent execution plan.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Plan {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub steps: Vec<PlanStep>,
    pub status: String,
}

/// Body for plan creation.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub name: String,
    pub steps: Vec<PlanStep>,
}

impl PlanRequest {
    pub fn new(name: impl Into<String>, steps: Vec<PlanStep>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }
}
