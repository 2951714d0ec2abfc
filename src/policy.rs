//! IAM-style policy decisions.
//!
//! The response shape the gateway expects: a principal, a policy document
//! allowing or denying `execute-api:Invoke` on the method ARN, and an
//! optional string-valued context surfaced to the backend integration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Policy language version required by the gateway.
pub const POLICY_VERSION: &str = "2012-10-17";

/// The one action an authorizer decision covers.
pub const INVOKE_ACTION: &str = "execute-api:Invoke";

/// Whether the caller may invoke the method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// A single statement binding the effect to the method ARN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub action: String,
    pub effect: Effect,
    pub resource: String,
}

/// The IAM-style document wrapping the statement list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<PolicyStatement>,
}

/// The authorizer's answer to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResponse {
    /// Identity recorded for the caller.
    pub principal_id: String,

    /// The Allow/Deny policy for the requested method.
    pub policy_document: PolicyDocument,

    /// Optional string map surfaced to the backend; omitted when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<HashMap<String, String>>,
}

impl AuthorizerResponse {
    /// Build a decision for `resource` with the given effect. Pure
    /// construction; no I/O.
    pub fn new(
        principal_id: impl Into<String>,
        effect: Effect,
        resource: impl Into<String>,
        context: Option<HashMap<String, String>>,
    ) -> Self {
        Self {
            principal_id: principal_id.into(),
            policy_document: PolicyDocument {
                version: POLICY_VERSION.to_string(),
                statement: vec![PolicyStatement {
                    action: INVOKE_ACTION.to_string(),
                    effect,
                    resource: resource.into(),
                }],
            },
            context,
        }
    }

    /// The effect of the decision's single statement.
    pub fn effect(&self) -> Effect {
        self.policy_document.statement[0].effect
    }
}
