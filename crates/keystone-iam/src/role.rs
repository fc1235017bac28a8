//! Access-role composition.
//!
//! One call composes one role. Caller-supplied statements never replace the
//! caller's managed-policy references — they are merged into a single custom
//! managed policy named `{logical_name}CustomPolicy` and attached alongside.
//!
//! Validation runs before any node is inserted: a failed call leaves the
//! graph exactly as it was (fail-fast, no partial role).

use serde::{Deserialize, Serialize};
use tracing::debug;

use keystone_contracts::{
    error::{KeystoneError, KeystoneResult},
    identity::LogicalId,
    policy::{ManagedPolicyRef, PolicyDocument, PolicyStatement},
    resource::{AccessRole, Resource},
};
use keystone_core::graph::{ResourceGraph, RoleHandle};

/// Configuration for one access role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleConfig {
    /// Logical name of the role node; also the stem of the custom policy name.
    pub logical_name: String,
    /// Physical role name. Defaults to the logical name.
    #[serde(default)]
    pub role_name: Option<String>,
    /// The service trusted to assume this role, e.g. "bedrock.amazonaws.com".
    pub service_principal: String,
    pub description: String,
    /// Externally defined managed policies to attach.
    #[serde(default)]
    pub managed_policies: Vec<ManagedPolicyRef>,
    /// Inline statements, merged as one custom managed policy.
    #[serde(default)]
    pub statements: Vec<PolicyStatement>,
}

/// Compose one access role into `graph`.
///
/// Deterministic: identical input always produces an identical role node
/// under an identical logical id — no two calls for the same logical name
/// may produce divergent scoping.
///
/// # Errors
///
/// - `Configuration` when the service principal is empty or malformed, or
///   the logical name is already composed.
/// - `PolicyConflict` when the merged inline statements contradict.
pub fn compose_role(cfg: &RoleConfig, graph: &mut ResourceGraph) -> KeystoneResult<RoleHandle> {
    validate_service_principal(&cfg.service_principal)?;

    let mut managed_policies = cfg.managed_policies.clone();

    if !cfg.statements.is_empty() {
        let document = PolicyDocument {
            statements: cfg.statements.clone(),
        };
        document.detect_conflicts()?;
        managed_policies.push(ManagedPolicyRef::Custom {
            name: format!("{}CustomPolicy", cfg.logical_name),
            document,
        });
    }

    let role = AccessRole {
        role_name: cfg
            .role_name
            .clone()
            .unwrap_or_else(|| cfg.logical_name.clone()),
        description: cfg.description.clone(),
        service_principal: cfg.service_principal.clone(),
        managed_policies,
        grants: PolicyDocument::new(),
    };

    debug!(
        logical_name = %cfg.logical_name,
        principal = %cfg.service_principal,
        policies = role.managed_policies.len(),
        "role composed"
    );

    let id = LogicalId::new(cfg.logical_name.clone());
    graph.insert(id.clone(), Resource::Role(role))?;
    Ok(RoleHandle(id))
}

/// Reject empty or malformed service principals.
///
/// A principal is a DNS-style service name: non-empty, no whitespace, and at
/// least one dot ("bedrock.amazonaws.com", "lambda.amazonaws.com").
fn validate_service_principal(principal: &str) -> KeystoneResult<()> {
    if principal.is_empty() {
        return Err(KeystoneError::configuration(
            "service principal must not be empty",
        ));
    }
    if principal.chars().any(char::is_whitespace) {
        return Err(KeystoneError::Configuration {
            reason: format!("service principal '{principal}' contains whitespace"),
        });
    }
    if !principal.contains('.') {
        return Err(KeystoneError::Configuration {
            reason: format!("service principal '{principal}' is not a service domain"),
        });
    }
    Ok(())
}

/// Convenience: a role statement allowing `actions` on `resources`.
///
/// Thin wrapper kept so composer call-sites read like the grants they emit.
pub fn allow(actions: &[&str], resources: &[&str]) -> PolicyStatement {
    PolicyStatement::allow(
        actions.iter().map(|s| s.to_string()).collect(),
        resources.iter().map(|s| s.to_string()).collect(),
    )
}
