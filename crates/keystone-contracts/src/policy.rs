//! Policy grant types.
//!
//! A `PolicyDocument` is an ordered list of `PolicyStatement`s. Statements
//! are emitted verbatim to the provisioning engine; the only logic here is
//! conflict detection, which rejects an unconditioned ALLOW/DENY overlap on
//! the same action and resource rather than inventing a precedence rule.

use serde::{Deserialize, Serialize};

use crate::error::{KeystoneError, KeystoneResult};

/// The effect of a policy statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// The principal a statement applies to.
///
/// Identity policies (attached to a role) carry no principals; resource
/// policies (attached to a bucket or key) name them explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Principal {
    /// A trusted service principal, e.g. "bedrock.amazonaws.com".
    Service(String),
    /// An explicit ARN principal.
    Arn(String),
    /// Any principal. Used by the mandatory insecure-transport DENY.
    Any,
}

/// A typed condition entry on a statement.
///
/// A conditioned statement never participates in conflict detection: it
/// applies only in the stated circumstances, so it cannot contradict an
/// unconditioned grant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// `Bool` condition, e.g. key = "aws:SecureTransport", value = false.
    BoolEquals { key: String, value: bool },
}

/// One (principal, actions, resources, effect) grant tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyStatement {
    /// Optional statement id. Duplicate sids are legal — documents are
    /// ordered lists, not sid-keyed maps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub effect: Effect,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub principals: Vec<Principal>,
    pub actions: Vec<String>,
    pub resources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl PolicyStatement {
    /// An ALLOW statement over `actions` and `resources`, no principal.
    pub fn allow(actions: Vec<String>, resources: Vec<String>) -> Self {
        Self {
            sid: None,
            effect: Effect::Allow,
            principals: Vec::new(),
            actions,
            resources,
            conditions: Vec::new(),
        }
    }

    /// A DENY statement over `actions` and `resources`, no principal.
    pub fn deny(actions: Vec<String>, resources: Vec<String>) -> Self {
        Self {
            sid: None,
            effect: Effect::Deny,
            principals: Vec::new(),
            actions,
            resources,
            conditions: Vec::new(),
        }
    }

    /// Attach a statement id.
    pub fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }

    /// Add a principal.
    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principals.push(principal);
        self
    }

    /// Add a condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// True when the statement carries at least one condition.
    pub fn is_conditioned(&self) -> bool {
        !self.conditions.is_empty()
    }

    /// True when any action pattern of `self` covers any action of `other`,
    /// in either direction. `"*"` and trailing-`*` prefixes (e.g. `"s3:*"`)
    /// are treated as covering patterns.
    fn actions_overlap(&self, other: &Self) -> bool {
        self.actions
            .iter()
            .any(|a| other.actions.iter().any(|b| patterns_overlap(a, b)))
    }

    /// Resource counterpart of [`actions_overlap`](Self::actions_overlap).
    fn resources_overlap(&self, other: &Self) -> bool {
        self.resources
            .iter()
            .any(|a| other.resources.iter().any(|b| patterns_overlap(a, b)))
    }
}

/// True when `a` covers `b` or `b` covers `a`.
fn patterns_overlap(a: &str, b: &str) -> bool {
    pattern_covers(a, b) || pattern_covers(b, a)
}

/// True when `pattern` matches `value` exactly or via a trailing `*`.
fn pattern_covers(pattern: &str, value: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    match pattern.strip_suffix('*') {
        Some(prefix) => value.starts_with(prefix),
        None => pattern == value,
    }
}

/// An ordered list of policy statements.
///
/// Order is preserved exactly as composed; the provisioning engine receives
/// statements in composition order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyDocument {
    pub statements: Vec<PolicyStatement>,
}

impl PolicyDocument {
    /// An empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one statement. No deduplication happens here — callers that
    /// append the same statement twice get two statements.
    pub fn push(&mut self, statement: PolicyStatement) {
        self.statements.push(statement);
    }

    /// Reject contradictory grants.
    ///
    /// An unconditioned ALLOW and an unconditioned DENY that overlap on both
    /// an action and a resource contradict each other — there is no explicit
    /// precedence in this model, so the document is invalid. Conditioned
    /// statements are exempt: a DENY gated on `aws:SecureTransport = false`
    /// coexists with any unconditioned ALLOW.
    pub fn detect_conflicts(&self) -> KeystoneResult<()> {
        for (i, a) in self.statements.iter().enumerate() {
            if a.is_conditioned() {
                continue;
            }
            for b in &self.statements[i + 1..] {
                if b.is_conditioned() || a.effect == b.effect {
                    continue;
                }
                if a.actions_overlap(b) && a.resources_overlap(b) {
                    return Err(KeystoneError::PolicyConflict {
                        reason: format!(
                            "unconditioned {:?} ({:?}) and {:?} ({:?}) overlap with no explicit precedence",
                            a.effect, a.actions, b.effect, b.actions
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

/// A reference to a managed policy attached to a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ManagedPolicyRef {
    /// A provider-curated policy referenced by name,
    /// e.g. "service-role/AWSLambdaBasicExecutionRole".
    Aws(String),
    /// A policy owned by this graph, with its full document.
    Custom { name: String, document: PolicyDocument },
}
