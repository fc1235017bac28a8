//! The resource graph: typed nodes plus explicit dependency edges.
//!
//! A graph is the output of one composition pass. Composers append nodes and
//! edges; the provisioning engine consumes the serialized form. Node storage
//! is a `BTreeMap` so iteration and serialization order are deterministic —
//! identical input must produce a byte-identical graph.
//!
//! Edges always point from the dependent resource to its dependency
//! (alias → agent, function → role). Both endpoints must already exist when
//! the edge is declared; a dangling reference is a caller bug surfaced as
//! `DependencyOrder`, never silently deferred.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use keystone_contracts::{
    agent::{AgentResource, AliasResource},
    error::{KeystoneError, KeystoneResult},
    identity::LogicalId,
    resource::{AccessRole, ComputeResource, Resource, StorageResource},
};

/// Handle to a composed access role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleHandle(pub LogicalId);

/// Handle to a composed storage bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketHandle(pub LogicalId);

/// Handle to a composed compute function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionHandle(pub LogicalId);

/// Handle to a composed agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentHandle(pub LogicalId);

/// Handle to a composed agent alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasHandle(pub LogicalId);

/// A dependency edge: `from` must be provisioned after `to`.
pub type DependencyEdge = (LogicalId, LogicalId);

/// The full set of composed resources plus their dependency edges.
#[derive(Debug, Default, Serialize)]
pub struct ResourceGraph {
    nodes: BTreeMap<LogicalId, Resource>,
    edges: BTreeSet<DependencyEdge>,
}

impl ResourceGraph {
    /// An empty graph for a fresh composition pass.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node under `id`.
    ///
    /// Logical ids are unique within a pass; inserting a second node under
    /// the same id is a `Configuration` error, not a replacement.
    pub fn insert(&mut self, id: LogicalId, resource: Resource) -> KeystoneResult<()> {
        if self.nodes.contains_key(&id) {
            return Err(KeystoneError::Configuration {
                reason: format!("logical id '{}' is already composed", id),
            });
        }
        debug!(id = %id, kind = resource.kind(), "node composed");
        self.nodes.insert(id, resource);
        Ok(())
    }

    /// Declare that `from` depends on `to`.
    ///
    /// Both endpoints must already be composed. Declaring the same edge
    /// twice is a no-op.
    pub fn depends_on(&mut self, from: &LogicalId, to: &LogicalId) -> KeystoneResult<()> {
        for endpoint in [from, to] {
            if !self.nodes.contains_key(endpoint) {
                return Err(KeystoneError::DependencyOrder {
                    reason: format!(
                        "edge {} -> {} references '{}' which has not been composed",
                        from, to, endpoint
                    ),
                });
            }
        }
        self.edges.insert((from.clone(), to.clone()));
        Ok(())
    }

    /// True when a node exists under `id`.
    pub fn contains(&self, id: &LogicalId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Look up a node by id.
    pub fn get(&self, id: &LogicalId) -> Option<&Resource> {
        self.nodes.get(id)
    }

    /// Number of composed nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Iterate nodes in deterministic (id) order.
    pub fn nodes(&self) -> impl Iterator<Item = (&LogicalId, &Resource)> {
        self.nodes.iter()
    }

    /// Iterate dependency edges in deterministic order.
    pub fn edges(&self) -> impl Iterator<Item = &DependencyEdge> {
        self.edges.iter()
    }

    // ── Typed accessors ───────────────────────────────────────────────────────
    //
    // Composers cross-reference earlier subgraphs through handles. A missing
    // node is a DependencyOrder error; a node of the wrong kind means the
    // handle was forged or misrouted, which is a Configuration error.

    /// Resolve a role handle.
    pub fn role(&self, handle: &RoleHandle) -> KeystoneResult<&AccessRole> {
        match self.expect_node(&handle.0)? {
            Resource::Role(role) => Ok(role),
            other => Err(wrong_kind(&handle.0, "role", other)),
        }
    }

    /// Resolve a role handle mutably.
    ///
    /// Grant operations append to the role's accumulated grant statements
    /// while the composition pass is still open.
    pub fn role_mut(&mut self, handle: &RoleHandle) -> KeystoneResult<&mut AccessRole> {
        match self.nodes.get_mut(&handle.0) {
            Some(Resource::Role(role)) => Ok(role),
            Some(other) => {
                let kind = other.kind();
                Err(KeystoneError::Configuration {
                    reason: format!("'{}' is a {}, expected role", handle.0, kind),
                })
            }
            None => Err(missing_node(&handle.0)),
        }
    }

    /// Resolve a function handle.
    pub fn function(&self, handle: &FunctionHandle) -> KeystoneResult<&ComputeResource> {
        match self.expect_node(&handle.0)? {
            Resource::Function(function) => Ok(function),
            other => Err(wrong_kind(&handle.0, "function", other)),
        }
    }

    /// Resolve an agent handle.
    pub fn agent(&self, handle: &AgentHandle) -> KeystoneResult<&AgentResource> {
        match self.expect_node(&handle.0)? {
            Resource::Agent(agent) => Ok(agent),
            other => Err(wrong_kind(&handle.0, "agent", other)),
        }
    }

    /// Resolve an alias handle.
    pub fn alias(&self, handle: &AliasHandle) -> KeystoneResult<&AliasResource> {
        match self.expect_node(&handle.0)? {
            Resource::Alias(alias) => Ok(alias),
            other => Err(wrong_kind(&handle.0, "alias", other)),
        }
    }

    /// Resolve a bucket handle.
    pub fn bucket(&self, handle: &BucketHandle) -> KeystoneResult<&StorageResource> {
        match self.expect_node(&handle.0)? {
            Resource::Bucket(bucket) => Ok(bucket),
            other => Err(wrong_kind(&handle.0, "bucket", other)),
        }
    }

    /// Resolve a bucket handle mutably.
    ///
    /// Grant and policy-extension operations mutate the bucket node while
    /// the composition pass is still open.
    pub fn bucket_mut(&mut self, handle: &BucketHandle) -> KeystoneResult<&mut StorageResource> {
        match self.nodes.get_mut(&handle.0) {
            Some(Resource::Bucket(bucket)) => Ok(bucket),
            Some(other) => {
                let kind = other.kind();
                Err(KeystoneError::Configuration {
                    reason: format!("'{}' is a {}, expected bucket", handle.0, kind),
                })
            }
            None => Err(missing_node(&handle.0)),
        }
    }

    fn expect_node(&self, id: &LogicalId) -> KeystoneResult<&Resource> {
        self.nodes.get(id).ok_or_else(|| missing_node(id))
    }
}

fn missing_node(id: &LogicalId) -> KeystoneError {
    KeystoneError::DependencyOrder {
        reason: format!("'{}' has not been composed", id),
    }
}

fn wrong_kind(id: &LogicalId, expected: &str, found: &Resource) -> KeystoneError {
    KeystoneError::Configuration {
        reason: format!("'{}' is a {}, expected {}", id, found.kind(), expected),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
