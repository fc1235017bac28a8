//! Bucket composition, grants, and policy extension.
//!
//! Every composed bucket carries the insecure-transport DENY statement.
//! That statement is not configurable: it is appended unconditionally before
//! any caller-supplied policy, so no combination of options can produce a
//! bucket reachable over unsecured transport.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use keystone_contracts::{
    error::KeystoneResult,
    identity::{LogicalId, ResourceIdentity},
    policy::{Condition, Effect, PolicyDocument, PolicyStatement, Principal},
    resource::{BucketEncryption, RemovalPolicy, Resource, StorageResource},
};
use keystone_core::graph::{BucketHandle, FunctionHandle, ResourceGraph, RoleHandle};

/// Key-usage actions mirrored onto a caller-managed encryption key whenever
/// the bucket policy is extended.
const KEY_USAGE_ACTIONS: [&str; 3] = ["kms:Encrypt", "kms:GenerateDataKey*", "kms:DescribeKey"];

/// Actions granted to a function by [`grant_read_write`].
const READ_WRITE_ACTIONS: [&str; 6] = [
    "s3:GetObject*",
    "s3:GetBucket*",
    "s3:List*",
    "s3:PutObject*",
    "s3:DeleteObject*",
    "s3:Abort*",
];

/// Configuration for one storage bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketConfig {
    /// Base name; the physical name is `lowercase(base-stage-account)`.
    pub bucket_name: String,
    pub identity: ResourceIdentity,
    /// `None` resolves to provider-managed encryption.
    #[serde(default)]
    pub encryption: Option<BucketEncryption>,
    /// `None` resolves to retain-on-removal.
    #[serde(default)]
    pub removal_policy: Option<RemovalPolicy>,
    /// Functions granted read/write at composition time.
    #[serde(default)]
    pub grantees: Vec<FunctionHandle>,
}

/// A scoped ALLOW extension applied by [`extend_bucket_policy`].
#[derive(Debug, Clone)]
pub struct PolicyExtension {
    pub principals: Vec<Principal>,
    pub actions: Vec<String>,
    pub resources: Vec<String>,
    pub bucket_policy_sid: Option<String>,
    pub key_policy_sid: Option<String>,
}

/// Resolve the configured encryption against its default.
///
/// Precedence: explicit caller value, else provider-managed. `None` is the
/// only "unset" — a caller-managed entry always wins, never a falsy check.
fn resolve_encryption(configured: &Option<BucketEncryption>) -> BucketEncryption {
    match configured {
        Some(encryption) => encryption.clone(),
        None => BucketEncryption::ProviderManaged,
    }
}

/// Resolve the configured removal policy against its default (retain).
fn resolve_removal_policy(configured: &Option<RemovalPolicy>) -> RemovalPolicy {
    match configured {
        Some(policy) => *policy,
        None => RemovalPolicy::Retain,
    }
}

/// Compose one bucket into `graph` and grant read/write to every configured
/// grantee.
///
/// # Errors
///
/// `Configuration` when the physical name collides with an existing node;
/// `DependencyOrder` when a grantee function was not composed first.
pub fn compose_bucket(cfg: &BucketConfig, graph: &mut ResourceGraph) -> KeystoneResult<BucketHandle> {
    let bucket_name = cfg.identity.physical_bucket_name(&cfg.bucket_name);
    let bucket_arn = cfg.identity.bucket_arn(&cfg.bucket_name);

    let mut resource_policy = PolicyDocument::new();
    resource_policy.push(deny_insecure_transport(&bucket_arn));

    let bucket = StorageResource {
        bucket_name: bucket_name.clone(),
        bucket_arn,
        encryption: resolve_encryption(&cfg.encryption),
        removal_policy: resolve_removal_policy(&cfg.removal_policy),
        block_public_access: true,
        resource_policy,
        key_policy: PolicyDocument::new(),
        grantees: Default::default(),
    };

    debug!(bucket = %bucket_name, "bucket composed");

    let id = LogicalId::new(bucket_name);
    graph.insert(id.clone(), Resource::Bucket(bucket))?;
    let handle = BucketHandle(id);

    for function in &cfg.grantees {
        grant_read_write(graph, &handle, function)?;
    }

    Ok(handle)
}

/// The mandatory statement blocking all access over unsecured transport.
fn deny_insecure_transport(bucket_arn: &str) -> PolicyStatement {
    PolicyStatement::deny(
        vec!["s3:*".to_string()],
        vec![bucket_arn.to_string(), format!("{bucket_arn}/*")],
    )
    .with_principal(Principal::Any)
    .with_condition(Condition::BoolEquals {
        key: "aws:SecureTransport".to_string(),
        value: false,
    })
}

/// Grant a compute function read/write on the bucket.
///
/// Idempotent per function: a second grant for the same function is skipped.
/// The grant lands on the function's execution role and records a
/// role → bucket dependency edge.
pub fn grant_read_write(
    graph: &mut ResourceGraph,
    bucket: &BucketHandle,
    function: &FunctionHandle,
) -> KeystoneResult<()> {
    // Resolve before mutating: both lookups validate composition order.
    let role_id = graph.function(function)?.role.clone();
    let bucket_arn = {
        let bucket_node = graph.bucket_mut(bucket)?;
        if !bucket_node.grantees.insert(function.0.clone()) {
            warn!(
                bucket = %bucket_node.bucket_name,
                function = %function.0,
                "read/write grant already present; skipping"
            );
            return Ok(());
        }
        bucket_node.bucket_arn.clone()
    };

    let role_handle = RoleHandle(role_id.clone());
    graph.role_mut(&role_handle)?.grants.push(PolicyStatement::allow(
        READ_WRITE_ACTIONS.iter().map(|s| s.to_string()).collect(),
        vec![bucket_arn.clone(), format!("{bucket_arn}/*")],
    ));

    debug!(function = %function.0, role = %role_id, "read/write granted");

    // The role's grant references the bucket ARN.
    graph.depends_on(&role_id, &bucket.0)
}

/// Append scoped ALLOW statements for explicit principal/action/resource
/// tuples, mirroring key-usage grants onto the encryption key when the
/// bucket is caller-managed.
///
/// Calling this twice with the same statement id produces two independent
/// statements. The composer does not deduplicate by sid — callers that need
/// one statement call this once.
pub fn extend_bucket_policy(
    graph: &mut ResourceGraph,
    bucket: &BucketHandle,
    extension: &PolicyExtension,
) -> KeystoneResult<()> {
    let bucket_node = graph.bucket_mut(bucket)?;

    let mut statement = PolicyStatement {
        sid: extension.bucket_policy_sid.clone(),
        effect: Effect::Allow,
        principals: extension.principals.clone(),
        actions: extension.actions.clone(),
        resources: extension.resources.clone(),
        conditions: Vec::new(),
    };
    bucket_node.resource_policy.push(statement.clone());

    if let BucketEncryption::CallerManaged { .. } = bucket_node.encryption {
        statement.sid = extension.key_policy_sid.clone();
        statement.actions = KEY_USAGE_ACTIONS.iter().map(|s| s.to_string()).collect();
        statement.resources = vec!["*".to_string()];
        bucket_node.key_policy.push(statement);
    }

    debug!(
        bucket = %bucket_node.bucket_name,
        statements = bucket_node.resource_policy.statements.len(),
        "bucket policy extended"
    );

    Ok(())
}
