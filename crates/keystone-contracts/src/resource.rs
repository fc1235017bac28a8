//! Resource node types for roles, buckets, functions, and log sinks.
//!
//! These are the data shapes stored in the resource graph and serialized for
//! the provisioning engine. All of them are immutable once the composition
//! pass that produced them finishes; a changed configuration produces a new
//! graph for the engine to reconcile.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::agent::{AgentResource, AliasResource};
use crate::identity::LogicalId;
use crate::policy::{ManagedPolicyRef, PolicyDocument};

/// What happens to a resource when it is removed from the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemovalPolicy {
    Retain,
    Destroy,
}

/// How a bucket's contents are encrypted at rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BucketEncryption {
    /// Encryption with a provider-managed key. The default.
    ProviderManaged,
    /// Encryption with a key the caller owns. The key's own resource policy
    /// is mirrored by the bucket-policy extension operation.
    CallerManaged {
        /// Opaque reference to the caller's key (ARN or alias).
        key_ref: String,
    },
}

/// An execution role granted to exactly one trusted service principal.
///
/// Caller-supplied statements never land on the role directly — the role
/// composer merges them into a single custom managed policy attached
/// alongside any caller-supplied managed policy references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRole {
    pub role_name: String,
    pub description: String,
    /// The service trusted to assume this role, e.g. "lambda.amazonaws.com".
    pub service_principal: String,
    pub managed_policies: Vec<ManagedPolicyRef>,
    /// Statements accumulated by grant operations after the role itself is
    /// composed (e.g. a bucket granting read/write to its grantees).
    pub grants: PolicyDocument,
}

/// An encrypted, access-blocked storage bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageResource {
    /// Physical name: `lowercase(base-stage-account)`.
    pub bucket_name: String,
    /// ARN derived from the physical name at composition time.
    pub bucket_arn: String,
    pub encryption: BucketEncryption,
    pub removal_policy: RemovalPolicy,
    /// Always true. Public access is never configurable.
    pub block_public_access: bool,
    /// The bucket's resource policy. Always contains the insecure-transport
    /// DENY statement; grants and extensions append after it.
    pub resource_policy: PolicyDocument,
    /// Key-usage grants mirrored onto the caller-managed key, when present.
    /// Stays empty under provider-managed encryption.
    pub key_policy: PolicyDocument,
    /// Functions holding a read/write grant. A set: granting the same
    /// function twice is a no-op.
    pub grantees: BTreeSet<LogicalId>,
}

/// Memory, timeout, and retry settings for a compute function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeProfile {
    pub memory_mb: u32,
    pub timeout_seconds: u64,
    /// Retry attempts on asynchronous invocation failure.
    pub retry_attempts: u32,
}

/// Scaling bounds for a compute function.
///
/// `max_capacity` and `target_utilization` are required; the optional fields
/// are `None` when unset — a literal zero is a value, never "unset".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoscalingProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_capacity: Option<u32>,
    pub max_capacity: u32,
    /// Fraction of capacity to target, in (0.0, 1.0].
    pub target_utilization: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioned_concurrency: Option<u32>,
}

/// A compute function bound to its dedicated execution role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeResource {
    pub function_name: String,
    /// Opaque reference to the prebuilt handler artifact.
    pub handler: String,
    pub role: LogicalId,
    pub profile: RuntimeProfile,
    /// Sorted for deterministic serialization. Carries the stage under both
    /// the `stage` and `Stage` keys; older consumers read the lowercase key.
    pub environment: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserved_concurrency: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autoscaling: Option<AutoscalingProfile>,
}

/// The companion log sink composed next to every compute function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSink {
    /// `/aws/lambda/{function_name}`.
    pub log_group_name: String,
    pub retention_days: u32,
    pub removal_policy: RemovalPolicy,
}

/// A node in the resource graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Resource {
    Role(AccessRole),
    Bucket(StorageResource),
    Function(ComputeResource),
    LogSink(LogSink),
    Agent(AgentResource),
    Alias(AliasResource),
}

impl Resource {
    /// Short label used in error messages and graph listings.
    pub fn kind(&self) -> &'static str {
        match self {
            Resource::Role(_) => "role",
            Resource::Bucket(_) => "bucket",
            Resource::Function(_) => "function",
            Resource::LogSink(_) => "log-sink",
            Resource::Agent(_) => "agent",
            Resource::Alias(_) => "alias",
        }
    }
}
