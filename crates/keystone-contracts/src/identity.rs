//! Logical identifiers and deployment identity.
//!
//! Physical resource names are deterministic functions of the logical name
//! and the deployment identity. Nothing in this module reads ambient state —
//! the same inputs always derive the same names.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier for a node within a single composition pass.
///
/// Logical ids are chosen by composers from configuration (never generated
/// randomly) so that re-running composition with identical input produces an
/// identical graph. Example: LogicalId("ChatbotAgentExecutionRole")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LogicalId(pub String);

impl LogicalId {
    /// Construct a logical id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The deployment context a graph is composed for.
///
/// Carried by every composer config that derives physical names or ARNs.
/// `stage` is the deployment stage label (e.g. "beta", "prod"); the
/// account/partition/region triple scopes ARN construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceIdentity {
    pub stage: String,
    pub account: String,
    pub partition: String,
    pub region: String,
}

impl ResourceIdentity {
    /// Derive the physical bucket name for `base`.
    ///
    /// Bucket names are globally unique and case-insensitive, so the joined
    /// `base-stage-account` form is lowercased unconditionally:
    /// `("Chat-Logs", stage=prod, account=123456789012)` →
    /// `"chat-logs-prod-123456789012"`.
    pub fn physical_bucket_name(&self, base: &str) -> String {
        format!("{}-{}-{}", base, self.stage, self.account).to_lowercase()
    }

    /// The ARN of the bucket named by [`physical_bucket_name`](Self::physical_bucket_name).
    pub fn bucket_arn(&self, base: &str) -> String {
        format!("arn:{}:s3:::{}", self.partition, self.physical_bucket_name(base))
    }
}
