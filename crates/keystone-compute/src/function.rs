//! Compute function composition.
//!
//! One call composes the function, its dedicated execution role, and the
//! companion log sink. Configuration is resolved against a fixed default
//! profile before anything is inserted:
//!
//! | option                 | explicit value | unset (`None`)      |
//! |------------------------|----------------|---------------------|
//! | `timeout_seconds`      | used verbatim  | 300 (five minutes)  |
//! | `reserved_concurrency` | used verbatim  | no reservation      |
//! | `autoscaling`          | validated      | no autoscaling      |
//!
//! Memory (3008 MB) and async retry attempts (2) are fixed. The stage is
//! injected into the environment twice, under `stage` and `Stage` — older
//! consumers read the lowercase key, newer ones the capitalized key. The
//! duplication is intentional and must not be elided.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use keystone_contracts::{
    error::{KeystoneError, KeystoneResult},
    identity::LogicalId,
    policy::{ManagedPolicyRef, PolicyStatement},
    resource::{AutoscalingProfile, ComputeResource, LogSink, RemovalPolicy, Resource, RuntimeProfile},
};
use keystone_core::graph::{FunctionHandle, ResourceGraph, RoleHandle};
use keystone_iam::role::{compose_role, RoleConfig};

use crate::autoscaling::validate_profile;

/// Fixed moderate memory allocation, in MB.
const DEFAULT_MEMORY_MB: u32 = 3008;

/// Default timeout: five minutes.
const DEFAULT_TIMEOUT_SECONDS: u64 = 300;

/// Retry attempts on asynchronous invocation failure.
const RETRY_ATTEMPTS: u32 = 2;

/// Log retention: ten years.
const LOG_RETENTION_DAYS: u32 = 3653;

/// The managed policy every function role starts from.
const BASE_EXECUTION_POLICY: &str = "service-role/AWSLambdaBasicExecutionRole";

/// Configuration for one compute function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionConfig {
    /// Base name; the physical function name is `{name}-Function`.
    pub name: String,
    /// Opaque reference to the prebuilt handler artifact.
    pub handler: String,
    pub stage: String,
    #[serde(default)]
    pub managed_policies: Vec<ManagedPolicyRef>,
    #[serde(default)]
    pub statements: Vec<PolicyStatement>,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub reserved_concurrency: Option<u32>,
    #[serde(default)]
    pub autoscaling: Option<AutoscalingProfile>,
    /// Extra environment variables, merged under the injected stage keys.
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

/// Handles to the subgraph composed for one function.
#[derive(Debug, Clone)]
pub struct FunctionOutput {
    pub function: FunctionHandle,
    pub role: RoleHandle,
    pub log_sink: LogicalId,
}

/// Compose one function, its execution role, and its log sink into `graph`.
///
/// # Errors
///
/// `Configuration` when both `reserved_concurrency` and `autoscaling` are
/// set (the two scaling models are mutually exclusive), when the autoscaling
/// profile is out of range, or when a logical name collides.
pub fn compose_function(
    cfg: &FunctionConfig,
    graph: &mut ResourceGraph,
) -> KeystoneResult<FunctionOutput> {
    if cfg.reserved_concurrency.is_some() && cfg.autoscaling.is_some() {
        return Err(KeystoneError::configuration(
            "reserved_concurrency and autoscaling are mutually exclusive; set at most one",
        ));
    }
    if let Some(profile) = &cfg.autoscaling {
        validate_profile(profile)?;
    }

    let function_name = format!("{}-Function", cfg.name);

    let role = compose_role(
        &RoleConfig {
            logical_name: format!("{function_name}ExecutionRole"),
            role_name: None,
            service_principal: "lambda.amazonaws.com".to_string(),
            description: format!("Execution role for {function_name}"),
            managed_policies: {
                let mut policies = vec![ManagedPolicyRef::Aws(BASE_EXECUTION_POLICY.to_string())];
                policies.extend(cfg.managed_policies.iter().cloned());
                policies
            },
            statements: cfg.statements.clone(),
        },
        graph,
    )?;

    let log_sink_id = LogicalId::new(format!("{}-FunctionLogGroup", cfg.name));
    graph.insert(
        log_sink_id.clone(),
        Resource::LogSink(LogSink {
            log_group_name: format!("/aws/lambda/{function_name}"),
            retention_days: LOG_RETENTION_DAYS,
            removal_policy: RemovalPolicy::Retain,
        }),
    )?;

    let mut environment = cfg.environment.clone();
    // Injected twice for backward compatibility with older consumers.
    environment.insert("stage".to_string(), cfg.stage.clone());
    environment.insert("Stage".to_string(), cfg.stage.clone());

    let function = ComputeResource {
        function_name: function_name.clone(),
        handler: cfg.handler.clone(),
        role: role.0.clone(),
        profile: RuntimeProfile {
            memory_mb: DEFAULT_MEMORY_MB,
            timeout_seconds: cfg.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
            retry_attempts: RETRY_ATTEMPTS,
        },
        environment,
        reserved_concurrency: cfg.reserved_concurrency,
        autoscaling: cfg.autoscaling.clone(),
    };

    debug!(
        function = %function_name,
        timeout = function.profile.timeout_seconds,
        autoscaling = cfg.autoscaling.is_some(),
        "function composed"
    );

    let function_id = LogicalId::new(cfg.name.clone());
    graph.insert(function_id.clone(), Resource::Function(function))?;
    graph.depends_on(&function_id, &role.0)?;
    graph.depends_on(&function_id, &log_sink_id)?;

    Ok(FunctionOutput {
        function: FunctionHandle(function_id),
        role,
        log_sink: log_sink_id,
    })
}
