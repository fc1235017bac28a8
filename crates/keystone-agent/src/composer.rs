//! Agent and alias composition.
//!
//! Composition order within one call:
//!
//!   role → capability groups → prompt configurations → agent → alias
//!
//! The role is scoped to the agent's trust principal with two mandatory
//! grants: invoke permission on the exact foundation-model resource
//! identifier, and retrieve/retrieve-and-generate on a wildcard resource.
//! The wildcard is intentionally broad — the platform does not expose
//! per-knowledge-base identifiers at role-composition time.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use keystone_contracts::{
    agent::{
        AgentResource, AliasResource, CapabilityGroup, FoundationModel, OverridePayload,
        PromptConfiguration, PromptStage, StageOverride,
    },
    error::KeystoneResult,
    identity::{LogicalId, ResourceIdentity},
    resource::Resource,
};
use keystone_core::{
    clock::Clock,
    graph::{AgentHandle, AliasHandle, ResourceGraph, RoleHandle},
};
use keystone_iam::role::{allow, compose_role, RoleConfig};

use crate::overrides::StageOverrides;

/// Idle-session timeout applied to every composed agent.
const IDLE_SESSION_TTL_SECONDS: u32 = 1800;

/// The fixed name of the published alias.
const ALIAS_NAME: &str = "LATEST";

/// The agent's trust principal.
const AGENT_SERVICE_PRINCIPAL: &str = "bedrock.amazonaws.com";

/// Configuration for one agent and its published alias.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub agent_name: String,
    pub description: String,
    pub instruction: String,
    pub foundation_model: FoundationModel,
    pub identity: ResourceIdentity,
    /// Caller-supplied capability groups. Taken as a read-only view; the
    /// composer returns a new owned list and never mutates this one.
    #[serde(default)]
    pub capability_groups: Vec<CapabilityGroup>,
    /// Append the synthetic free-text user-input group.
    pub enable_user_input: bool,
    #[serde(default)]
    pub overrides: StageOverrides,
}

/// Handles to the subgraph composed for one agent.
#[derive(Debug, Clone)]
pub struct AgentOutput {
    pub agent: AgentHandle,
    pub alias: AliasHandle,
    pub role: RoleHandle,
}

/// Compose one agent, its execution role, and its published alias.
///
/// # Errors
///
/// `Configuration` on a logical-name collision; `DependencyOrder` when a
/// capability group names an executor function that was not composed first.
pub fn compose_agent(
    cfg: &AgentConfig,
    clock: &dyn Clock,
    graph: &mut ResourceGraph,
) -> KeystoneResult<AgentOutput> {
    let model_arn = foundation_model_arn(&cfg.identity, cfg.foundation_model);

    let role = compose_role(
        &RoleConfig {
            logical_name: format!("{}ExecutionRole", cfg.agent_name),
            role_name: Some(format!("BedrockExecutionRoleForAgents_{}", cfg.agent_name)),
            service_principal: AGENT_SERVICE_PRINCIPAL.to_string(),
            description: format!("IAM role for {}", cfg.agent_name),
            managed_policies: Vec::new(),
            statements: vec![
                // Scoped to the exact model identifier, never a wildcard.
                allow(&["bedrock:InvokeModel"], &[model_arn.as_str()]),
                allow(&["bedrock:Retrieve", "bedrock:RetrieveAndGenerate"], &["*"]),
            ],
        },
        graph,
    )?;

    let capability_groups = assemble_capability_groups(cfg);
    let prompt_configurations = assemble_prompt_configurations(&cfg.overrides);

    let agent = AgentResource {
        agent_name: cfg.agent_name.clone(),
        description: cfg.description.clone(),
        instruction: cfg.instruction.clone(),
        foundation_model: cfg.foundation_model,
        role: role.0.clone(),
        capability_groups: capability_groups.clone(),
        prompt_configurations,
        idle_session_ttl_seconds: IDLE_SESSION_TTL_SECONDS,
        auto_prepare: true,
    };

    let agent_id = LogicalId::new(cfg.agent_name.clone());
    graph.insert(agent_id.clone(), Resource::Agent(agent))?;
    graph.depends_on(&agent_id, &role.0)?;

    // Capability executors must be composed before the agent that wires them.
    for group in &capability_groups {
        if let Some(executor) = &group.executor {
            graph.depends_on(&agent_id, executor)?;
        }
    }

    let alias = compose_alias(&agent_id, clock, graph)?;

    debug!(
        agent = %cfg.agent_name,
        groups = capability_groups.len(),
        "agent composed"
    );

    Ok(AgentOutput {
        agent: AgentHandle(agent_id),
        alias,
        role,
    })
}

/// The exact resource identifier of the configured foundation model.
fn foundation_model_arn(identity: &ResourceIdentity, model: FoundationModel) -> String {
    format!(
        "arn:{}:bedrock:{}::foundation-model/{}",
        identity.partition,
        identity.region,
        model.model_id()
    )
}

/// Copy-on-append assembly of the agent's capability groups.
///
/// The caller's list is treated as a read-only view. When free-text input is
/// enabled the synthetic group is appended exactly once; a caller-supplied
/// group with the user-input signature suppresses the append.
fn assemble_capability_groups(cfg: &AgentConfig) -> Vec<CapabilityGroup> {
    let mut groups = cfg.capability_groups.clone();

    if cfg.enable_user_input {
        if groups.iter().any(CapabilityGroup::is_user_input) {
            warn!(
                agent = %cfg.agent_name,
                "user-input group already supplied; not appending the synthetic group"
            );
        } else {
            groups.push(CapabilityGroup::user_input());
        }
    }

    groups
}

/// Emit prompt configurations in the fixed stage order.
///
/// Each supplied stage emits its marker; only enabled stages emit a payload.
/// Stages with no configuration emit nothing at all.
fn assemble_prompt_configurations(overrides: &StageOverrides) -> Vec<PromptConfiguration> {
    let mut configurations = Vec::new();

    for stage in PromptStage::ALL {
        let Some(config) = overrides.get(stage) else {
            continue;
        };

        let payload = match config.to_override() {
            StageOverride::Disabled => {
                debug!(?stage, "stage disabled; emitting marker only");
                None
            }
            StageOverride::Enabled(fields) => {
                debug!(?stage, "stage override enabled");
                Some(OverridePayload::from_fields(&fields))
            }
        };

        configurations.push(PromptConfiguration {
            prompt_type: stage,
            payload,
        });
    }

    configurations
}

/// Compose the published alias for `agent_id`.
///
/// The alias is named by the fixed "latest" marker and described with the
/// publish timestamp from the injected clock. Its dependency edge guarantees
/// it is never provisioned before the agent it references.
fn compose_alias(
    agent_id: &LogicalId,
    clock: &dyn Clock,
    graph: &mut ResourceGraph,
) -> KeystoneResult<AliasHandle> {
    let timestamp = clock.now().format("%Y-%m-%d-%H-%M-%S");

    let alias = AliasResource {
        alias_name: ALIAS_NAME.to_string(),
        agent: agent_id.clone(),
        description: format!("Published at {timestamp}"),
    };

    let alias_id = LogicalId::new(format!("{}Alias", agent_id));
    graph.insert(alias_id.clone(), Resource::Alias(alias))?;
    graph.depends_on(&alias_id, agent_id)?;

    Ok(AliasHandle(alias_id))
}
