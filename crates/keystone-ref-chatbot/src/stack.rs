//! The chatbot stack: one agent, its alias, a chat-log bucket, and an
//! action-handler function, composed leaves-first.
//!
//! Composition order is the dependency order: the handler function (and its
//! role) first, then the bucket that grants it read/write, then the agent
//! wired to the handler, and finally the alias. Every edge is declared
//! explicitly, so the provisioning engine realizes the graph in a valid
//! order without a runtime scheduler.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use keystone_agent::{compose_agent, AgentConfig, StageOverrides};
use keystone_compute::{compose_function, FunctionConfig};
use keystone_contracts::{
    agent::{CapabilityGroup, FoundationModel},
    error::{KeystoneError, KeystoneResult},
    identity::ResourceIdentity,
};
use keystone_core::{
    clock::Clock,
    graph::{AgentHandle, AliasHandle, BucketHandle, FunctionHandle, ResourceGraph},
};
use keystone_storage::{compose_bucket, BucketConfig};

/// Base name of the conversation-log bucket.
const CHAT_LOG_BUCKET: &str = "chat-logs";

/// Configuration for the complete chatbot stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatbotStackConfig {
    pub agent_name: String,
    pub identity: ResourceIdentity,
    pub instruction: String,
    pub foundation_model: FoundationModel,
    /// Opaque reference to the prebuilt action-handler artifact.
    pub action_handler: String,
    pub enable_user_input: bool,
    #[serde(default)]
    pub overrides: StageOverrides,
}

impl ChatbotStackConfig {
    /// Parse `s` as a TOML stack configuration.
    pub fn from_toml_str(s: &str) -> KeystoneResult<Self> {
        toml::from_str(s).map_err(|e| KeystoneError::Configuration {
            reason: format!("failed to parse stack TOML: {}", e),
        })
    }

    /// Read the file at `path` and parse it as stack configuration.
    pub fn from_file(path: &Path) -> KeystoneResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| KeystoneError::Configuration {
            reason: format!("failed to read stack config '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }
}

/// The composed stack: the graph plus handles into it.
#[derive(Debug)]
pub struct ChatbotStack {
    pub graph: ResourceGraph,
    pub agent: AgentHandle,
    pub alias: AliasHandle,
    pub bucket: BucketHandle,
    pub handler: FunctionHandle,
}

/// Compose the full chatbot stack.
pub fn compose_chatbot_stack(
    cfg: &ChatbotStackConfig,
    clock: &dyn Clock,
) -> KeystoneResult<ChatbotStack> {
    let mut graph = ResourceGraph::new();

    let handler = compose_function(
        &FunctionConfig {
            name: format!("{}Action", cfg.agent_name),
            handler: cfg.action_handler.clone(),
            stage: cfg.identity.stage.clone(),
            managed_policies: Vec::new(),
            statements: Vec::new(),
            timeout_seconds: None,
            reserved_concurrency: None,
            autoscaling: None,
            environment: Default::default(),
        },
        &mut graph,
    )?;

    let bucket = compose_bucket(
        &BucketConfig {
            bucket_name: CHAT_LOG_BUCKET.to_string(),
            identity: cfg.identity.clone(),
            encryption: None,
            removal_policy: None,
            grantees: vec![handler.function.clone()],
        },
        &mut graph,
    )?;

    let agent = compose_agent(
        &AgentConfig {
            agent_name: cfg.agent_name.clone(),
            description: format!("Agent to answer user questions for {}", cfg.agent_name),
            instruction: cfg.instruction.clone(),
            foundation_model: cfg.foundation_model,
            identity: cfg.identity.clone(),
            capability_groups: vec![CapabilityGroup::handler(
                "UserQueryActions",
                handler.function.0.clone(),
            )],
            enable_user_input: cfg.enable_user_input,
            overrides: cfg.overrides.clone(),
        },
        clock,
        &mut graph,
    )?;

    info!(
        agent = %cfg.agent_name,
        stage = %cfg.identity.stage,
        nodes = graph.node_count(),
        "chatbot stack composed"
    );

    Ok(ChatbotStack {
        graph,
        agent: agent.agent,
        alias: agent.alias,
        bucket,
        handler: handler.function,
    })
}
