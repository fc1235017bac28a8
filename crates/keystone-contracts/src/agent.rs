//! Conversational-agent resource types.
//!
//! The prompt-override pipeline is modeled as a tagged union per stage:
//! whether a payload exists is a type-level fact, not an emergent property
//! of conditionally-merged maps. A `Disabled` stage emits its marker alone;
//! an `Enabled` stage emits the full override payload with unset sampling
//! fields absent — never defaulted to zero.

use serde::{Deserialize, Serialize};

use crate::identity::LogicalId;

/// The foundation models an agent may be backed by.
///
/// The variant's model id is the exact resource identifier the role
/// composer scopes the invoke grant to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FoundationModel {
    AnthropicClaude3Sonnet,
    AnthropicClaude3Haiku,
    AmazonTitanTextExpress,
}

impl FoundationModel {
    /// The platform model identifier string.
    pub fn model_id(&self) -> &'static str {
        match self {
            FoundationModel::AnthropicClaude3Sonnet => "anthropic.claude-3-sonnet-20240229-v1:0",
            FoundationModel::AnthropicClaude3Haiku => "anthropic.claude-3-haiku-20240307-v1:0",
            FoundationModel::AmazonTitanTextExpress => "amazon.titan-text-express-v1",
        }
    }
}

/// Whether a capability group is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CapabilityState {
    Enabled,
    Disabled,
}

/// A named unit of agent capability.
///
/// Either a caller-supplied handler binding (an `executor` function) or a
/// built-in synthetic group identified by its `parent_signature`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityGroup {
    pub name: String,
    pub state: CapabilityState,
    /// Built-in group signature, e.g. "AMAZON.UserInput".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_signature: Option<String>,
    /// The compute function that handles this group, when caller-supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executor: Option<LogicalId>,
}

/// Signature of the built-in free-text user-input group.
pub const USER_INPUT_SIGNATURE: &str = "AMAZON.UserInput";

impl CapabilityGroup {
    /// A caller-supplied group handled by `executor`.
    pub fn handler(name: impl Into<String>, executor: LogicalId) -> Self {
        Self {
            name: name.into(),
            state: CapabilityState::Enabled,
            parent_signature: None,
            executor: Some(executor),
        }
    }

    /// The synthetic "accept free-text user input" group.
    pub fn user_input() -> Self {
        Self {
            name: "UserInput".to_string(),
            state: CapabilityState::Enabled,
            parent_signature: Some(USER_INPUT_SIGNATURE.to_string()),
            executor: None,
        }
    }

    /// True for the built-in user-input group, caller-supplied or synthetic.
    pub fn is_user_input(&self) -> bool {
        self.parent_signature.as_deref() == Some(USER_INPUT_SIGNATURE)
    }
}

/// The four fixed prompt-pipeline stages, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromptStage {
    PreProcessing,
    Orchestration,
    KnowledgeBaseResponseGeneration,
    PostProcessing,
}

impl PromptStage {
    /// Fixed emission order, regardless of caller supply order.
    pub const ALL: [PromptStage; 4] = [
        PromptStage::PreProcessing,
        PromptStage::Orchestration,
        PromptStage::KnowledgeBaseResponseGeneration,
        PromptStage::PostProcessing,
    ];
}

/// Override state emitted inside a stage payload. A payload is only emitted
/// for enabled stages, so the only value that ever serializes is `Enabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromptState {
    Enabled,
    Disabled,
}

/// Creation mode emitted inside a stage payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromptCreationMode {
    Overridden,
}

/// Template and sampling fields for an enabled stage.
///
/// Every field is optional: `Enabled` with no fields is a valid override
/// that falls back to platform defaults for everything unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideFields {
    pub base_prompt_template: Option<String>,
    #[serde(default)]
    pub stop_sequences: Vec<String>,
    pub maximum_length: Option<u32>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub top_k: Option<u32>,
}

/// Per-stage override configuration.
///
/// `Disabled` carries nothing — the stage falls back to platform defaults
/// and no payload is emitted for it.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOverride {
    Disabled,
    Enabled(OverrideFields),
}

/// Sampling parameters emitted verbatim inside a payload.
///
/// Unset fields serialize as absent. A reader must never observe a zero
/// that the caller did not write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

/// The full override payload emitted for an enabled stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverridePayload {
    pub prompt_state: PromptState,
    pub prompt_creation_mode: PromptCreationMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_prompt_template: Option<String>,
    pub inference_configuration: InferenceConfiguration,
}

impl OverridePayload {
    /// Build the payload for an enabled stage from its fields, verbatim.
    pub fn from_fields(fields: &OverrideFields) -> Self {
        Self {
            prompt_state: PromptState::Enabled,
            prompt_creation_mode: PromptCreationMode::Overridden,
            base_prompt_template: fields.base_prompt_template.clone(),
            inference_configuration: InferenceConfiguration {
                maximum_length: fields.maximum_length,
                stop_sequences: fields.stop_sequences.clone(),
                temperature: fields.temperature,
                top_p: fields.top_p,
                top_k: fields.top_k,
            },
        }
    }
}

/// One emitted entry of the agent's prompt-override list.
///
/// The stage marker is always present; the payload only for enabled stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptConfiguration {
    pub prompt_type: PromptStage,
    #[serde(flatten)]
    pub payload: Option<OverridePayload>,
}

/// The conversational-agent resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResource {
    pub agent_name: String,
    pub description: String,
    pub instruction: String,
    pub foundation_model: FoundationModel,
    pub role: LogicalId,
    pub capability_groups: Vec<CapabilityGroup>,
    pub prompt_configurations: Vec<PromptConfiguration>,
    pub idle_session_ttl_seconds: u32,
    /// Re-prepare automatically after any graph change.
    pub auto_prepare: bool,
}

/// The published alias depending on its agent.
///
/// Re-creatable without mutating the agent: only the description (a publish
/// timestamp) changes between publishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasResource {
    pub alias_name: String,
    pub agent: LogicalId,
    pub description: String,
}
