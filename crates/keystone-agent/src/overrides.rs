//! Prompt-override configuration.
//!
//! Callers describe at most four stage overrides, one per fixed pipeline
//! stage. The raw configuration form carries a required `prompt_state` plus
//! optional template and sampling fields; it converts into the
//! [`StageOverride`] tagged union, after which the presence or absence of a
//! payload is a type-level fact.
//!
//! Configuration is TOML-loadable:
//!
//! ```toml
//! [orchestration]
//! prompt_state = "ENABLED"
//! base_prompt_template = "You are a leave-policy assistant."
//! temperature = 0.7
//!
//! [post_processing]
//! prompt_state = "DISABLED"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use keystone_contracts::{
    agent::{OverrideFields, PromptStage, PromptState, StageOverride},
    error::{KeystoneError, KeystoneResult},
};

/// Raw per-stage configuration as supplied by the caller.
///
/// `prompt_state` is mandatory — a stage table without it is structurally
/// invalid. Everything else is optional: `ENABLED` with no further fields is
/// a valid override that falls back to platform defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOverrideConfig {
    pub prompt_state: PromptState,
    #[serde(default)]
    pub base_prompt_template: Option<String>,
    #[serde(default)]
    pub stop_sequences: Vec<String>,
    #[serde(default)]
    pub maximum_length: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub top_p: Option<f64>,
    #[serde(default)]
    pub top_k: Option<u32>,
}

impl StageOverrideConfig {
    /// Convert into the tagged union. A `DISABLED` stage drops its fields —
    /// nothing from a disabled stage is ever emitted.
    pub fn to_override(&self) -> StageOverride {
        match self.prompt_state {
            PromptState::Disabled => StageOverride::Disabled,
            PromptState::Enabled => StageOverride::Enabled(OverrideFields {
                base_prompt_template: self.base_prompt_template.clone(),
                stop_sequences: self.stop_sequences.clone(),
                maximum_length: self.maximum_length,
                temperature: self.temperature,
                top_p: self.top_p,
                top_k: self.top_k,
            }),
        }
    }
}

/// The caller's stage-override set, keyed by stage.
///
/// Supply order is irrelevant: emission always walks
/// [`PromptStage::ALL`]. Unknown stage keys are structurally invalid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageOverrides {
    #[serde(default)]
    pub pre_processing: Option<StageOverrideConfig>,
    #[serde(default)]
    pub orchestration: Option<StageOverrideConfig>,
    #[serde(default)]
    pub knowledge_base_response_generation: Option<StageOverrideConfig>,
    #[serde(default)]
    pub post_processing: Option<StageOverrideConfig>,
}

impl StageOverrides {
    /// Parse `s` as a TOML stage-override document.
    ///
    /// Returns `KeystoneError::Configuration` when the TOML is malformed,
    /// names an unknown stage, or omits a stage's `prompt_state`.
    pub fn from_toml_str(s: &str) -> KeystoneResult<Self> {
        toml::from_str(s).map_err(|e| KeystoneError::Configuration {
            reason: format!("failed to parse prompt-override TOML: {}", e),
        })
    }

    /// Read the file at `path` and parse it as stage-override TOML.
    pub fn from_file(path: &Path) -> KeystoneResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| KeystoneError::Configuration {
            reason: format!("failed to read override file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The configuration supplied for `stage`, if any.
    pub fn get(&self, stage: PromptStage) -> Option<&StageOverrideConfig> {
        match stage {
            PromptStage::PreProcessing => self.pre_processing.as_ref(),
            PromptStage::Orchestration => self.orchestration.as_ref(),
            PromptStage::KnowledgeBaseResponseGeneration => {
                self.knowledge_base_response_generation.as_ref()
            }
            PromptStage::PostProcessing => self.post_processing.as_ref(),
        }
    }
}
