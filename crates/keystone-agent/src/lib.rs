//! # keystone-agent
//!
//! The agent composer: one call yields a conversational-agent resource, its
//! execution role, and the published alias that depends on it.
//!
//! ## Contract
//!
//! Given a name, instruction text, a foundation model, a capability-group
//! list, an "enable free-text input" flag, and zero-to-four stage overrides,
//! produce one agent and one alias. The caller's group list is never mutated
//! — the composer works on a copy. Stage overrides are emitted in the fixed
//! pipeline order regardless of supply order, and a disabled stage never
//! emits a payload.

pub mod composer;
pub mod overrides;

pub use composer::{compose_agent, AgentConfig, AgentOutput};
pub use overrides::{StageOverrideConfig, StageOverrides};

// ── Tests ─────────────────────────────────────────────────────────────────────
