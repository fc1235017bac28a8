//! # keystone-ref-chatbot
//!
//! Reference stack wiring all four keystone composers into the chatbot
//! deployment graph:
//!
//! 1. **Action handler** — a compute function (plus role and log sink) the
//!    agent's capability group delegates to.
//! 2. **Chat-log bucket** — provider-managed encryption, retained on
//!    removal, read/write granted to the handler.
//! 3. **Agent and alias** — the conversational agent, its execution role,
//!    and the published "LATEST" alias.
//!
//! Composition is leaves-first and fully deterministic given a fixed clock.

pub mod stack;

pub use stack::{compose_chatbot_stack, ChatbotStack, ChatbotStackConfig};

// ── Tests ─────────────────────────────────────────────────────────────────────
