//! # keystone-compute
//!
//! The compute composer: one call yields a function, its dedicated execution
//! role (via keystone-iam), and a companion log sink.
//!
//! ## Contract
//!
//! Given a name, a handler reference, and a stage, produce one compute
//! function bound to a fresh role. Optional managed policies and statements
//! flow into the role; timeout, reserved concurrency, and autoscaling are
//! resolved against explicit defaults. Reserved concurrency and autoscaling
//! are mutually exclusive — supplying both is a `Configuration` error.

pub mod autoscaling;
pub mod function;

pub use function::{compose_function, FunctionConfig, FunctionOutput};

// ── Tests ─────────────────────────────────────────────────────────────────────
