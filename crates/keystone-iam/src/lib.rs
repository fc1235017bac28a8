//! # keystone-iam
//!
//! The access-role composer: the leaf every other composer builds on.
//!
//! ## Contract
//!
//! Given a logical name, a trusted service principal, a description, and an
//! optional set of managed-policy references, produce one access role. If
//! the caller additionally supplies inline statements, they are merged as a
//! single custom managed policy attached alongside the caller's references —
//! never replacing them.
//!
//! Composition fails fast: a malformed principal is rejected with
//! `Configuration` before any node is inserted.

pub mod role;

pub use role::{allow, compose_role, RoleConfig};

// ── Tests ─────────────────────────────────────────────────────────────────────
