//! # keystone-core
//!
//! The resource graph the composers write into, plus the two small
//! determinism seams: an injectable clock and a content fingerprint.
//!
//! This crate provides:
//! - [`ResourceGraph`] with typed handles and validated dependency edges
//! - The [`Clock`](clock::Clock) trait (`SystemClock`, `FixedClock`)
//! - [`fingerprint`](fingerprint::fingerprint) — SHA-256 over the canonical
//!   graph JSON
//!
//! ## Usage
//!
//! ```rust,ignore
//! use keystone_core::{ResourceGraph, clock::SystemClock, fingerprint::fingerprint};
//! ```

pub mod clock;
pub mod fingerprint;
pub mod graph;

pub use graph::ResourceGraph;
