//! Error taxonomy for the keystone composition pipeline.
//!
//! All fallible composition operations return `KeystoneResult<T>`.
//! Every error is raised synchronously at composition time — composition
//! performs no I/O, so nothing is retried internally. Realization failures
//! belong to the external provisioning engine, not to this taxonomy.

use thiserror::Error;

/// The unified error type for the keystone composers.
#[derive(Debug, Error)]
pub enum KeystoneError {
    /// Malformed or contradictory input. Raised before any sub-resource is
    /// composed — a failed composer call never leaves a partial subgraph.
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    /// Two grants on the same resource contradict each other, e.g. an
    /// unconditioned ALLOW and an unconditioned DENY overlapping on the same
    /// action without explicit precedence.
    #[error("policy conflict: {reason}")]
    PolicyConflict { reason: String },

    /// A resource references another that was not yet composed.
    ///
    /// This indicates a caller bug — composition order is resolved statically
    /// from construction order, so the referenced handle should always exist.
    /// Not recoverable.
    #[error("dependency order violation: {reason}")]
    DependencyOrder { reason: String },
}

impl KeystoneError {
    /// Shorthand for a `Configuration` error from any displayable reason.
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration { reason: reason.into() }
    }

    /// Shorthand for a `DependencyOrder` error from any displayable reason.
    pub fn dependency_order(reason: impl Into<String>) -> Self {
        Self::DependencyOrder { reason: reason.into() }
    }
}

/// Convenience alias used throughout the keystone crates.
pub type KeystoneResult<T> = Result<T, KeystoneError>;
