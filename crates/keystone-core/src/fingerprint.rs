//! Graph fingerprinting.
//!
//! The fingerprint is a SHA-256 digest over the canonical JSON of the whole
//! graph. Node storage is ordered, so the same configuration always
//! serializes to the same bytes and therefore the same digest — the external
//! provisioning engine can compare fingerprints to detect a no-op
//! reconciliation without diffing resource by resource.

use sha2::{Digest, Sha256};

use crate::graph::ResourceGraph;

/// Compute the SHA-256 fingerprint of a composed graph.
///
/// Returns a lowercase 64-character hex string.
///
/// # Panics
///
/// Panics if the graph cannot be serialized to JSON — which cannot happen
/// for the well-formed `ResourceGraph` type.
pub fn fingerprint(graph: &ResourceGraph) -> String {
    // serde_json::to_vec produces canonical, deterministic JSON for a
    // BTreeMap-backed graph: no key reordering across calls on the same value.
    let graph_json =
        serde_json::to_vec(graph).expect("ResourceGraph must always be serializable to JSON");

    let mut hasher = Sha256::new();
    hasher.update(&graph_json);

    hex::encode(hasher.finalize())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
