//! Error types for the VoltLab circuit solver.
//!
//! This module provides a unified error type [`LabError`] that covers
//! topology editing, snapshot loading, and DC solving. Solver failures are
//! ordinary values: the live driver turns them into "no reading" instead of
//! propagating them to the host.

use thiserror::Error;

use crate::circuit::{ItemId, NodeId, WireId};

/// Result type alias using [`LabError`].
pub type Result<T> = std::result::Result<T, LabError>;

/// Unified error type for all VoltLab operations.
#[derive(Error, Debug)]
pub enum LabError {
    // ============ Topology Errors ============
    /// Item not found in the topology
    #[error("Item '{item}' not found in topology")]
    ItemNotFound { item: ItemId },

    /// Node not found in the topology
    #[error("Node '{node}' not found in topology")]
    NodeNotFound { node: NodeId },

    /// Wire not found in the topology
    #[error("Wire '{wire}' not found in topology")]
    WireNotFound { wire: WireId },

    /// A wire may not start and end on the same node
    #[error("Cannot wire node '{node}' to itself")]
    SelfLoop { node: NodeId },

    /// Operation needs a different component type
    #[error("Item '{item}' is a {actual}, expected a {expected}")]
    WrongComponent {
        item: ItemId,
        expected: &'static str,
        actual: &'static str,
    },

    // ============ Solver Errors ============
    /// Matrix is singular and cannot be solved
    #[error("Singular matrix at column {column} - circuit has a floating net or no reference")]
    SingularMatrix { column: usize },

    /// Nothing drives the network
    #[error("Circuit has no voltage source")]
    NoSources,

    /// A snapshot id leaves no room for the next one
    #[error("Snapshot {kind} id {id} is too large")]
    IdOverflow { kind: &'static str, id: u32 },

    // ============ I/O Errors ============
    /// Error reading a snapshot file
    #[error("Failed to read snapshot '{path}': {source}")]
    SnapshotRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing readings to the output
    #[error("Failed to write readings: {source}")]
    ReportWrite {
        #[source]
        source: std::io::Error,
    },

    /// Snapshot is not valid JSON for a topology
    #[error("Invalid topology snapshot: {source}")]
    SnapshotParse {
        #[from]
        source: serde_json::Error,
    },
}

impl LabError {
    /// Create a wrong component error
    pub fn wrong_component(item: ItemId, expected: &'static str, actual: &'static str) -> Self {
        Self::WrongComponent {
            item,
            expected,
            actual,
        }
    }

    /// Whether this error means "the circuit has no DC solution".
    ///
    /// Hosts show "no reading" for these instead of surfacing an error.
    pub fn is_unsolvable(&self) -> bool {
        matches!(self, Self::SingularMatrix { .. } | Self::NoSources)
    }

    /// Short machine-readable reason tag.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::SingularMatrix { .. } => "singular",
            Self::NoSources => "no_sources",
            Self::ItemNotFound { .. }
            | Self::NodeNotFound { .. }
            | Self::WireNotFound { .. }
            | Self::SelfLoop { .. }
            | Self::WrongComponent { .. } => "topology",
            Self::IdOverflow { .. } | Self::SnapshotRead { .. } | Self::SnapshotParse { .. } => {
                "snapshot"
            }
            Self::ReportWrite { .. } => "io",
        }
    }
}
