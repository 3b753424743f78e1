//! Circuit topology and connectivity.
//!
//! This module holds what the user has placed on the bench. The
//! [`Topology`] struct owns items, their terminal nodes, free junction
//! nodes and wires; [`compute_nets`] groups nodes into electrical nets.

mod graph;
mod nets;
mod types;
mod validate;

pub use graph::{Item, Node, NodeKind, Snapshot, Topology, Wire};
pub use nets::{compute_nets, Nets};
pub use types::*;
pub use validate::{validate_topology, Diagnostic};
