//! Topology diagnostics.
//!
//! Nothing here is fatal: a malformed edit is excluded from solving rather
//! than failing it. Diagnostics exist so hosts can tell the user why a meter
//! shows no reading.

use std::collections::HashSet;
use std::fmt;

use super::graph::Topology;
use super::types::{ItemId, NodeId, Side, WireId};
use crate::components::Component;

/// A problem found in a topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A wire names a node that does not exist
    DanglingWire { wire: WireId, node: NodeId },
    /// An item names a terminal node that does not exist
    MissingTerminal { item: ItemId, side: Side },
    /// An item's terminal has no wire attached
    UnwiredTerminal { item: ItemId, side: Side },
    /// Nothing drives the circuit
    NoBattery,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DanglingWire { wire, node } => {
                write!(f, "wire {} references missing node {}", wire, node)
            }
            Diagnostic::MissingTerminal { item, side } => {
                write!(f, "item {} has no {} terminal node", item, side)
            }
            Diagnostic::UnwiredTerminal { item, side } => {
                write!(f, "item {} has nothing wired to its {} terminal", item, side)
            }
            Diagnostic::NoBattery => write!(f, "circuit has no battery"),
        }
    }
}

/// Check a topology for problems that silently exclude parts of it.
pub fn validate_topology(topology: &Topology) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut wired: HashSet<NodeId> = HashSet::new();

    for wire in topology.wires() {
        for node in [wire.a, wire.b] {
            if topology.node(node).is_none() {
                diagnostics.push(Diagnostic::DanglingWire { wire: wire.id, node });
            }
        }
        if topology.node(wire.a).is_some() && topology.node(wire.b).is_some() && wire.a != wire.b {
            wired.insert(wire.a);
            wired.insert(wire.b);
        }
    }

    for item in topology.items() {
        for side in Side::BOTH {
            match topology.terminal(item.id, side) {
                None => diagnostics.push(Diagnostic::MissingTerminal { item: item.id, side }),
                Some(node) if !wired.contains(&node) => {
                    diagnostics.push(Diagnostic::UnwiredTerminal { item: item.id, side })
                }
                Some(_) => {}
            }
        }
    }

    if !topology
        .items()
        .any(|i| matches!(i.component, Component::Battery(_)))
    {
        diagnostics.push(Diagnostic::NoBattery);
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{Pose, Snapshot, Wire};

    #[test]
    fn test_reports_unwired_and_no_battery() {
        let mut topo = Topology::new();
        let r = topo.add_item(Component::resistor(1.0), Pose::default());
        let diags = validate_topology(&topo);
        assert!(diags.contains(&Diagnostic::UnwiredTerminal {
            item: r,
            side: Side::Negative
        }));
        assert!(diags.contains(&Diagnostic::NoBattery));
    }

    #[test]
    fn test_reports_dangling_wire() {
        let snapshot = Snapshot {
            wires: vec![Wire {
                id: WireId(3),
                a: NodeId(1),
                b: NodeId(2),
            }],
            ..Snapshot::default()
        };
        let topo = Topology::try_from(snapshot).unwrap();
        let diags = validate_topology(&topo);
        assert_eq!(
            diags[0],
            Diagnostic::DanglingWire {
                wire: WireId(3),
                node: NodeId(1)
            }
        );
        assert_eq!(diags[0].to_string(), "wire W3 references missing node N1");
    }

    #[test]
    fn test_clean_circuit_has_no_diagnostics() {
        let mut topo = Topology::new();
        let b = topo.add_item(Component::battery(9.0, 0.0), Pose::default());
        let r = topo.add_item(Component::resistor(100.0), Pose::default());
        topo.connect((b, Side::Positive), (r, Side::Positive)).unwrap();
        topo.connect((r, Side::Negative), (b, Side::Negative)).unwrap();
        assert!(validate_topology(&topo).is_empty());
    }
}
