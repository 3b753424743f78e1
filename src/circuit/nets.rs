//! Connectivity: which electrical net each node sits on.

use std::collections::{HashMap, HashSet};

use log::trace;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Dfs;

use super::graph::Topology;
use super::types::{ItemId, NetId, NodeId, Side};

/// Partition of nodes into nets for one solve.
#[derive(Debug, Clone, Default)]
pub struct Nets {
    net_of: HashMap<NodeId, NetId>,
    /// Nodes with at least one wire
    wired: HashSet<NodeId>,
    count: usize,
}

impl Nets {
    /// Number of nets found (ids run 1..=count).
    pub fn count(&self) -> usize {
        self.count
    }

    /// Net a node belongs to.
    pub fn net_of(&self, node: NodeId) -> Option<NetId> {
        self.net_of.get(&node).copied()
    }

    /// Whether any wire touches this node.
    pub fn is_wired(&self, node: NodeId) -> bool {
        self.wired.contains(&node)
    }

    /// Net of a connected terminal.
    ///
    /// A terminal is connected when its node exists and is wired to
    /// something. Unconnected terminals have no net as far as stamping and
    /// measurement are concerned.
    pub fn terminal_net(&self, topology: &Topology, item: ItemId, side: Side) -> Option<NetId> {
        let node = topology.terminal(item, side)?;
        if !self.is_wired(node) {
            return None;
        }
        self.net_of(node)
    }

    /// Nets of both terminals `[negative, positive]`, if both are connected.
    pub fn terminal_nets(&self, topology: &Topology, item: ItemId) -> Option<[NetId; 2]> {
        Some([
            self.terminal_net(topology, item, Side::Negative)?,
            self.terminal_net(topology, item, Side::Positive)?,
        ])
    }
}

/// Compute the connected components of the node/wire graph.
///
/// Every node gets a net; nodes without wires are singleton nets. Wires
/// with a missing endpoint contribute nothing. Net ids follow node id
/// order, but callers must treat them as opaque keys for this call only.
pub fn compute_nets(topology: &Topology) -> Nets {
    let mut graph: UnGraph<NodeId, ()> =
        UnGraph::with_capacity(topology.node_count(), topology.wire_count());
    let mut index: HashMap<NodeId, NodeIndex> = HashMap::with_capacity(topology.node_count());

    for node in topology.nodes() {
        index.insert(node.id, graph.add_node(node.id));
    }

    let mut wired = HashSet::new();
    for wire in topology.wires() {
        let (Some(&a), Some(&b)) = (index.get(&wire.a), index.get(&wire.b)) else {
            trace!("wire {} has a missing endpoint, ignored", wire.id);
            continue;
        };
        if a == b {
            continue;
        }
        graph.add_edge(a, b, ());
        wired.insert(wire.a);
        wired.insert(wire.b);
    }

    let mut net_of = HashMap::with_capacity(graph.node_count());
    let mut count = 0usize;
    for start in graph.node_indices() {
        if net_of.contains_key(&graph[start]) {
            continue;
        }
        count += 1;
        let net = NetId(count);
        let mut dfs = Dfs::new(&graph, start);
        while let Some(ix) = dfs.next(&graph) {
            net_of.insert(graph[ix], net);
        }
    }

    trace!("{} nodes in {} nets", graph.node_count(), count);
    Nets {
        net_of,
        wired,
        count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{Point, Pose, Snapshot, Wire, WireId};
    use crate::components::Component;

    #[test]
    fn test_chain_forms_one_net() {
        let mut topo = Topology::new();
        let a = topo.add_free_node(Point::new(0.0, 0.0));
        let b = topo.add_free_node(Point::new(1.0, 0.0));
        let c = topo.add_free_node(Point::new(2.0, 0.0));
        let lone = topo.add_free_node(Point::new(3.0, 0.0));
        topo.add_wire(a, b).unwrap();
        topo.add_wire(c, b).unwrap();

        let nets = compute_nets(&topo);
        assert_eq!(nets.count(), 2);
        assert_eq!(nets.net_of(a), nets.net_of(c));
        assert_ne!(nets.net_of(a), nets.net_of(lone));
        assert_eq!(nets.net_of(b), nets.net_of(c));
        assert!(!nets.is_wired(lone));
    }

    #[test]
    fn test_component_terminals_not_merged() {
        let mut topo = Topology::new();
        let r = topo.add_item(Component::resistor(10.0), Pose::default());

        let nets = compute_nets(&topo);
        assert_eq!(nets.count(), 2);
        let neg = topo.terminal(r, Side::Negative).unwrap();
        let pos = topo.terminal(r, Side::Positive).unwrap();
        assert_ne!(nets.net_of(neg), nets.net_of(pos));
        // Unwired terminals are not connected
        assert_eq!(nets.terminal_nets(&topo, r), None);
    }

    #[test]
    fn test_terminal_nets_when_wired() {
        let mut topo = Topology::new();
        let r1 = topo.add_item(Component::resistor(10.0), Pose::default());
        let r2 = topo.add_item(Component::resistor(10.0), Pose::default());
        topo.connect((r1, Side::Positive), (r2, Side::Negative)).unwrap();
        topo.connect((r2, Side::Positive), (r1, Side::Negative)).unwrap();

        let nets = compute_nets(&topo);
        let [n1, p1] = nets.terminal_nets(&topo, r1).unwrap();
        let [n2, p2] = nets.terminal_nets(&topo, r2).unwrap();
        assert_eq!(p1, n2);
        assert_eq!(p2, n1);
        assert_ne!(n1, p1);
    }

    #[test]
    fn test_dangling_wire_ignored() {
        let mut snapshot = Snapshot::default();
        snapshot.wires.push(Wire {
            id: WireId(1),
            a: NodeId(1),
            b: NodeId(2),
        });
        let mut topo = Topology::try_from(snapshot).unwrap();
        let n = topo.add_free_node(Point::default());

        let nets = compute_nets(&topo);
        assert_eq!(nets.count(), 1);
        assert!(!nets.is_wired(n));
    }

    #[test]
    fn test_nets_deterministic() {
        let mut topo = Topology::new();
        for i in 0..6 {
            topo.add_free_node(Point::new(i as f64, 0.0));
        }
        topo.add_wire(NodeId(5), NodeId(2)).unwrap();
        topo.add_wire(NodeId(3), NodeId(6)).unwrap();

        let first = compute_nets(&topo);
        let second = compute_nets(&topo);
        for node in topo.nodes() {
            assert_eq!(first.net_of(node.id), second.net_of(node.id));
        }
        assert_eq!(first.net_of(NodeId(1)), Some(NetId(1)));
    }
}
