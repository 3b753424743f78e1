//! Topology store: items, nodes and wires.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use super::types::{ItemId, NodeId, Point, Pose, Side, WireId};
use crate::components::Component;
use crate::error::{LabError, Result};

/// A placed component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Component type and its electrical parameters
    #[serde(flatten)]
    pub component: Component,
    /// Placement on the canvas
    #[serde(flatten)]
    pub pose: Pose,
    /// Terminal handles, `[negative, positive]`
    pub terminals: [NodeId; 2],
}

impl Item {
    /// Terminal node on the given side.
    pub fn terminal(&self, side: Side) -> NodeId {
        self.terminals[side.index()]
    }
}

/// What a node is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeKind {
    /// A component terminal; its position follows the item's pose
    Terminal { item: ItemId, side: Side },
    /// A junction drawn in empty space
    Free { x: f64, y: f64 },
}

/// A connection point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl Node {
    pub fn is_free(&self) -> bool {
        matches!(self.kind, NodeKind::Free { .. })
    }
}

/// An undirected connection between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wire {
    pub id: WireId,
    pub a: NodeId,
    pub b: NodeId,
}

impl Wire {
    /// Whether this wire joins `x` and `y` in either direction.
    pub fn joins(&self, x: NodeId, y: NodeId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }

    /// Whether either end is `node`.
    pub fn touches(&self, node: NodeId) -> bool {
        self.a == node || self.b == node
    }
}

/// Serialized form of a topology: plain lists, as handed over by a host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub wires: Vec<Wire>,
}

/// The circuit on the bench.
///
/// Owns every item, node and wire. All collections are keyed by id, so
/// iteration order is id order and solving is deterministic. The solver
/// only ever borrows a `Topology` immutably.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Snapshot", into = "Snapshot")]
pub struct Topology {
    items: BTreeMap<ItemId, Item>,
    nodes: BTreeMap<NodeId, Node>,
    wires: BTreeMap<WireId, Wire>,
    next_item: u32,
    next_node: u32,
    next_wire: u32,
}

/// First free id after `ids`, or an error when the largest is `u32::MAX`.
fn next_after(kind: &'static str, ids: impl Iterator<Item = u32>) -> Result<u32> {
    match ids.max() {
        Some(id) => id.checked_add(1).ok_or(LabError::IdOverflow { kind, id }),
        None => Ok(1),
    }
}

/// Hand out `counter` and advance it. Stops at `u32::MAX`, which a loaded
/// snapshot can never already hold.
fn bump(counter: &mut u32) -> u32 {
    let id = *counter;
    *counter = counter.saturating_add(1);
    id
}

impl TryFrom<Snapshot> for Topology {
    type Error = LabError;

    fn try_from(snapshot: Snapshot) -> Result<Self> {
        let next_item = next_after("item", snapshot.items.iter().map(|i| i.id.0))?;
        let next_node = next_after("node", snapshot.nodes.iter().map(|n| n.id.0))?;
        let next_wire = next_after("wire", snapshot.wires.iter().map(|w| w.id.0))?;
        Ok(Self {
            items: snapshot.items.into_iter().map(|i| (i.id, i)).collect(),
            nodes: snapshot.nodes.into_iter().map(|n| (n.id, n)).collect(),
            wires: snapshot.wires.into_iter().map(|w| (w.id, w)).collect(),
            next_item,
            next_node,
            next_wire,
        })
    }
}

impl From<Topology> for Snapshot {
    fn from(topology: Topology) -> Self {
        Self {
            items: topology.items.into_values().collect(),
            nodes: topology.nodes.into_values().collect(),
            wires: topology.wires.into_values().collect(),
        }
    }
}

impl Topology {
    /// Create an empty topology.
    pub fn new() -> Self {
        Self {
            next_item: 1,
            next_node: 1,
            next_wire: 1,
            ..Self::default()
        }
    }

    /// Parse a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to a JSON snapshot.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    // ============ Lookup ============

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.get_mut(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn wire(&self, id: WireId) -> Option<&Wire> {
        self.wires.get(&id)
    }

    /// Items in id order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub(crate) fn items_mut(&mut self) -> impl Iterator<Item = &mut Item> {
        self.items.values_mut()
    }

    /// Nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Wires in id order.
    pub fn wires(&self) -> impl Iterator<Item = &Wire> {
        self.wires.values()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    /// Terminal node of an item, if both the item and the node exist.
    pub fn terminal(&self, item: ItemId, side: Side) -> Option<NodeId> {
        let node = self.items.get(&item)?.terminal(side);
        self.nodes.contains_key(&node).then_some(node)
    }

    /// World position of a node.
    pub fn node_position(&self, id: NodeId) -> Option<Point> {
        match self.nodes.get(&id)?.kind {
            NodeKind::Terminal { item, side } => {
                Some(self.items.get(&item)?.pose.terminal_position(side))
            }
            NodeKind::Free { x, y } => Some(Point::new(x, y)),
        }
    }

    // ============ Items ============

    /// Place a component. Its two terminals are created with it.
    pub fn add_item(&mut self, component: Component, pose: Pose) -> ItemId {
        let id = ItemId(bump(&mut self.next_item));

        let terminals = Side::BOTH.map(|side| {
            self.insert_node(NodeKind::Terminal { item: id, side })
        });

        debug!("placed {} {} with terminals {:?}", component.kind().name(), id, terminals);
        self.items.insert(
            id,
            Item {
                id,
                component,
                pose,
                terminals,
            },
        );
        id
    }

    /// Delete an item with its terminals and every wire touching them.
    pub fn remove_item(&mut self, id: ItemId) -> Result<Item> {
        let item = self
            .items
            .remove(&id)
            .ok_or(LabError::ItemNotFound { item: id })?;

        for node in item.terminals {
            self.nodes.remove(&node);
            self.wires.retain(|_, w| !w.touches(node));
        }

        debug!("removed item {}", id);
        Ok(item)
    }

    /// Copy an item next to the original. The copy starts unwired.
    pub fn duplicate_item(&mut self, id: ItemId) -> Result<ItemId> {
        let original = self.items.get(&id).ok_or(LabError::ItemNotFound { item: id })?;
        let component = original.component.clone();
        let mut pose = original.pose;
        pose.x += 60.0;
        pose.y += 60.0;
        Ok(self.add_item(component, pose))
    }

    /// Move, rotate or resize an item.
    pub fn set_pose(&mut self, id: ItemId, pose: Pose) -> Result<()> {
        let item = self.items.get_mut(&id).ok_or(LabError::ItemNotFound { item: id })?;
        item.pose = pose;
        Ok(())
    }

    /// Replace an item's component, keeping its identity, pose and wiring.
    pub fn set_component(&mut self, id: ItemId, component: Component) -> Result<()> {
        let item = self.items.get_mut(&id).ok_or(LabError::ItemNotFound { item: id })?;
        item.component = component;
        Ok(())
    }

    /// Open or close a switch.
    pub fn set_switch(&mut self, id: ItemId, closed: bool) -> Result<()> {
        let item = self.items.get_mut(&id).ok_or(LabError::ItemNotFound { item: id })?;
        match &mut item.component {
            Component::Switch(s) => {
                s.set_state(closed);
                Ok(())
            }
            other => Err(LabError::wrong_component(id, "switch", other.kind().name())),
        }
    }

    /// Flip a switch. Returns the new state (true = closed).
    pub fn toggle_switch(&mut self, id: ItemId) -> Result<bool> {
        let item = self.items.get_mut(&id).ok_or(LabError::ItemNotFound { item: id })?;
        match &mut item.component {
            Component::Switch(s) => {
                s.toggle();
                Ok(s.closed)
            }
            other => Err(LabError::wrong_component(id, "switch", other.kind().name())),
        }
    }

    // ============ Nodes and wires ============

    /// Create a junction in empty space.
    pub fn add_free_node(&mut self, at: Point) -> NodeId {
        self.insert_node(NodeKind::Free { x: at.x, y: at.y })
    }

    /// Connect two nodes.
    ///
    /// Wiring a node to itself is rejected. Wiring a pair that is already
    /// connected returns the existing wire.
    pub fn add_wire(&mut self, a: NodeId, b: NodeId) -> Result<WireId> {
        if a == b {
            return Err(LabError::SelfLoop { node: a });
        }
        for node in [a, b] {
            if !self.nodes.contains_key(&node) {
                return Err(LabError::NodeNotFound { node });
            }
        }
        if let Some(existing) = self.wires.values().find(|w| w.joins(a, b)) {
            return Ok(existing.id);
        }

        let id = WireId(bump(&mut self.next_wire));
        self.wires.insert(id, Wire { id, a, b });
        Ok(id)
    }

    /// Wire two item terminals together.
    pub fn connect(
        &mut self,
        (a, a_side): (ItemId, Side),
        (b, b_side): (ItemId, Side),
    ) -> Result<WireId> {
        let na = self.terminal(a, a_side).ok_or(LabError::ItemNotFound { item: a })?;
        let nb = self.terminal(b, b_side).ok_or(LabError::ItemNotFound { item: b })?;
        self.add_wire(na, nb)
    }

    /// Delete a single wire.
    pub fn remove_wire(&mut self, id: WireId) -> Result<Wire> {
        self.wires.remove(&id).ok_or(LabError::WireNotFound { wire: id })
    }

    /// Remove every wire and every free node.
    pub fn clear_wires(&mut self) {
        self.wires.clear();
        self.nodes.retain(|_, n| !n.is_free());
    }

    fn insert_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(bump(&mut self.next_node));
        self.nodes.insert(id, Node { id, kind });
        id
    }
}
