//! Stamp collection: turning a topology into a linear network.

use log::{debug, trace};
use petgraph::unionfind::UnionFind;

use super::SolverConfig;
use crate::circuit::{compute_nets, ItemId, NetId, Nets, Topology};
use crate::components::Component;

/// Identifies a voltage source row in the MNA system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceId {
    /// A battery on the bench
    Item(ItemId),
    /// The ohmmeter test source
    Probe,
}

/// A resistance between two nets, already floored.
#[derive(Debug, Clone, PartialEq)]
pub struct ResistorStamp {
    /// Item the stamp came from
    pub owner: ItemId,
    pub a: NetId,
    pub b: NetId,
    pub resistance: f64,
}

/// An ideal voltage source enforcing `V(a) - V(b) = voltage`.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceStamp {
    pub id: SourceId,
    pub a: NetId,
    pub b: NetId,
    pub voltage: f64,
}

/// Whether batteries drive the network or are replaced by their resistance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceMode {
    #[default]
    Enabled,
    /// Ideal sources become shorts, real ones their internal resistance
    Disabled,
}

/// Linear network ready for MNA: nets, a ground and the stamps on them.
#[derive(Debug, Clone)]
pub struct Network {
    nets: Nets,
    /// Highest net id in use, including internal nets
    net_count: usize,
    ground: NetId,
    mode: SourceMode,
    config: SolverConfig,
    resistors: Vec<ResistorStamp>,
    sources: Vec<SourceStamp>,
}

impl Network {
    /// Create an empty network over the given nets.
    pub fn new(nets: Nets, ground: NetId, mode: SourceMode, config: &SolverConfig) -> Self {
        let net_count = nets.count();
        Self {
            nets,
            net_count,
            ground,
            mode,
            config: config.clone(),
            resistors: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Node partition the network was built from.
    pub fn nets(&self) -> &Nets {
        &self.nets
    }

    /// Number of nets, including internal ones allocated by elements.
    pub fn net_count(&self) -> usize {
        self.net_count
    }

    /// Reference net, fixed at 0 V.
    pub fn ground(&self) -> NetId {
        self.ground
    }

    /// Move the reference net, e.g. once the stamps are known.
    pub fn set_ground(&mut self, net: NetId) {
        self.ground = net;
    }

    pub fn mode(&self) -> SourceMode {
        self.mode
    }

    pub fn sources_enabled(&self) -> bool {
        self.mode == SourceMode::Enabled
    }

    pub fn resistors(&self) -> &[ResistorStamp] {
        &self.resistors
    }

    pub fn sources(&self) -> &[SourceStamp] {
        &self.sources
    }

    /// Allocate a net that no topology node belongs to.
    pub fn alloc_net(&mut self) -> NetId {
        self.net_count += 1;
        NetId(self.net_count)
    }

    /// Stamp a resistance between two nets. The value is floored.
    pub fn add_resistor(&mut self, owner: ItemId, a: NetId, b: NetId, resistance: f64) {
        let resistance = self.config.floor_resistance(resistance);
        self.resistors.push(ResistorStamp {
            owner,
            a,
            b,
            resistance,
        });
    }

    /// Stamp an ideal voltage source.
    pub fn add_source(&mut self, id: SourceId, a: NetId, b: NetId, voltage: f64) {
        self.sources.push(SourceStamp { id, a, b, voltage });
    }

    /// Whether any stamp touches `net`.
    pub fn touches(&self, net: NetId) -> bool {
        self.resistors.iter().any(|r| r.a == net || r.b == net)
            || self.sources.iter().any(|s| s.a == net || s.b == net)
    }

    /// Lowest net any stamp touches.
    pub fn first_stamped_net(&self) -> Option<NetId> {
        let resistors = self.resistors.iter().flat_map(|r| [r.a, r.b]);
        let sources = self.sources.iter().flat_map(|s| [s.a, s.b]);
        resistors.chain(sources).min()
    }

    /// Drop every stamp not electrically connected to `net`.
    ///
    /// Used by the ohmmeter so parts of the bench unrelated to its probes
    /// cannot make the measurement singular.
    pub fn retain_island(&mut self, net: NetId) {
        if net.0 > self.net_count {
            self.resistors.clear();
            self.sources.clear();
            return;
        }
        let mut islands: UnionFind<usize> = UnionFind::new(self.net_count + 1);
        for r in &self.resistors {
            islands.union(r.a.0, r.b.0);
        }
        for s in &self.sources {
            islands.union(s.a.0, s.b.0);
        }

        let root = islands.find(net.0);
        let before = self.resistors.len() + self.sources.len();
        self.resistors.retain(|r| islands.find(r.a.0) == root);
        self.sources.retain(|s| islands.find(s.a.0) == root);
        trace!(
            "island of {}: kept {} of {} stamps",
            net,
            self.resistors.len() + self.sources.len(),
            before
        );
    }
}

/// Pick the reference net.
///
/// The negative net of the first battery (in item id order) with both
/// terminals connected. A battery wired on one side only is never stamped,
/// so its net cannot anchor the solve.
pub fn choose_ground(topology: &Topology, nets: &Nets) -> Option<NetId> {
    topology
        .items()
        .filter(|item| matches!(item.component, Component::Battery(_)))
        .find_map(|item| nets.terminal_nets(topology, item.id))
        .map(|[negative, _]| negative)
}

/// Builds a [`Network`] from a topology.
///
/// ```ignore
/// let network = NetworkBuilder::new(&topology, &config)
///     .disable_sources()
///     .build();
/// ```
pub struct NetworkBuilder<'a> {
    topology: &'a Topology,
    config: &'a SolverConfig,
    mode: SourceMode,
    ground: Option<NetId>,
}

impl<'a> NetworkBuilder<'a> {
    pub fn new(topology: &'a Topology, config: &'a SolverConfig) -> Self {
        Self {
            topology,
            config,
            mode: SourceMode::Enabled,
            ground: None,
        }
    }

    /// Replace every battery by its passive equivalent.
    pub fn disable_sources(mut self) -> Self {
        self.mode = SourceMode::Disabled;
        self
    }

    /// Use `net` as ground instead of the usual choice.
    pub fn with_ground(mut self, net: NetId) -> Self {
        self.ground = Some(net);
        self
    }

    /// Compute nets and stamp every connected item.
    pub fn build(self) -> Network {
        let nets = compute_nets(self.topology);
        self.build_with(nets)
    }

    /// Stamp every connected item over nets computed by the caller.
    pub fn build_with(self, nets: Nets) -> Network {
        let ground = self.ground.or_else(|| choose_ground(self.topology, &nets));
        let mut network = Network::new(nets, ground.unwrap_or(NetId(1)), self.mode, self.config);

        for item in self.topology.items() {
            let Some(terminals) = network.nets().terminal_nets(self.topology, item.id) else {
                trace!("{} ({}) not connected, skipped", item.id, item.component.kind().name());
                continue;
            };
            item.component
                .element()
                .stamp(item.id, terminals, &mut network, self.config);
        }

        if ground.is_none() {
            if let Some(net) = network.first_stamped_net() {
                network.set_ground(net);
            }
        }

        debug!(
            "network: {} nets, {} resistors, {} sources, ground {} ({:?})",
            network.net_count(),
            network.resistors().len(),
            network.sources().len(),
            network.ground(),
            network.mode()
        );
        network
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{Point, Pose, Side};

    fn series_loop() -> (Topology, ItemId, ItemId) {
        let mut topo = Topology::new();
        let b = topo.add_item(Component::battery(9.0, 0.0), Pose::default());
        let r = topo.add_item(Component::resistor(100.0), Pose::default());
        topo.connect((b, Side::Positive), (r, Side::Positive)).unwrap();
        topo.connect((r, Side::Negative), (b, Side::Negative)).unwrap();
        (topo, b, r)
    }

    #[test]
    fn test_ground_is_battery_negative() {
        let (topo, b, _) = series_loop();
        let nets = compute_nets(&topo);
        let neg = nets.terminal_net(&topo, b, Side::Negative).unwrap();
        assert_eq!(choose_ground(&topo, &nets), Some(neg));
    }

    #[test]
    fn test_ground_fallback_without_battery() {
        let mut topo = Topology::new();
        topo.add_item(Component::resistor(1.0), Pose::default());
        let nets = compute_nets(&topo);
        assert_eq!(choose_ground(&topo, &nets), None);

        let config = SolverConfig::default();
        let network = NetworkBuilder::new(&topo, &config).build_with(nets);
        assert_eq!(network.ground(), NetId(1));
    }

    #[test]
    fn test_half_wired_battery_skipped_for_ground() {
        let mut topo = Topology::new();
        let stray = topo.add_item(Component::battery(1.5, 0.0), Pose::default());
        let free = topo.add_free_node(Point::new(0.0, 0.0));
        let stray_neg = topo.terminal(stray, Side::Negative).unwrap();
        topo.add_wire(stray_neg, free).unwrap();

        let b = topo.add_item(Component::battery(9.0, 0.0), Pose::default());
        let r = topo.add_item(Component::resistor(100.0), Pose::default());
        topo.connect((b, Side::Positive), (r, Side::Positive)).unwrap();
        topo.connect((r, Side::Negative), (b, Side::Negative)).unwrap();

        let nets = compute_nets(&topo);
        let neg = nets.terminal_net(&topo, b, Side::Negative).unwrap();
        assert_eq!(choose_ground(&topo, &nets), Some(neg));

        let config = SolverConfig::default();
        let network = NetworkBuilder::new(&topo, &config).build_with(nets);
        assert_eq!(network.ground(), neg);
        assert!(network.touches(network.ground()));
    }

    #[test]
    fn test_ground_on_stamped_net_without_battery() {
        let mut topo = Topology::new();
        let a = topo.add_item(Component::resistor(1.0), Pose::default());
        let free = topo.add_free_node(Point::new(0.0, 0.0));
        let a_neg = topo.terminal(a, Side::Negative).unwrap();
        topo.add_wire(a_neg, free).unwrap();
        let r1 = topo.add_item(Component::resistor(10.0), Pose::default());
        let r2 = topo.add_item(Component::resistor(20.0), Pose::default());
        topo.connect((r1, Side::Positive), (r2, Side::Positive)).unwrap();
        topo.connect((r1, Side::Negative), (r2, Side::Negative)).unwrap();

        let config = SolverConfig::default();
        let network = NetworkBuilder::new(&topo, &config).build();
        assert!(network.touches(network.ground()));
    }

    #[test]
    fn test_ideal_battery_stamps_source() {
        let (topo, b, r) = series_loop();
        let config = SolverConfig::default();
        let network = NetworkBuilder::new(&topo, &config).build();
        assert_eq!(network.sources().len(), 1);
        assert_eq!(network.sources()[0].id, SourceId::Item(b));
        assert_eq!(network.resistors().len(), 1);
        assert_eq!(network.resistors()[0].owner, r);
    }

    #[test]
    fn test_real_battery_uses_internal_net() {
        let mut topo = Topology::new();
        let b = topo.add_item(Component::battery(9.0, 0.5), Pose::default());
        let r = topo.add_item(Component::resistor(100.0), Pose::default());
        topo.connect((b, Side::Positive), (r, Side::Positive)).unwrap();
        topo.connect((r, Side::Negative), (b, Side::Negative)).unwrap();

        let config = SolverConfig::default();
        let network = NetworkBuilder::new(&topo, &config).build();
        let nets = network.nets().count();
        assert_eq!(network.net_count(), nets + 1);
        assert_eq!(network.sources()[0].a, NetId(nets + 1));
        assert_eq!(network.resistors().len(), 2);
    }

    #[test]
    fn test_disabled_sources_become_resistors() {
        let (topo, b, _) = series_loop();
        let config = SolverConfig::default();
        let network = NetworkBuilder::new(&topo, &config)
            .disable_sources()
            .build();
        assert!(network.sources().is_empty());
        let short = network.resistors().iter().find(|s| s.owner == b).unwrap();
        assert_eq!(short.resistance, config.short_resistance);
    }

    #[test]
    fn test_unconnected_item_not_stamped() {
        let (mut topo, _, _) = series_loop();
        topo.add_item(Component::resistor(5.0), Pose::default());
        let config = SolverConfig::default();
        let network = NetworkBuilder::new(&topo, &config).build();
        assert_eq!(network.resistors().len(), 1);
    }

    #[test]
    fn test_resistance_floored() {
        let config = SolverConfig::default();
        let mut network = Network::new(Nets::default(), NetId(1), SourceMode::Enabled, &config);
        network.add_resistor(ItemId(1), NetId(1), NetId(2), 0.0);
        network.add_resistor(ItemId(1), NetId(1), NetId(2), f64::NAN);
        assert_eq!(network.resistors()[0].resistance, config.min_resistance);
        assert_eq!(network.resistors()[1].resistance, config.min_resistance);
    }

    #[test]
    fn test_retain_island() {
        let config = SolverConfig::default();
        let mut network = Network::new(Nets::default(), NetId(1), SourceMode::Disabled, &config);
        network.net_count = 4;
        network.add_resistor(ItemId(1), NetId(1), NetId(2), 10.0);
        network.add_resistor(ItemId(2), NetId(3), NetId(4), 10.0);
        network.retain_island(NetId(2));
        assert_eq!(network.resistors().len(), 1);
        assert!(network.touches(NetId(1)));
        assert!(!network.touches(NetId(3)));
    }
}
