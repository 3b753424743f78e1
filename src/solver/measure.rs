//! Instrument readings derived from a solved network.
//!
//! Voltmeters and ammeters read from the normal solve. The ohmmeter runs
//! its own passive solve with a unit test source across its probes.

use log::debug;

use super::builder::{NetworkBuilder, SourceId};
use super::mna::{solve, SolvedNetwork};
use super::SolverConfig;
use crate::circuit::{compute_nets, ItemId, Topology};
use crate::components::Component;

/// Test voltage the ohmmeter applies across its probes.
pub const PROBE_VOLTAGE: f64 = 1.0;

/// Voltage of an item's positive terminal minus its negative terminal.
///
/// `None` when either terminal is unconnected or sits on a net the solve
/// did not cover.
pub fn voltage_across(topology: &Topology, solved: &SolvedNetwork, item: ItemId) -> Option<f64> {
    let [neg, pos] = solved.terminal_voltages(topology, item)?;
    Some(pos - neg)
}

/// Current through an item, positive from its `+` terminal to its `-`
/// terminal inside the item.
///
/// For a battery this is the current it delivers out of its `+` terminal.
/// Items that stamp nothing (voltmeter, ohmmeter) have no current.
pub fn current_through(
    topology: &Topology,
    solved: &SolvedNetwork,
    item: ItemId,
    config: &SolverConfig,
) -> Option<f64> {
    let component = &topology.item(item)?.component;
    if let Component::Battery(_) = component {
        solved.nets().terminal_nets(topology, item)?;
        return solved.source_current(SourceId::Item(item)).map(|i| -i);
    }
    let resistance = component.element().stamped_resistance(config)?;
    Some(voltage_across(topology, solved, item)? / resistance)
}

/// Thévenin resistance seen between an item's terminals with every battery
/// zeroed.
///
/// Returns `Some(0.0)` when both terminals are on the same net and `None`
/// when either is unconnected, when nothing passive joins them, or when
/// the test solve fails.
pub fn equivalent_resistance(
    topology: &Topology,
    item: ItemId,
    config: &SolverConfig,
) -> Option<f64> {
    let nets = compute_nets(topology);
    let [neg, pos] = nets.terminal_nets(topology, item)?;
    if neg == pos {
        return Some(0.0);
    }

    let mut network = NetworkBuilder::new(topology, config)
        .disable_sources()
        .with_ground(neg)
        .build_with(nets);
    network.retain_island(neg);
    if !network.touches(pos) {
        debug!("{}: probes not joined, open circuit", item);
        return None;
    }
    network.add_source(SourceId::Probe, pos, neg, PROBE_VOLTAGE);

    let solution = match solve(&network, config) {
        Ok(solution) => solution,
        Err(e) => {
            debug!("{}: test solve failed: {}", item, e);
            return None;
        }
    };
    let current = solution.current(SourceId::Probe)?;
    if !current.is_finite() || current.abs() < config.probe_current_epsilon {
        return None;
    }
    Some((PROBE_VOLTAGE / current).abs())
}

/// Brightness of a bulb in `[0, 1]`; dark when unsolved or unconnected.
pub fn bulb_brightness(
    topology: &Topology,
    solved: Option<&SolvedNetwork>,
    item: ItemId,
    config: &SolverConfig,
) -> f64 {
    let Some(Component::Bulb(bulb)) = topology.item(item).map(|i| &i.component) else {
        return 0.0;
    };
    solved
        .and_then(|s| voltage_across(topology, s, item))
        .map(|v| bulb.brightness_at(v, config))
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{Pose, Side};
    use crate::solver::solve_dc;

    fn loop_of(parts: &[Component]) -> (Topology, Vec<ItemId>) {
        let mut topo = Topology::new();
        let ids: Vec<ItemId> = parts
            .iter()
            .map(|c| topo.add_item(c.clone(), Pose::default()))
            .collect();
        for pair in ids.windows(2) {
            topo.connect((pair[0], Side::Positive), (pair[1], Side::Negative))
                .unwrap();
        }
        topo.connect((ids[ids.len() - 1], Side::Positive), (ids[0], Side::Negative))
            .unwrap();
        (topo, ids)
    }

    #[test]
    fn test_current_through_series_loop() {
        let (topo, ids) = loop_of(&[
            Component::battery(9.0, 0.0),
            Component::resistor(100.0),
            Component::ammeter(),
        ]);
        let config = SolverConfig::default();
        let solved = solve_dc(&topo, &config).unwrap();

        let battery = current_through(&topo, &solved, ids[0], &config).unwrap();
        let ammeter = current_through(&topo, &solved, ids[2], &config).unwrap();
        assert!((battery - 0.09).abs() < 1e-6);
        // Loop current enters each part at its negative terminal
        assert!((ammeter + 0.09).abs() < 1e-6);
    }

    #[test]
    fn test_voltmeter_has_no_current() {
        let (topo, ids) = loop_of(&[
            Component::battery(5.0, 0.0),
            Component::resistor(10.0),
            Component::voltmeter(),
        ]);
        let config = SolverConfig::default();
        let solved = solve_dc(&topo, &config).unwrap();
        assert_eq!(current_through(&topo, &solved, ids[2], &config), None);
    }

    #[test]
    fn test_ohmmeter_across_resistor() {
        let (topo, ids) = loop_of(&[Component::ohmmeter(), Component::resistor(470.0)]);
        let r = equivalent_resistance(&topo, ids[0], &SolverConfig::default()).unwrap();
        assert!((r - 470.0).abs() < 1e-6);
    }

    #[test]
    fn test_ohmmeter_open_circuit() {
        let mut topo = Topology::new();
        let ohm = topo.add_item(Component::ohmmeter(), Pose::default());
        let r = topo.add_item(Component::resistor(10.0), Pose::default());
        topo.connect((ohm, Side::Positive), (r, Side::Positive)).unwrap();
        let free = topo.add_free_node(Default::default());
        let neg = topo.terminal(ohm, Side::Negative).unwrap();
        topo.add_wire(neg, free).unwrap();
        assert_eq!(equivalent_resistance(&topo, ohm, &SolverConfig::default()), None);
    }

    #[test]
    fn test_dark_bulb_without_solution() {
        let (topo, ids) = loop_of(&[Component::bulb(30.0), Component::resistor(1.0)]);
        assert_eq!(bulb_brightness(&topo, None, ids[0], &SolverConfig::default()), 0.0);
    }
}
