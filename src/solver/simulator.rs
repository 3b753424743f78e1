//! Live update driver.

use log::{debug, trace};
use serde::Serialize;

use super::measure::{bulb_brightness, current_through, equivalent_resistance, voltage_across};
use super::mna::SolvedNetwork;
use super::{solve_dc, SolverConfig};
use crate::circuit::{ItemId, Topology};
use crate::components::{Component, Instrument};
use crate::display::{format_brightness, format_si};
use crate::error::Result;

/// Smallest brightness change a tick writes back to a bulb.
pub const BRIGHTNESS_STEP: f64 = 0.02;

/// The value one instrument or bulb shows after a tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub item: ItemId,
    pub instrument: Instrument,
    /// Raw value in SI units (brightness level for bulbs)
    pub value: Option<f64>,
    /// Text for the meter face
    pub display: String,
}

/// Everything measured in one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Readings {
    /// Whether the normal solve succeeded
    pub solved: bool,
    /// Why it did not
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    pub readings: Vec<Reading>,
}

impl Readings {
    /// Reading of one item.
    pub fn get(&self, item: ItemId) -> Option<&Reading> {
        self.readings.iter().find(|r| r.item == item)
    }

    /// Raw value of one item.
    pub fn value(&self, item: ItemId) -> Option<f64> {
        self.get(item).and_then(|r| r.value)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A bench that re-solves its circuit on every tick.
///
/// Hosts call [`Lab::tick`] on their own schedule (an animation frame, a
/// timer). Each tick starts from the current topology, so edits made
/// between ticks are picked up without any invalidation.
pub struct Lab {
    topology: Topology,
    config: SolverConfig,
    running: bool,
    last: Option<SolvedNetwork>,
}

impl Lab {
    /// Create a stopped lab with default solver settings.
    pub fn new(topology: Topology) -> Self {
        Self::with_config(topology, SolverConfig::default())
    }

    /// Create a stopped lab with custom solver settings.
    pub fn with_config(topology: Topology, config: SolverConfig) -> Self {
        Self {
            topology,
            config,
            running: false,
            last: None,
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn topology_mut(&mut self) -> &mut Topology {
        &mut self.topology
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Solution of the last successful tick.
    pub fn last_solution(&self) -> Option<&SolvedNetwork> {
        self.last.as_ref()
    }

    pub fn start(&mut self) {
        debug!("lab started");
        self.running = true;
    }

    /// Stop and blank every meter and bulb.
    pub fn stop(&mut self) {
        debug!("lab stopped");
        self.running = false;
        self.last = None;
        for item in self.topology.items_mut() {
            item.component.reset_live_state();
        }
    }

    /// Solve and write readings back into the instruments.
    ///
    /// Does nothing while stopped.
    pub fn tick(&mut self) -> Option<Readings> {
        if !self.running {
            return None;
        }
        let (solved, readings) = self.measure();

        for reading in &readings.readings {
            let Some(item) = self.topology.item_mut(reading.item) else {
                continue;
            };
            match &mut item.component {
                Component::Bulb(bulb) => {
                    let level = reading.value.unwrap_or(0.0);
                    if (level - bulb.brightness).abs() > BRIGHTNESS_STEP {
                        bulb.brightness = level;
                    }
                }
                component => {
                    if component.set_display(&reading.display) {
                        trace!("{} now reads {}", reading.item, reading.display);
                    }
                }
            }
        }

        self.last = solved;
        Some(readings)
    }

    /// Measure every instrument without touching the topology.
    pub fn readings(&self) -> Readings {
        self.measure().1
    }

    fn measure(&self) -> (Option<SolvedNetwork>, Readings) {
        let topology = &self.topology;
        let config = &self.config;

        let (solved, reason) = match solve_dc(topology, config) {
            Ok(solved) => (Some(solved), None),
            Err(e) => {
                debug!("solve failed: {}", e);
                (None, Some(e.reason()))
            }
        };

        let readings = topology
            .items()
            .filter_map(|item| {
                let instrument = item.component.instrument()?;
                let value = match instrument {
                    Instrument::Voltmeter => solved
                        .as_ref()
                        .and_then(|s| voltage_across(topology, s, item.id)),
                    Instrument::Ammeter => solved
                        .as_ref()
                        .and_then(|s| current_through(topology, s, item.id, config)),
                    Instrument::Ohmmeter => equivalent_resistance(topology, item.id, config),
                    Instrument::Bulb => Some(bulb_brightness(
                        topology,
                        solved.as_ref(),
                        item.id,
                        config,
                    )),
                };
                let display = match instrument {
                    Instrument::Bulb => format_brightness(value.unwrap_or(0.0)),
                    _ => format_si(value, instrument.unit()),
                };
                Some(Reading {
                    item: item.id,
                    instrument,
                    value,
                    display,
                })
            })
            .collect();

        let readings = Readings {
            solved: solved.is_some(),
            reason,
            readings,
        };
        (solved, readings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{Pose, Side};
    use crate::components::NO_READING;

    fn bench() -> (Topology, ItemId, ItemId, ItemId) {
        let mut topo = Topology::new();
        let b = topo.add_item(Component::battery(9.0, 0.0), Pose::default());
        let bulb = topo.add_item(Component::bulb(30.0), Pose::default());
        let vm = topo.add_item(Component::voltmeter(), Pose::default());
        topo.connect((b, Side::Positive), (bulb, Side::Positive)).unwrap();
        topo.connect((bulb, Side::Negative), (b, Side::Negative)).unwrap();
        topo.connect((vm, Side::Positive), (bulb, Side::Positive)).unwrap();
        topo.connect((vm, Side::Negative), (bulb, Side::Negative)).unwrap();
        (topo, b, bulb, vm)
    }

    #[test]
    fn test_tick_when_stopped_is_noop() {
        let (topo, _, _, _) = bench();
        let mut lab = Lab::new(topo.clone());
        assert!(lab.tick().is_none());
        assert_eq!(lab.topology(), &topo);
    }

    #[test]
    fn test_tick_updates_instruments() {
        let (topo, _, bulb, vm) = bench();
        let mut lab = Lab::new(topo);
        lab.start();
        let readings = lab.tick().unwrap();
        assert!(readings.solved);
        assert!((readings.value(vm).unwrap() - 9.0).abs() < 1e-6);

        let item = lab.topology().item(vm).unwrap();
        assert_eq!(item.component.display(), Some("9.00 V"));
        match &lab.topology().item(bulb).unwrap().component {
            // 9V across 30 ohms is 2.7 W, past full brightness
            Component::Bulb(b) => assert_eq!(b.brightness, 1.0),
            other => panic!("unexpected {:?}", other),
        }
        assert!(lab.last_solution().is_some());
    }

    #[test]
    fn test_stop_resets_live_state() {
        let (topo, _, bulb, vm) = bench();
        let mut lab = Lab::new(topo);
        lab.start();
        lab.tick();
        lab.stop();
        assert!(!lab.is_running());
        assert!(lab.last_solution().is_none());
        assert_eq!(lab.topology().item(vm).unwrap().component.display(), Some(NO_READING));
        match &lab.topology().item(bulb).unwrap().component {
            Component::Bulb(b) => assert_eq!(b.brightness, 0.0),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_small_brightness_change_ignored() {
        let (mut topo, _, bulb, _) = bench();
        if let Some(item) = topo.item_mut(bulb) {
            if let Component::Bulb(b) = &mut item.component {
                b.brightness = 0.99;
            }
        }
        let mut lab = Lab::new(topo);
        lab.start();
        lab.tick();
        match &lab.topology().item(bulb).unwrap().component {
            Component::Bulb(b) => assert_eq!(b.brightness, 0.99),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_failed_solve_degrades_readings() {
        let mut topo = Topology::new();
        let vm = topo.add_item(Component::voltmeter(), Pose::default());
        let r = topo.add_item(Component::resistor(10.0), Pose::default());
        topo.connect((vm, Side::Positive), (r, Side::Positive)).unwrap();
        topo.connect((vm, Side::Negative), (r, Side::Negative)).unwrap();

        let lab = Lab::new(topo);
        let readings = lab.readings();
        assert!(!readings.solved);
        assert_eq!(readings.reason, Some("no_sources"));
        assert_eq!(readings.get(vm).unwrap().display, NO_READING);
    }

    #[test]
    fn test_edits_seen_next_tick() {
        let (topo, b, bulb, vm) = bench();
        let mut lab = Lab::new(topo);
        lab.start();
        lab.tick();
        lab.topology_mut().remove_item(bulb).unwrap();
        let readings = lab.tick().unwrap();
        // Battery and voltmeter are both unwired now
        assert!(!readings.solved);
        assert_eq!(readings.reason, Some("no_sources"));
        assert_eq!(readings.value(vm), None);
        assert!(lab.topology().item(b).is_some());
    }
}
