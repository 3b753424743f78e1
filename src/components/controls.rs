//! Control components: Switch.

use serde::{Deserialize, Serialize};

use super::Element;
use crate::circuit::{ItemId, NetId};
use crate::solver::{Network, SolverConfig};

/// A single-pole switch.
///
/// Always stamped, as a resistance:
/// - Closed: `short_resistance` from the solver config
/// - Open: `open_resistance` from the solver config
///
/// Keeping it in the stamp list in both states means toggling never changes
/// the matrix structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Switch {
    #[serde(default = "Switch::default_closed")]
    pub closed: bool,
}

impl Switch {
    fn default_closed() -> bool {
        true
    }

    /// Create a new switch.
    pub fn new(closed: bool) -> Self {
        Self { closed }
    }

    /// Get the current resistance.
    pub fn resistance(&self, config: &SolverConfig) -> f64 {
        if self.closed {
            config.short_resistance
        } else {
            config.open_resistance
        }
    }

    /// Set the switch state.
    pub fn set_state(&mut self, closed: bool) {
        self.closed = closed;
    }

    /// Toggle the switch state.
    pub fn toggle(&mut self) {
        self.closed = !self.closed;
    }
}

impl Default for Switch {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Element for Switch {
    fn stamp(&self, owner: ItemId, nets: [NetId; 2], network: &mut Network, config: &SolverConfig) {
        network.add_resistor(owner, nets[0], nets[1], self.resistance(config));
    }

    fn stamped_resistance(&self, config: &SolverConfig) -> Option<f64> {
        Some(config.floor_resistance(self.resistance(config)))
    }
}
