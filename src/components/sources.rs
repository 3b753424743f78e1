//! Battery: the only source on the bench.

use serde::{Deserialize, Serialize};

use super::Element;
use crate::circuit::{ItemId, NetId};
use crate::solver::{Network, SolverConfig, SourceId};

/// A DC battery.
///
/// Modeled as an ideal voltage source `V` in series with an internal
/// resistance `Rint`:
///
/// ```text
///   (-) ----[ V ]---- int ----[ Rint ]---- (+)
/// ```
///
/// A near-zero `Rint` collapses to a single ideal source between the
/// terminals, since MNA source stamps are exact only for ideal sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Battery {
    /// Electromotive force in volts
    #[serde(rename = "V", default = "Battery::default_voltage")]
    pub voltage: f64,
    /// Internal series resistance in ohms
    #[serde(rename = "Rint", default = "Battery::default_internal_resistance")]
    pub internal_resistance: f64,
}

impl Battery {
    /// Default EMF for a placed battery.
    pub const DEFAULT_VOLTAGE: f64 = 9.0;
    /// Default internal resistance for a placed battery.
    pub const DEFAULT_INTERNAL_RESISTANCE: f64 = 0.2;

    fn default_voltage() -> f64 {
        Self::DEFAULT_VOLTAGE
    }

    fn default_internal_resistance() -> f64 {
        Self::DEFAULT_INTERNAL_RESISTANCE
    }

    /// Create a new battery. Negative internal resistance is clamped to zero.
    pub fn new(voltage: f64, internal_resistance: f64) -> Self {
        Self {
            voltage,
            internal_resistance: internal_resistance.max(0.0),
        }
    }

    /// Source value actually stamped; non-finite input counts as a dead cell.
    pub fn emf(&self) -> f64 {
        if self.voltage.is_finite() {
            self.voltage
        } else {
            0.0
        }
    }

    /// Whether the internal resistance is negligible under `config`.
    pub fn is_ideal(&self, config: &SolverConfig) -> bool {
        !(self.internal_resistance >= config.min_resistance)
    }
}

impl Default for Battery {
    fn default() -> Self {
        Self::new(Self::DEFAULT_VOLTAGE, Self::DEFAULT_INTERNAL_RESISTANCE)
    }
}

impl Element for Battery {
    fn stamp(&self, owner: ItemId, nets: [NetId; 2], network: &mut Network, config: &SolverConfig) {
        let [neg, pos] = nets;

        if !network.sources_enabled() {
            // Zeroed source: the ideal part becomes a short, Rint stays
            let r = if self.is_ideal(config) {
                config.short_resistance
            } else {
                self.internal_resistance
            };
            network.add_resistor(owner, neg, pos, r);
            return;
        }

        if self.is_ideal(config) {
            network.add_source(SourceId::Item(owner), pos, neg, self.emf());
        } else {
            let internal = network.alloc_net();
            network.add_source(SourceId::Item(owner), internal, neg, self.emf());
            network.add_resistor(owner, internal, pos, self.internal_resistance);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_battery_defaults() {
        let b = Battery::default();
        assert_eq!(b.voltage, 9.0);
        assert_eq!(b.internal_resistance, 0.2);
    }

    #[test]
    fn test_battery_ideal_threshold() {
        let config = SolverConfig::default();
        assert!(Battery::new(9.0, 0.0).is_ideal(&config));
        assert!(Battery::new(9.0, -1.0).is_ideal(&config));
        assert!(Battery::new(9.0, f64::NAN).is_ideal(&config));
        assert!(!Battery::new(9.0, 0.5).is_ideal(&config));
    }

    #[test]
    fn test_battery_emf_non_finite() {
        assert_eq!(Battery::new(f64::INFINITY, 0.0).emf(), 0.0);
        assert_eq!(Battery::new(1.5, 0.0).emf(), 1.5);
    }
}
