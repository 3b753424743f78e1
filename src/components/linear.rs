//! Linear passive components: Resistor and Bulb.

use serde::{Deserialize, Serialize};

use super::Element;
use crate::circuit::{ItemId, NetId};
use crate::solver::{Network, SolverConfig};

/// A resistor component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resistor {
    /// Resistance in ohms
    #[serde(rename = "R", default = "Resistor::default_resistance")]
    pub resistance: f64,
}

impl Resistor {
    /// Resistance of a freshly placed resistor.
    pub const DEFAULT_RESISTANCE: f64 = 100.0;

    fn default_resistance() -> f64 {
        Self::DEFAULT_RESISTANCE
    }

    /// Create a new resistor.
    pub fn new(resistance: f64) -> Self {
        Self { resistance }
    }
}

impl Default for Resistor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RESISTANCE)
    }
}

impl Element for Resistor {
    fn stamp(
        &self,
        owner: ItemId,
        nets: [NetId; 2],
        network: &mut Network,
        _config: &SolverConfig,
    ) {
        network.add_resistor(owner, nets[0], nets[1], self.resistance);
    }

    fn stamped_resistance(&self, config: &SolverConfig) -> Option<f64> {
        Some(config.floor_resistance(self.resistance))
    }
}

/// An incandescent bulb.
///
/// Electrically a fixed resistor (the filament's hot resistance). Its
/// brightness is derived from dissipated power after each solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bulb {
    /// Filament resistance in ohms
    #[serde(rename = "R", default = "Bulb::default_resistance")]
    pub resistance: f64,
    /// Last displayed brightness (0.0 to 1.0)
    #[serde(default)]
    pub brightness: f64,
}

impl Bulb {
    /// Nominal filament resistance.
    pub const DEFAULT_RESISTANCE: f64 = 30.0;

    fn default_resistance() -> f64 {
        Self::DEFAULT_RESISTANCE
    }

    /// Create a new, dark bulb.
    pub fn new(resistance: f64) -> Self {
        Self {
            resistance,
            brightness: 0.0,
        }
    }

    /// Brightness for a given voltage across the filament.
    ///
    /// P = V²/R normalized against `reference_power`, clamped to [0, 1].
    pub fn brightness_at(&self, voltage: f64, config: &SolverConfig) -> f64 {
        let r = config.floor_resistance(self.resistance);
        let power = voltage * voltage / r;
        let level = power / config.bulb_reference_power;
        if level.is_nan() {
            0.0
        } else {
            level.clamp(0.0, 1.0)
        }
    }
}

impl Default for Bulb {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RESISTANCE)
    }
}

impl Element for Bulb {
    fn stamp(
        &self,
        owner: ItemId,
        nets: [NetId; 2],
        network: &mut Network,
        _config: &SolverConfig,
    ) {
        network.add_resistor(owner, nets[0], nets[1], self.resistance);
    }

    fn stamped_resistance(&self, config: &SolverConfig) -> Option<f64> {
        Some(config.floor_resistance(self.resistance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resistor_zero_is_floored() {
        let config = SolverConfig::default();
        let r = Resistor::new(0.0);
        assert_eq!(r.stamped_resistance(&config), Some(config.min_resistance));
    }

    #[test]
    fn test_bulb_brightness_curve() {
        let config = SolverConfig::default();
        let bulb = Bulb::new(30.0);

        assert_eq!(bulb.brightness_at(0.0, &config), 0.0);

        // 3V across 30Ω is 0.3W, a fifth of the reference power
        assert!((bulb.brightness_at(3.0, &config) - 0.2).abs() < 1e-12);
        assert_eq!(bulb.brightness_at(-3.0, &config), bulb.brightness_at(3.0, &config));

        let mut last = 0.0;
        for step in 0..100 {
            let b = bulb.brightness_at(step as f64 * 0.1, &config);
            assert!(b >= last);
            last = b;
        }
        assert_eq!(bulb.brightness_at(50.0, &config), 1.0);
    }
}
