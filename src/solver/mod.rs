//! DC solver: network building, MNA, and measurement.
//!
//! ## Modified Nodal Analysis
//!
//! MNA assembles a system of equations Ax = z where:
//! - x contains net voltages and voltage source currents
//! - A is the conductance/incidence matrix
//! - z is the source vector
//!
//! The matrix structure is:
//! ```text
//! [ G   B ] [ v ]   [ 0 ]
//! [ C   0 ] [ j ] = [ e ]
//! ```
//!
//! where:
//! - G is the conductance matrix (one row per non-ground net)
//! - B, C connect voltage sources to nets
//! - v is the vector of net voltages
//! - j is the vector of voltage source currents
//! - e is the vector of voltage source values
//!
//! Every solve starts from the topology: nets are recomputed, stamps are
//! rebuilt and a fresh matrix is allocated. Nothing is cached between calls.

mod builder;
mod measure;
mod mna;
mod simulator;

pub use builder::{
    choose_ground, Network, NetworkBuilder, ResistorStamp, SourceId, SourceMode, SourceStamp,
};
pub use measure::{
    bulb_brightness, current_through, equivalent_resistance, voltage_across, PROBE_VOLTAGE,
};
pub use mna::{solve, MnaMatrix, Solution, SolvedNetwork};
pub use simulator::{Lab, Reading, Readings};

use crate::circuit::Topology;
use crate::error::{LabError, Result};

/// Resistance standing in for a short (closed switch, ammeter, zeroed source).
pub const DEFAULT_SHORT_RESISTANCE: f64 = 1e-6;

/// Resistance standing in for an open switch.
pub const DEFAULT_OPEN_RESISTANCE: f64 = 1e9;

/// Smallest resistance ever stamped.
pub const DEFAULT_MIN_RESISTANCE: f64 = 1e-9;

/// Pivot magnitude below which the matrix is declared singular.
pub const DEFAULT_PIVOT_EPSILON: f64 = 1e-12;

/// Ohmmeter test current below which the probes see an open circuit.
pub const DEFAULT_PROBE_CURRENT_EPSILON: f64 = 1e-15;

/// Power at which a bulb reaches full brightness (watts).
pub const DEFAULT_BULB_REFERENCE_POWER: f64 = 1.5;

/// Numerical knobs of the solver.
///
/// These values were tuned by trial, not derived. Each is a plain
/// configurable constant.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Resistance used for ideal shorts.
    pub short_resistance: f64,
    /// Resistance used for an open switch.
    pub open_resistance: f64,
    /// Floor applied to every stamped resistance. Battery internal
    /// resistance below this counts as zero.
    pub min_resistance: f64,
    /// Singularity threshold for Gaussian elimination.
    pub pivot_epsilon: f64,
    /// Smallest ohmmeter test current treated as a real reading.
    pub probe_current_epsilon: f64,
    /// Power at which a bulb is fully lit.
    pub bulb_reference_power: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            short_resistance: DEFAULT_SHORT_RESISTANCE,
            open_resistance: DEFAULT_OPEN_RESISTANCE,
            min_resistance: DEFAULT_MIN_RESISTANCE,
            pivot_epsilon: DEFAULT_PIVOT_EPSILON,
            probe_current_epsilon: DEFAULT_PROBE_CURRENT_EPSILON,
            bulb_reference_power: DEFAULT_BULB_REFERENCE_POWER,
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the resistance used for shorts.
    pub fn with_short_resistance(mut self, ohms: f64) -> Self {
        self.short_resistance = ohms;
        self
    }

    /// Set the resistance used for an open switch.
    ///
    /// Very large values weaken the pivots of nets hanging off an open
    /// switch; keep `1 / open_resistance` well above `pivot_epsilon`.
    pub fn with_open_resistance(mut self, ohms: f64) -> Self {
        self.open_resistance = ohms;
        self
    }

    /// Set the resistance floor.
    pub fn with_min_resistance(mut self, ohms: f64) -> Self {
        self.min_resistance = ohms;
        self
    }

    /// Set the singularity threshold.
    pub fn with_pivot_epsilon(mut self, epsilon: f64) -> Self {
        self.pivot_epsilon = epsilon;
        self
    }

    /// Set the smallest meaningful ohmmeter test current.
    pub fn with_probe_current_epsilon(mut self, amps: f64) -> Self {
        self.probe_current_epsilon = amps;
        self
    }

    /// Set the power at which bulbs saturate.
    pub fn with_bulb_reference_power(mut self, watts: f64) -> Self {
        self.bulb_reference_power = watts;
        self
    }

    /// Clamp a resistance to the floor. NaN becomes the floor; infinity
    /// stays infinite (zero conductance).
    pub fn floor_resistance(&self, ohms: f64) -> f64 {
        if ohms.is_nan() {
            self.min_resistance
        } else {
            ohms.max(self.min_resistance)
        }
    }
}

/// Solve the circuit on the bench with its batteries driving it.
///
/// Fails with [`LabError::NoSources`] when nothing drives the network and
/// with [`LabError::SingularMatrix`] when the network has no unique DC
/// solution. Both are normal outcomes for a half-built circuit.
pub fn solve_dc(topology: &Topology, config: &SolverConfig) -> Result<SolvedNetwork> {
    let network = NetworkBuilder::new(topology, config).build();
    if network.sources().is_empty() {
        return Err(LabError::NoSources);
    }
    let solution = solve(&network, config)?;
    Ok(SolvedNetwork::new(network, solution))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_resistance() {
        let config = SolverConfig::new().with_min_resistance(1e-3);
        assert_eq!(config.floor_resistance(0.0), 1e-3);
        assert_eq!(config.floor_resistance(-5.0), 1e-3);
        assert_eq!(config.floor_resistance(f64::NAN), 1e-3);
        assert_eq!(config.floor_resistance(47.0), 47.0);
        assert!(config.floor_resistance(f64::INFINITY).is_infinite());
    }

    #[test]
    fn test_config_builder() {
        let config = SolverConfig::new()
            .with_short_resistance(1e-4)
            .with_open_resistance(1e8)
            .with_pivot_epsilon(1e-14)
            .with_probe_current_epsilon(1e-13)
            .with_bulb_reference_power(3.0);
        assert_eq!(config.short_resistance, 1e-4);
        assert_eq!(config.open_resistance, 1e8);
        assert_eq!(config.pivot_epsilon, 1e-14);
        assert_eq!(config.probe_current_epsilon, 1e-13);
        assert_eq!(config.bulb_reference_power, 3.0);
        assert_eq!(config.min_resistance, DEFAULT_MIN_RESISTANCE);
    }
}
