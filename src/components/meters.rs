//! Instruments: Voltmeter, Ammeter, Ohmmeter.
//!
//! Meters are ideal. The voltmeter and ohmmeter are open circuits and stamp
//! nothing; their readings come entirely from post-solve measurement. The
//! ammeter is a near-short whose current is recovered from the drop across
//! its known resistance.

use serde::{Deserialize, Serialize};

use super::Element;
use crate::circuit::{ItemId, NetId};
use crate::solver::{Network, SolverConfig};

/// Display text for a meter without a reading.
pub const NO_READING: &str = "—";

fn no_reading() -> String {
    NO_READING.to_string()
}

/// An ideal voltmeter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voltmeter {
    #[serde(default = "no_reading")]
    pub display: String,
}

impl Default for Voltmeter {
    fn default() -> Self {
        Self { display: no_reading() }
    }
}

impl Element for Voltmeter {
    fn stamp(
        &self,
        _owner: ItemId,
        _nets: [NetId; 2],
        _network: &mut Network,
        _config: &SolverConfig,
    ) {
    }
}

/// An ideal ammeter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ammeter {
    #[serde(default = "no_reading")]
    pub display: String,
}

impl Default for Ammeter {
    fn default() -> Self {
        Self { display: no_reading() }
    }
}

impl Element for Ammeter {
    fn stamp(&self, owner: ItemId, nets: [NetId; 2], network: &mut Network, config: &SolverConfig) {
        network.add_resistor(owner, nets[0], nets[1], config.short_resistance);
    }

    fn stamped_resistance(&self, config: &SolverConfig) -> Option<f64> {
        Some(config.floor_resistance(config.short_resistance))
    }
}

/// An ohmmeter reading the Thévenin resistance between its probes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ohmmeter {
    #[serde(default = "no_reading")]
    pub display: String,
}

impl Default for Ohmmeter {
    fn default() -> Self {
        Self { display: no_reading() }
    }
}

impl Element for Ohmmeter {
    fn stamp(
        &self,
        _owner: ItemId,
        _nets: [NetId; 2],
        _network: &mut Network,
        _config: &SolverConfig,
    ) {
    }
}
