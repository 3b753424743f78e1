//! Component models for the circuit bench.
//!
//! This module provides models for all supported components:
//! - Sources: Battery (ideal source with internal resistance)
//! - Linear: Resistor, Bulb
//! - Controls: Switch
//! - Instruments: Voltmeter, Ammeter, Ohmmeter
//!
//! Every component has exactly two terminals. Each one implements
//! [`Element`], which is how the network builder turns it into stamps.

mod controls;
mod linear;
mod meters;
mod sources;

pub use controls::Switch;
pub use linear::{Bulb, Resistor};
pub use meters::{Ammeter, Ohmmeter, Voltmeter, NO_READING};
pub use sources::Battery;

use serde::{Deserialize, Serialize};

use crate::circuit::{ItemId, NetId};
use crate::solver::{Network, SolverConfig};

/// Something that contributes linear elements to the DC network.
pub trait Element {
    /// Stamp this element between its two terminal nets `[negative, positive]`.
    fn stamp(&self, owner: ItemId, nets: [NetId; 2], network: &mut Network, config: &SolverConfig);

    /// Resistance this element is stamped with, when it is modeled as a
    /// single resistor. Used to recover branch current from voltage drop.
    fn stamped_resistance(&self, _config: &SolverConfig) -> Option<f64> {
        None
    }
}

/// Instruments and indicators that get a live value every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    Voltmeter,
    Ammeter,
    Ohmmeter,
    Bulb,
}

impl Instrument {
    /// SI unit symbol of the reading. Bulbs show a bare 0..1 level.
    pub fn unit(self) -> &'static str {
        match self {
            Instrument::Voltmeter => "V",
            Instrument::Ammeter => "A",
            Instrument::Ohmmeter => "Ω",
            Instrument::Bulb => "",
        }
    }
}

/// Component types available in the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Battery,
    Resistor,
    Bulb,
    Switch,
    Voltmeter,
    Ammeter,
    Ohmmeter,
}

impl ComponentKind {
    /// All kinds, in library order.
    pub const ALL: [ComponentKind; 7] = [
        ComponentKind::Battery,
        ComponentKind::Resistor,
        ComponentKind::Bulb,
        ComponentKind::Switch,
        ComponentKind::Voltmeter,
        ComponentKind::Ammeter,
        ComponentKind::Ohmmeter,
    ];

    /// Parse a kind from its library name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "battery" => Some(Self::Battery),
            "resistor" => Some(Self::Resistor),
            "bulb" => Some(Self::Bulb),
            "switch" => Some(Self::Switch),
            "voltmeter" => Some(Self::Voltmeter),
            "ammeter" => Some(Self::Ammeter),
            "ohmmeter" => Some(Self::Ohmmeter),
            _ => None,
        }
    }

    /// Library name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Battery => "battery",
            Self::Resistor => "resistor",
            Self::Bulb => "bulb",
            Self::Switch => "switch",
            Self::Voltmeter => "voltmeter",
            Self::Ammeter => "ammeter",
            Self::Ohmmeter => "ohmmeter",
        }
    }

    /// A freshly placed component of this kind with library defaults.
    pub fn default_component(self) -> Component {
        match self {
            Self::Battery => Component::Battery(Battery::default()),
            Self::Resistor => Component::Resistor(Resistor::default()),
            Self::Bulb => Component::Bulb(Bulb::default()),
            Self::Switch => Component::Switch(Switch::default()),
            Self::Voltmeter => Component::Voltmeter(Voltmeter::default()),
            Self::Ammeter => Component::Ammeter(Ammeter::default()),
            Self::Ohmmeter => Component::Ohmmeter(Ohmmeter::default()),
        }
    }
}

/// A circuit component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Component {
    Battery(Battery),
    Resistor(Resistor),
    Bulb(Bulb),
    Switch(Switch),
    Voltmeter(Voltmeter),
    Ammeter(Ammeter),
    Ohmmeter(Ohmmeter),
}

impl Component {
    /// Battery with the given EMF and internal resistance.
    pub fn battery(voltage: f64, internal_resistance: f64) -> Self {
        Component::Battery(Battery::new(voltage, internal_resistance))
    }

    /// Resistor with the given resistance.
    pub fn resistor(resistance: f64) -> Self {
        Component::Resistor(Resistor::new(resistance))
    }

    /// Bulb with the given filament resistance.
    pub fn bulb(resistance: f64) -> Self {
        Component::Bulb(Bulb::new(resistance))
    }

    /// Switch in the given state.
    pub fn switch(closed: bool) -> Self {
        Component::Switch(Switch::new(closed))
    }

    pub fn voltmeter() -> Self {
        Component::Voltmeter(Voltmeter::default())
    }

    pub fn ammeter() -> Self {
        Component::Ammeter(Ammeter::default())
    }

    pub fn ohmmeter() -> Self {
        Component::Ohmmeter(Ohmmeter::default())
    }

    /// Get the component kind.
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Battery(_) => ComponentKind::Battery,
            Component::Resistor(_) => ComponentKind::Resistor,
            Component::Bulb(_) => ComponentKind::Bulb,
            Component::Switch(_) => ComponentKind::Switch,
            Component::Voltmeter(_) => ComponentKind::Voltmeter,
            Component::Ammeter(_) => ComponentKind::Ammeter,
            Component::Ohmmeter(_) => ComponentKind::Ohmmeter,
        }
    }

    /// View this component through its stamping interface.
    pub fn element(&self) -> &dyn Element {
        match self {
            Component::Battery(b) => b,
            Component::Resistor(r) => r,
            Component::Bulb(b) => b,
            Component::Switch(s) => s,
            Component::Voltmeter(v) => v,
            Component::Ammeter(a) => a,
            Component::Ohmmeter(o) => o,
        }
    }

    /// The live value this component shows, if any.
    pub fn instrument(&self) -> Option<Instrument> {
        match self {
            Component::Voltmeter(_) => Some(Instrument::Voltmeter),
            Component::Ammeter(_) => Some(Instrument::Ammeter),
            Component::Ohmmeter(_) => Some(Instrument::Ohmmeter),
            Component::Bulb(_) => Some(Instrument::Bulb),
            Component::Battery(_) | Component::Resistor(_) | Component::Switch(_) => None,
        }
    }

    /// Cached display text of a meter.
    pub fn display(&self) -> Option<&str> {
        match self {
            Component::Voltmeter(m) => Some(&m.display),
            Component::Ammeter(m) => Some(&m.display),
            Component::Ohmmeter(m) => Some(&m.display),
            _ => None,
        }
    }

    /// Replace the display text of a meter. Returns true if it changed.
    pub fn set_display(&mut self, text: &str) -> bool {
        let slot = match self {
            Component::Voltmeter(m) => &mut m.display,
            Component::Ammeter(m) => &mut m.display,
            Component::Ohmmeter(m) => &mut m.display,
            _ => return false,
        };
        if slot.as_str() == text {
            return false;
        }
        slot.clear();
        slot.push_str(text);
        true
    }

    /// Clear live state back to the "not running" look.
    pub fn reset_live_state(&mut self) {
        match self {
            Component::Bulb(b) => b.brightness = 0.0,
            _ => {
                self.set_display(NO_READING);
            }
        }
    }
}
