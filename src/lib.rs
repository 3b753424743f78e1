//! # VoltLab Core
//!
//! DC circuit solver for an interactive electronics bench.
//!
//! This library provides:
//! - A topology of two-terminal items, junction nodes and wires
//! - Net resolution over the wire graph
//! - Modified Nodal Analysis (MNA) for DC operating points
//! - Voltmeter, ammeter, ohmmeter and bulb readings
//!
//! ## Architecture
//!
//! - [`circuit`] - Topology, nets and diagnostics
//! - [`components`] - Component models and how they stamp
//! - [`solver`] - Network building, MNA solving, measurement, live driver
//! - [`display`] - SI formatting for meter faces
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! RUST_LOG=debug voltlab bench.json --json
//! ```
//!
//! ### Library
//!
//! ```
//! use voltlab_core::{Component, Lab, Pose, Side, Topology};
//!
//! let mut topo = Topology::new();
//! let battery = topo.add_item(Component::battery(9.0, 0.0), Pose::default());
//! let meter = topo.add_item(Component::voltmeter(), Pose::default());
//! topo.connect((battery, Side::Positive), (meter, Side::Positive)).unwrap();
//! topo.connect((battery, Side::Negative), (meter, Side::Negative)).unwrap();
//!
//! let mut lab = Lab::new(topo);
//! lab.start();
//! let readings = lab.tick().unwrap();
//! assert_eq!(readings.get(meter).unwrap().display, "9.00 V");
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmLab } from 'voltlab_core';
//!
//! const lab = new WasmLab(snapshotJson);
//! lab.start();
//! const readings = JSON.parse(lab.tick());
//! ```
//!
//! ## Solving Method
//!
//! Every tick rebuilds the network from the topology:
//!
//! 1. Group nodes into nets through the wires
//! 2. Stamp resistors and voltage sources between nets
//! 3. Solve Ax = z by Gaussian elimination with partial pivoting
//! 4. Derive instrument readings from net voltages and source currents

pub mod circuit;
pub mod components;
pub mod display;
pub mod error;
pub mod solver;

#[cfg(feature = "cli")]
pub mod report;

// Re-export main types for convenience
pub use circuit::{ItemId, NetId, NodeId, Point, Pose, Side, Topology, WireId};
pub use components::Component;
pub use error::{LabError, Result};
pub use solver::{solve_dc, Lab, SolverConfig};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmLab;
