//! Snapshot loading and readings output for the CLI frontend.

use std::fs;
use std::io::Write;
use std::path::Path;

use log::warn;

use crate::circuit::{validate_topology, Topology};
use crate::error::{LabError, Result};
use crate::solver::Readings;

/// Read a topology snapshot from a JSON file and log its diagnostics.
pub fn load_snapshot(path: &Path) -> Result<Topology> {
    let json = fs::read_to_string(path).map_err(|source| LabError::SnapshotRead {
        path: path.display().to_string(),
        source,
    })?;
    let topology = Topology::from_json(&json)?;
    for diagnostic in validate_topology(&topology) {
        warn!("{}", diagnostic);
    }
    Ok(topology)
}

/// Write one line per instrument: item id, kind and display text.
pub fn write_table<W: Write>(out: &mut W, topology: &Topology, readings: &Readings) -> Result<()> {
    let io = |source| LabError::ReportWrite { source };
    if let Some(reason) = readings.reason {
        writeln!(out, "# unsolved: {}", reason).map_err(io)?;
    }
    for reading in &readings.readings {
        let kind = topology
            .item(reading.item)
            .map(|item| item.component.kind().name())
            .unwrap_or("?");
        writeln!(out, "{:<5} {:<10} {}", reading.item.to_string(), kind, reading.display)
            .map_err(io)?;
    }
    Ok(())
}

/// Write the readings as a single JSON document.
pub fn write_json<W: Write>(out: &mut W, readings: &Readings) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, readings)?;
    writeln!(out).map_err(|source| LabError::ReportWrite { source })
}
