//! VoltLab - DC circuit bench solver
//!
//! Loads a bench snapshot, solves it once and prints every meter reading.
//!
//! # Usage
//!
//! ```bash
//! voltlab bench.json
//! voltlab bench.json --json
//! ```

use std::io;
use std::path::PathBuf;

use clap::Parser;
use log::info;
use voltlab_core::{
    error::Result,
    report::{load_snapshot, write_json, write_table},
    Lab, SolverConfig,
};

/// DC circuit bench solver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the bench snapshot (.json)
    #[arg(value_name = "SNAPSHOT_FILE")]
    snapshot_file: PathBuf,

    /// Print readings as JSON
    #[arg(long)]
    json: bool,

    /// Resistance used for an open switch, in ohms
    #[arg(long, value_name = "OHMS")]
    open_resistance: Option<f64>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let topology = load_snapshot(&args.snapshot_file)?;
    info!(
        "loaded {} items, {} nodes, {} wires",
        topology.item_count(),
        topology.node_count(),
        topology.wire_count()
    );

    let mut config = SolverConfig::new();
    if let Some(ohms) = args.open_resistance {
        config = config.with_open_resistance(ohms);
    }

    let mut lab = Lab::with_config(topology, config);
    lab.start();
    let readings = lab.tick().unwrap_or_default();

    let mut out = io::stdout().lock();
    if args.json {
        write_json(&mut out, &readings)?;
    } else {
        write_table(&mut out, lab.topology(), &readings)?;
    }

    Ok(())
}
