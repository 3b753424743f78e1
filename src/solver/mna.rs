//! MNA matrix assembly and solving.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::{debug, trace};

use super::builder::{Network, SourceId};
use super::SolverConfig;
use crate::circuit::{ItemId, NetId, Nets, Topology};
use crate::error::{LabError, Result};

/// MNA matrix system Ax = z.
#[derive(Debug)]
pub struct MnaMatrix {
    /// System matrix A (row-major)
    pub a: Vec<f64>,
    /// Source vector z
    pub z: Vec<f64>,
    /// Matrix dimension
    pub size: usize,
}

impl MnaMatrix {
    /// Create a zeroed system of the given dimension.
    pub fn new(size: usize) -> Self {
        Self {
            a: vec![0.0; size * size],
            z: vec![0.0; size],
            size,
        }
    }

    /// Get matrix element at (row, col).
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.a[row * self.size + col]
    }

    /// Add to matrix element at (row, col).
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        self.a[row * self.size + col] += value;
    }

    /// Stamp a conductance between two unknowns. `None` is ground.
    ///   A[n1,n1] += G
    ///   A[n2,n2] += G
    ///   A[n1,n2] -= G
    ///   A[n2,n1] -= G
    pub fn stamp_conductance(&mut self, n1: Option<usize>, n2: Option<usize>, g: f64) {
        if let Some(i) = n1 {
            self.add(i, i, g);
        }
        if let Some(j) = n2 {
            self.add(j, j, g);
        }
        if let (Some(i), Some(j)) = (n1, n2) {
            self.add(i, j, -g);
            self.add(j, i, -g);
        }
    }

    /// Stamp a voltage source with branch current at index br.
    /// V[n+] - V[n-] = E
    pub fn stamp_voltage_source(
        &mut self,
        n_pos: Option<usize>,
        n_neg: Option<usize>,
        br: usize,
        voltage: f64,
    ) {
        if let Some(i) = n_pos {
            self.add(br, i, 1.0);
            self.add(i, br, 1.0);
        }
        if let Some(j) = n_neg {
            self.add(br, j, -1.0);
            self.add(j, br, -1.0);
        }
        self.z[br] = voltage;
    }

    /// Gaussian elimination with partial pivoting, then back-substitution.
    ///
    /// Works on a copy; the matrix itself is left untouched. A pivot whose
    /// magnitude is below `pivot_epsilon` means the system has no unique
    /// solution.
    pub fn solve(&self, pivot_epsilon: f64) -> Result<Vec<f64>> {
        let n = self.size;
        let mut lu = self.a.clone();
        let mut rhs = self.z.clone();

        for k in 0..n {
            // Find pivot
            let mut max_val = lu[k * n + k].abs();
            let mut max_row = k;
            for i in (k + 1)..n {
                let val = lu[i * n + k].abs();
                if val > max_val {
                    max_val = val;
                    max_row = i;
                }
            }

            if !(max_val >= pivot_epsilon) {
                trace!("pivot {:e} in column {} below threshold", max_val, k);
                return Err(LabError::SingularMatrix { column: k });
            }

            if max_row != k {
                for j in 0..n {
                    lu.swap(k * n + j, max_row * n + j);
                }
                rhs.swap(k, max_row);
            }

            let pivot = lu[k * n + k];
            for i in (k + 1)..n {
                let factor = lu[i * n + k] / pivot;
                if factor == 0.0 {
                    continue;
                }
                lu[i * n + k] = 0.0;
                for j in (k + 1)..n {
                    lu[i * n + j] -= factor * lu[k * n + j];
                }
                rhs[i] -= factor * rhs[k];
            }
        }

        let mut x = vec![0.0; n];
        for i in (0..n).rev() {
            let mut sum = rhs[i];
            for j in (i + 1)..n {
                sum -= lu[i * n + j] * x[j];
            }
            x[i] = sum / lu[i * n + i];
        }
        Ok(x)
    }
}

/// Net voltages and source currents of one solve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Solution {
    voltages: BTreeMap<NetId, f64>,
    currents: BTreeMap<SourceId, f64>,
}

impl Solution {
    /// Voltage of a net relative to ground. `None` for nets nothing is
    /// stamped on.
    pub fn voltage(&self, net: NetId) -> Option<f64> {
        self.voltages.get(&net).copied()
    }

    /// Current through a source, positive when it flows into the `a` side
    /// from the external circuit.
    pub fn current(&self, source: SourceId) -> Option<f64> {
        self.currents.get(&source).copied()
    }

    pub fn voltages(&self) -> &BTreeMap<NetId, f64> {
        &self.voltages
    }

    pub fn currents(&self) -> &BTreeMap<SourceId, f64> {
        &self.currents
    }
}

/// Solve a network with MNA.
///
/// Unknowns are created only for non-ground nets that at least one stamp
/// touches, so isolated nodes do not leave empty rows behind. The ground net
/// is always reported at 0 V.
pub fn solve(network: &Network, config: &SolverConfig) -> Result<Solution> {
    let ground = network.ground();

    let mut active: BTreeSet<NetId> = BTreeSet::new();
    for r in network.resistors() {
        active.insert(r.a);
        active.insert(r.b);
    }
    for s in network.sources() {
        active.insert(s.a);
        active.insert(s.b);
    }
    active.remove(&ground);

    let index: HashMap<NetId, usize> = active.iter().enumerate().map(|(i, n)| (*n, i)).collect();
    let unknowns = index.len();
    let idx = |net: NetId| index.get(&net).copied();

    let mut matrix = MnaMatrix::new(unknowns + network.sources().len());
    for r in network.resistors() {
        matrix.stamp_conductance(idx(r.a), idx(r.b), 1.0 / r.resistance);
    }
    for (k, s) in network.sources().iter().enumerate() {
        matrix.stamp_voltage_source(idx(s.a), idx(s.b), unknowns + k, s.voltage);
    }

    debug!(
        "solving {}x{} system ({} nets, {} sources)",
        matrix.size,
        matrix.size,
        unknowns,
        network.sources().len()
    );
    let x = matrix.solve(config.pivot_epsilon)?;

    let mut voltages = BTreeMap::new();
    voltages.insert(ground, 0.0);
    for (net, i) in &index {
        voltages.insert(*net, x[*i]);
    }
    let currents = network
        .sources()
        .iter()
        .enumerate()
        .map(|(k, s)| (s.id, x[unknowns + k]))
        .collect();

    Ok(Solution { voltages, currents })
}

/// A network together with its solution.
#[derive(Debug, Clone)]
pub struct SolvedNetwork {
    network: Network,
    solution: Solution,
}

impl SolvedNetwork {
    pub fn new(network: Network, solution: Solution) -> Self {
        Self { network, solution }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    pub fn nets(&self) -> &Nets {
        self.network.nets()
    }

    /// Voltage of a net relative to ground.
    pub fn voltage(&self, net: NetId) -> Option<f64> {
        self.solution.voltage(net)
    }

    /// Current through a source row.
    pub fn source_current(&self, source: SourceId) -> Option<f64> {
        self.solution.current(source)
    }

    pub fn voltages(&self) -> &BTreeMap<NetId, f64> {
        self.solution.voltages()
    }

    pub fn currents(&self) -> &BTreeMap<SourceId, f64> {
        self.solution.currents()
    }

    /// Voltages of an item's `[negative, positive]` terminals.
    pub fn terminal_voltages(&self, topology: &Topology, item: ItemId) -> Option<[f64; 2]> {
        let [neg, pos] = self.nets().terminal_nets(topology, item)?;
        Some([self.voltage(neg)?, self.voltage(pos)?])
    }
}
