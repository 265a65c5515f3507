use log::debug;
use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::network::{BranchKind, NetworkModel};

/// Builds the nodal admittance matrix (Y-bus) for a network.
///
/// Standard pi-model stamp per energized branch: series admittance
/// `y = 1/(r + jx)` is subtracted from both off-diagonal positions and added
/// to both diagonals, lines additionally contributing their `j*b/2` charging
/// shunt on the diagonals. Transformers carry no shunt term. De-energized
/// branches are skipped; the matrix starts at zero, so they leave no trace.
pub fn build_admittance(model: &NetworkModel) -> DMatrix<Complex64> {
    let n = model.bus_count();
    let mut y_bus = DMatrix::<Complex64>::zeros(n, n);

    for branch in model.branches() {
        if !branch.energized {
            continue;
        }

        let y = Complex64::new(1.0, 0.0) / Complex64::new(branch.r, branch.x);
        let (i, j) = (branch.from, branch.to);
        debug!("stamping {} '{}' ({i} <-> {j}): y = {y}", branch.kind, branch.uid);

        y_bus[(i, j)] -= y;
        y_bus[(j, i)] -= y;

        let shunt = match branch.kind {
            BranchKind::Line => Complex64::new(0.0, branch.b / 2.0),
            BranchKind::Transformer => Complex64::ZERO,
        };
        y_bus[(i, i)] += y + shunt;
        y_bus[(j, j)] += y + shunt;
    }

    y_bus
}
