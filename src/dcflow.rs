use std::collections::BTreeMap;

use log::{debug, error};
use nalgebra::DMatrix;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::admittance::build_admittance;
use crate::network::{BranchKind, NetworkModel};

/// Dense index of the angle reference bus. Fixed by convention: the first
/// bus of the scenario document.
pub const REF_BUS: usize = 0;

/// Angles and line flows from a successful DC solve.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerFlowSolution {
    /// Voltage angle per bus, in dense-index order. `theta[REF_BUS] == 0.0`.
    pub theta: Vec<f64>,
    /// Signed flow per energized line, keyed by line uid. De-energized lines
    /// and transformers are absent.
    pub flows: BTreeMap<String, f64>,
}

/// Outcome of a DC power-flow solve. A failed solve carries a diagnostic
/// message and nothing else; callers must not assume angles or flows exist.
#[derive(Debug, Clone, PartialEq)]
pub enum PowerFlowResult {
    Solved(PowerFlowSolution),
    Failed { error: String },
}

impl PowerFlowResult {
    pub fn is_success(&self) -> bool {
        matches!(self, PowerFlowResult::Solved(_))
    }

    pub fn solution(&self) -> Option<&PowerFlowSolution> {
        match self {
            PowerFlowResult::Solved(solution) => Some(solution),
            PowerFlowResult::Failed { .. } => None,
        }
    }
}

// Wire shape: {success: true, theta, flows} | {success: false, error}.
impl Serialize for PowerFlowResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PowerFlowResult::Solved(solution) => {
                let mut s = serializer.serialize_struct("PowerFlowResult", 3)?;
                s.serialize_field("success", &true)?;
                s.serialize_field("theta", &solution.theta)?;
                s.serialize_field("flows", &solution.flows)?;
                s.end()
            }
            PowerFlowResult::Failed { error } => {
                let mut s = serializer.serialize_struct("PowerFlowResult", 2)?;
                s.serialize_field("success", &false)?;
                s.serialize_field("error", error)?;
                s.end()
            }
        }
    }
}

/// Solves the linearized power-flow system `B' * theta = P`.
///
/// `B'` is the negated imaginary part of the admittance matrix with the
/// reference bus's row and column removed; `P` is the per-bus injection
/// vector with the reference entry removed. The reference angle is pinned to
/// zero and reinserted after the solve. Flows are reported for energized
/// lines only, as `(theta_from - theta_to) / x`.
pub fn solve_dc(model: &NetworkModel) -> PowerFlowResult {
    let n = model.bus_count();
    let y_bus = build_admittance(model);
    let b_prime: DMatrix<f64> = y_bus.map(|y| -y.im);
    debug!("B' = {b_prime}");

    // A lone bus (or an empty network) leaves nothing to solve: the
    // reference angle is zero and there are no flows.
    if n <= 1 {
        return PowerFlowResult::Solved(PowerFlowSolution {
            theta: vec![0.0; n],
            flows: BTreeMap::new(),
        });
    }

    let reduced = b_prime.remove_row(REF_BUS).remove_column(REF_BUS);
    let p_reduced = model.injections().remove_row(REF_BUS);

    if reduced.iter().any(|v| !v.is_finite()) {
        error!("non-finite entries in reduced susceptance matrix");
        return PowerFlowResult::Failed {
            error: "Non-finite susceptance - check for zero-impedance branches".to_string(),
        };
    }

    let theta_reduced = match reduced.lu().solve(&p_reduced) {
        Some(solution) => solution,
        None => {
            error!("failed to solve DC power flow - singular matrix");
            return PowerFlowResult::Failed {
                error: "Singular matrix - check if the grid is connected".to_string(),
            };
        }
    };

    let mut theta = Vec::with_capacity(n);
    theta.push(0.0);
    theta.extend(theta_reduced.iter().copied());

    let mut flows = BTreeMap::new();
    for branch in model.branches() {
        if branch.kind != BranchKind::Line || !branch.energized {
            continue;
        }
        let flow = (theta[branch.from] - theta[branch.to]) / branch.x;
        debug!("flow on '{}': {flow}", branch.uid);
        flows.insert(branch.uid.clone(), flow);
    }

    PowerFlowResult::Solved(PowerFlowSolution { theta, flows })
}
