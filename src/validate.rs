use log::debug;
use serde::Serialize;

use crate::dcflow::{PowerFlowResult, solve_dc};
use crate::network::{NetworkError, NetworkModel};
use crate::scenario::Scenario;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViolationKind {
    #[serde(rename = "Low voltage")]
    LowVoltage,
    #[serde(rename = "High voltage")]
    HighVoltage,
    #[serde(rename = "Flow exceeds limit")]
    FlowExceedsLimit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoltageViolation {
    pub bus_id: String,
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    pub value: f64,
    pub limit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineViolation {
    pub line_id: String,
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    pub value: f64,
    pub limit: f64,
}

/// Immutable result of validating one scenario.
///
/// `is_valid` holds only when both violation lists are empty and the
/// underlying power-flow solve succeeded; a singular network can never
/// produce a valid report even with no explicit violations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub voltage_violations: Vec<VoltageViolation>,
    pub line_violations: Vec<LineViolation>,
    pub flow_results: PowerFlowResult,
}

/// Checks operating voltages and line flows of an indexed network against
/// their limits. Pure with respect to the model; safe to fan out across a
/// thread pool, one model per call.
pub fn validate_network(model: &NetworkModel) -> ValidationReport {
    let mut voltage_violations = Vec::new();
    for bus in model.buses() {
        // low before high; a bus records at most one violation per pass
        if bus.vm < bus.vm_lb {
            voltage_violations.push(VoltageViolation {
                bus_id: bus.uid.clone(),
                kind: ViolationKind::LowVoltage,
                value: bus.vm,
                limit: bus.vm_lb,
            });
        } else if bus.vm > bus.vm_ub {
            voltage_violations.push(VoltageViolation {
                bus_id: bus.uid.clone(),
                kind: ViolationKind::HighVoltage,
                value: bus.vm,
                limit: bus.vm_ub,
            });
        }
    }

    let flow_results = solve_dc(model);

    let mut line_violations = Vec::new();
    if let Some(solution) = flow_results.solution() {
        for branch in model.branches() {
            // only energized lines appear in the flow map; a branch absent
            // from it is skipped, not flagged
            let Some(flow) = solution.flows.get(&branch.uid) else {
                continue;
            };
            // missing limit means thermally unbounded
            let Some(limit) = branch.mva_limit else {
                continue;
            };
            let value = flow.abs();
            if value > limit {
                line_violations.push(LineViolation {
                    line_id: branch.uid.clone(),
                    kind: ViolationKind::FlowExceedsLimit,
                    value,
                    limit,
                });
            }
        }
    }

    let is_valid =
        voltage_violations.is_empty() && line_violations.is_empty() && flow_results.is_success();
    debug!(
        "validated network ({model}): valid={is_valid}, {} voltage / {} line violations",
        voltage_violations.len(),
        line_violations.len()
    );

    ValidationReport {
        is_valid,
        voltage_violations,
        line_violations,
        flow_results,
    }
}

/// Validates a raw scenario document end to end. Structural problems in the
/// document (unknown or duplicate references) surface as a hard error;
/// numerical failure of the solve is captured inside the report instead.
pub fn validate_scenario(scenario: &Scenario) -> Result<ValidationReport, NetworkError> {
    let model = NetworkModel::from_scenario(scenario)?;
    Ok(validate_network(&model))
}
