//! End-to-end validation of scenario documents, from raw JSON to report.

use gridcheck::dcflow::PowerFlowResult;
use gridcheck::scenario::Scenario;
use gridcheck::validate::validate_scenario;

const TWO_BUS_TRANSFER: &str = r#"{
    "network": {
        "bus": [
            {"uid": "bus0", "vm_lb": 0.95, "vm_ub": 1.05, "initial_status": {"vm": 1.0, "va": 0.0}},
            {"uid": "bus1", "vm_lb": 0.95, "vm_ub": 1.05, "initial_status": {"vm": 1.0, "va": 0.0}}
        ],
        "ac_line": [
            {"uid": "line0", "fr_bus": "bus0", "to_bus": "bus1",
             "r": 0.0, "x": 0.1, "b": 0.0, "initial_status": {"on_status": 1}}
        ],
        "two_winding_transformer": [],
        "simple_dispatchable_device": [
            {"uid": "gen0", "bus": "bus0", "device_type": "producer", "initial_status": {"p": 1.0, "q": 0.0}},
            {"uid": "load0", "bus": "bus1", "device_type": "consumer", "initial_status": {"p": 1.0, "q": 0.0}}
        ]
    }
}"#;

#[test]
fn two_bus_transfer_is_valid() {
    let scenario = Scenario::from_json(TWO_BUS_TRANSFER).unwrap();
    let report = validate_scenario(&scenario).unwrap();

    assert!(report.is_valid);
    let solution = report.flow_results.solution().expect("solve succeeds");
    assert_eq!(solution.theta[0], 0.0);
    assert!((solution.theta[1] - (-0.1)).abs() < 1e-9);
    assert!((solution.flows["line0"] - 1.0).abs() < 1e-9);
}

#[test]
fn tight_line_limit_invalidates_the_same_topology() {
    let mut scenario = Scenario::from_json(TWO_BUS_TRANSFER).unwrap();
    scenario.network.ac_line[0].mva_ub_nom = Some(0.5);
    let report = validate_scenario(&scenario).unwrap();

    assert!(!report.is_valid);
    assert_eq!(report.line_violations.len(), 1);
    let violation = &report.line_violations[0];
    assert_eq!(violation.line_id, "line0");
    assert!((violation.value - 1.0).abs() < 1e-9);
    assert_eq!(violation.limit, 0.5);
}

#[test]
fn undervoltage_bus_invalidates_the_scenario() {
    let mut scenario = Scenario::from_json(TWO_BUS_TRANSFER).unwrap();
    scenario.network.bus[1].initial_status.vm = 0.90;
    let report = validate_scenario(&scenario).unwrap();

    assert!(!report.is_valid);
    assert_eq!(report.voltage_violations.len(), 1);
    let violation = &report.voltage_violations[0];
    assert_eq!(violation.bus_id, "bus1");
    assert_eq!(violation.value, 0.90);
    assert_eq!(violation.limit, 0.95);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(
        json["voltage_violations"][0]["type"],
        serde_json::json!("Low voltage")
    );
}

#[test]
fn isolated_reference_bus_reports_singular_network() {
    let scenario = Scenario::from_json(
        r#"{
            "network": {
                "bus": [{"uid": "ref"}, {"uid": "a"}, {"uid": "b"}],
                "ac_line": [
                    {"uid": "island", "fr_bus": "a", "to_bus": "b",
                     "r": 0.0, "x": 0.1, "initial_status": {"on_status": 1}}
                ]
            }
        }"#,
    )
    .unwrap();
    let report = validate_scenario(&scenario).unwrap();

    assert!(!report.is_valid);
    match &report.flow_results {
        PowerFlowResult::Failed { error } => assert!(error.contains("Singular")),
        PowerFlowResult::Solved(_) => panic!("isolated reference must not solve"),
    }
    // no flows were computed, so no line can be flagged
    assert!(report.line_violations.is_empty());
}

#[test]
fn single_bus_scenario_is_trivially_valid() {
    let scenario =
        Scenario::from_json(r#"{"network": {"bus": [{"uid": "solo"}]}}"#).unwrap();
    let report = validate_scenario(&scenario).unwrap();

    assert!(report.is_valid);
    let solution = report.flow_results.solution().unwrap();
    assert_eq!(solution.theta, vec![0.0]);
    assert!(solution.flows.is_empty());
}

#[test]
fn repeated_validation_is_byte_identical() {
    let scenario = Scenario::from_json(TWO_BUS_TRANSFER).unwrap();
    let first = serde_json::to_string(&validate_scenario(&scenario).unwrap()).unwrap();
    let second = serde_json::to_string(&validate_scenario(&scenario).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn meshed_network_with_transformer_solves() {
    // three buses in a ring: two lines plus a transformer closing the loop
    let scenario = Scenario::from_json(
        r#"{
            "network": {
                "bus": [{"uid": "b0"}, {"uid": "b1"}, {"uid": "b2"}],
                "ac_line": [
                    {"uid": "l01", "fr_bus": "b0", "to_bus": "b1",
                     "r": 0.01, "x": 0.1, "b": 0.02, "mva_ub_nom": 5.0, "initial_status": {"on_status": 1}},
                    {"uid": "l12", "fr_bus": "b1", "to_bus": "b2",
                     "r": 0.01, "x": 0.1, "b": 0.02, "mva_ub_nom": 5.0, "initial_status": {"on_status": 1}}
                ],
                "two_winding_transformer": [
                    {"uid": "t20", "fr_bus": "b2", "to_bus": "b0",
                     "r": 0.005, "x": 0.05, "initial_status": {"on_status": 1}}
                ],
                "simple_dispatchable_device": [
                    {"uid": "g0", "bus": "b0", "device_type": "producer", "initial_status": {"p": 2.0}},
                    {"uid": "d1", "bus": "b1", "device_type": "consumer", "initial_status": {"p": 1.0}},
                    {"uid": "d2", "bus": "b2", "device_type": "consumer", "initial_status": {"p": 1.0}}
                ]
            }
        }"#,
    )
    .unwrap();
    let report = validate_scenario(&scenario).unwrap();

    assert!(report.is_valid);
    let solution = report.flow_results.solution().unwrap();
    assert_eq!(solution.theta.len(), 3);
    assert_eq!(solution.theta[0], 0.0);
    // only the two lines report flows; the transformer does not
    assert_eq!(solution.flows.len(), 2);
    assert!(solution.flows.contains_key("l01"));
    assert!(solution.flows.contains_key("l12"));
}
