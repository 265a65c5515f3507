use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed scenario document: {0}")]
    Json(#[from] serde_json::Error),
}

fn default_vm_lb() -> f64 {
    0.95
}

fn default_vm_ub() -> f64 {
    1.05
}

fn default_vm() -> f64 {
    1.0
}

/// Operating voltage of a bus. Missing fields fall back to a flat-start
/// profile (vm = 1.0 pu, va = 0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusStatus {
    #[serde(default = "default_vm")]
    pub vm: f64,
    #[serde(default)]
    pub va: f64,
}

impl Default for BusStatus {
    fn default() -> Self {
        Self { vm: 1.0, va: 0.0 }
    }
}

/// `network.bus` entry. Voltage bounds default to [0.95, 1.05] pu when the
/// document omits them; scenario sources are allowed to do so.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusRecord {
    pub uid: String,
    #[serde(default = "default_vm_lb")]
    pub vm_lb: f64,
    #[serde(default = "default_vm_ub")]
    pub vm_ub: f64,
    #[serde(default)]
    pub initial_status: BusStatus,
}

/// On/off state of a branch. `on_status` defaults to 0 (de-energized).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BranchStatus {
    #[serde(default)]
    pub on_status: u8,
}

/// `network.ac_line` or `network.two_winding_transformer` entry.
/// A missing `mva_ub_nom` means the branch is thermally unbounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchRecord {
    pub uid: String,
    pub fr_bus: String,
    pub to_bus: String,
    pub r: f64,
    pub x: f64,
    #[serde(default)]
    pub b: f64,
    #[serde(default)]
    pub mva_ub_nom: Option<f64>,
    #[serde(default)]
    pub initial_status: BranchStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Producer,
    Consumer,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceStatus {
    #[serde(default)]
    pub p: f64,
    #[serde(default)]
    pub q: f64,
}

/// `network.simple_dispatchable_device` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub uid: String,
    pub bus: String,
    pub device_type: DeviceType,
    #[serde(default)]
    pub initial_status: DeviceStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkSection {
    #[serde(default)]
    pub bus: Vec<BusRecord>,
    #[serde(default)]
    pub ac_line: Vec<BranchRecord>,
    #[serde(default)]
    pub two_winding_transformer: Vec<BranchRecord>,
    #[serde(default)]
    pub simple_dispatchable_device: Vec<DeviceRecord>,
}

/// A scenario document. Only the `network` section is interpreted here;
/// generator metadata, reserves and so on are ignored on input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub network: NetworkSection,
}

impl Scenario {
    pub fn from_json(text: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
