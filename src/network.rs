use std::collections::HashMap;
use std::fmt;

use log::debug;
use nalgebra::DVector;
use serde::Serialize;
use thiserror::Error;

use crate::scenario::{BranchRecord, DeviceType, Scenario};

/// Structural problems in a scenario document. All of these abort validation
/// before any numerics run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("duplicate bus uid '{0}'")]
    DuplicateBus(String),
    #[error("branch '{branch}' references unknown bus '{bus}'")]
    UnknownEndpoint { branch: String, bus: String },
    #[error("branch '{0}' connects a bus to itself")]
    SelfLoop(String),
    #[error("device '{device}' references unknown bus '{bus}'")]
    UnknownDeviceBus { device: String, bus: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bus {
    pub uid: String,
    pub vm_lb: f64,
    pub vm_ub: f64,
    pub vm: f64,
    pub va: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BranchKind {
    Line,
    Transformer,
}

impl fmt::Display for BranchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchKind::Line => write!(f, "line"),
            BranchKind::Transformer => write!(f, "transformer"),
        }
    }
}

/// A branch with its endpoints resolved to dense bus indices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Branch {
    pub uid: String,
    pub kind: BranchKind,
    pub from: usize,
    pub to: usize,
    pub r: f64,
    pub x: f64,
    pub b: f64,
    pub mva_limit: Option<f64>,
    pub energized: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Device {
    pub uid: String,
    pub bus: usize,
    pub kind: DeviceType,
    pub p: f64,
    pub q: f64,
}

/// Validated, indexed form of a scenario's network section.
///
/// Buses keep their input order; the dense index of a bus is its position in
/// that order, and index 0 is the angle reference. Construction via
/// [`NetworkModel::from_scenario`] is the only way to obtain one, so every
/// branch endpoint and device bus is known to resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkModel {
    buses: Vec<Bus>,
    branches: Vec<Branch>,
    devices: Vec<Device>,
    index: HashMap<String, usize>,
}

impl NetworkModel {
    pub fn from_scenario(scenario: &Scenario) -> Result<Self, NetworkError> {
        let net = &scenario.network;

        let mut index = HashMap::with_capacity(net.bus.len());
        let mut buses = Vec::with_capacity(net.bus.len());
        for record in &net.bus {
            if index.insert(record.uid.clone(), buses.len()).is_some() {
                return Err(NetworkError::DuplicateBus(record.uid.clone()));
            }
            buses.push(Bus {
                uid: record.uid.clone(),
                vm_lb: record.vm_lb,
                vm_ub: record.vm_ub,
                vm: record.initial_status.vm,
                va: record.initial_status.va,
            });
        }

        let mut branches = Vec::with_capacity(net.ac_line.len() + net.two_winding_transformer.len());
        for record in &net.ac_line {
            branches.push(resolve_branch(record, BranchKind::Line, &index)?);
        }
        for record in &net.two_winding_transformer {
            branches.push(resolve_branch(record, BranchKind::Transformer, &index)?);
        }

        let mut devices = Vec::with_capacity(net.simple_dispatchable_device.len());
        for record in &net.simple_dispatchable_device {
            let bus = *index
                .get(&record.bus)
                .ok_or_else(|| NetworkError::UnknownDeviceBus {
                    device: record.uid.clone(),
                    bus: record.bus.clone(),
                })?;
            devices.push(Device {
                uid: record.uid.clone(),
                bus,
                kind: record.device_type,
                p: record.initial_status.p,
                q: record.initial_status.q,
            });
        }

        debug!(
            "indexed network: {} buses, {} branches, {} devices",
            buses.len(),
            branches.len(),
            devices.len()
        );

        Ok(Self {
            buses,
            branches,
            devices,
            index,
        })
    }

    pub fn bus_count(&self) -> usize {
        self.buses.len()
    }

    pub fn buses(&self) -> &[Bus] {
        &self.buses
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Dense index of a bus uid, if present.
    pub fn bus_index(&self, uid: &str) -> Option<usize> {
        self.index.get(uid).copied()
    }

    /// Real power injection per bus: producers add their operating point,
    /// consumers subtract it (generation positive, load negative).
    pub fn injections(&self) -> DVector<f64> {
        let mut p = DVector::zeros(self.buses.len());
        for device in &self.devices {
            match device.kind {
                DeviceType::Producer => p[device.bus] += device.p,
                DeviceType::Consumer => p[device.bus] -= device.p,
            }
        }
        p
    }
}

impl fmt::Display for NetworkModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} buses, {} branches, {} devices",
            self.buses.len(),
            self.branches.len(),
            self.devices.len()
        )
    }
}

fn resolve_branch(
    record: &BranchRecord,
    kind: BranchKind,
    index: &HashMap<String, usize>,
) -> Result<Branch, NetworkError> {
    if record.fr_bus == record.to_bus {
        return Err(NetworkError::SelfLoop(record.uid.clone()));
    }
    let endpoint = |bus: &String| {
        index
            .get(bus)
            .copied()
            .ok_or_else(|| NetworkError::UnknownEndpoint {
                branch: record.uid.clone(),
                bus: bus.clone(),
            })
    };
    Ok(Branch {
        uid: record.uid.clone(),
        kind,
        from: endpoint(&record.fr_bus)?,
        to: endpoint(&record.to_bus)?,
        r: record.r,
        x: record.x,
        b: record.b,
        mva_limit: record.mva_ub_nom,
        energized: record.initial_status.on_status == 1,
    })
}
