//! Physics feasibility checks for synthetic electrical-grid scenarios.
//!
//! The pipeline is a sequence of pure transformations: a scenario document
//! ([`scenario::Scenario`]) becomes a validated, indexed
//! [`network::NetworkModel`], from which the nodal admittance matrix is
//! built, a linearized (DC) power flow is solved, and operating limits are
//! checked into a [`validate::ValidationReport`]. No stage keeps state
//! across calls, so whole batches of scenarios run in parallel without
//! locking (see [`batch`]).

pub mod admittance;
pub mod batch;
pub mod dcflow;
pub mod network;
pub mod scenario;
pub mod validate;

pub use dcflow::{PowerFlowResult, PowerFlowSolution, solve_dc};
pub use network::{NetworkError, NetworkModel};
pub use scenario::{Scenario, ScenarioError};
pub use validate::{ValidationReport, validate_network, validate_scenario};
