pub mod calibration;
pub mod capacity;
pub mod decision;
pub mod gates;

pub use calibration::{probability_of_default, Rating};
pub use capacity::{derive_amount, derive_capacity, AmountBreakdown, Capacity};
pub use decision::{resolve_decision, Decision};
pub use gates::{evaluate_gates, GateChecks, GateResult};
