pub mod aggregate;
pub mod config;
pub mod curves;
pub mod digital;
pub mod engine;
pub mod financial;
pub mod kpi;
pub mod legal;
pub mod validation;

pub use aggregate::{aggregate, Aggregate, CategorySummary};
pub use config::*;
pub use curves::Logistic;
pub use engine::{evaluate, CategoryGroup, Evaluation};
pub use kpi::{Category, Kpi, KpiKey};
pub use validation::validate_scoring;
