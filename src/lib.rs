pub mod coerce;
pub mod config;
pub mod dossier;
pub mod merge;
pub mod output;
pub mod policy;
pub mod scoring;
pub mod sources;
pub mod telemetry;

pub use dossier::Dossier;
pub use merge::{merge_legal_partial, LegalPartial};
pub use scoring::{evaluate, Evaluation, ScoringOptions};
