pub mod demo;
pub mod storage;
pub mod types;

pub use demo::DEMO_TAX_ID;
pub use storage::{load_dossier, load_partial, save_dossier};
pub use types::{Digital, Dossier, Financial, LegalRecord, LoanRequest, Period, RegistryFacts};
