//! Translators from upstream payloads: lookups into legal partial updates,
//! extracted statements into the financial record.
//! No I/O happens here; callers fetch and hand over the JSON.

pub mod identity;
pub mod judicial;
pub mod registry;
pub mod statements;

pub use identity::{identity_kind, lookup_candidates, paired_identity, IdentityKind};
pub use judicial::{
    classify_case, partial_from_cases, partial_from_identities, CaseCounts, CaseKind, CaseRecord,
};
pub use registry::partial_from_registry;
pub use statements::{dossier_from_statements, financial_from_statements, tax_id_from_statements};
