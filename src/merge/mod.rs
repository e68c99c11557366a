pub mod apply;
pub mod partial;

pub use apply::merge_legal_partial;
pub use partial::{LegalPartial, Patch};
