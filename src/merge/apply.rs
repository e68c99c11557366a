use serde_json::Value;

use super::partial::{LegalPartial, Patch};
use crate::coerce;
use crate::dossier::{Dossier, LegalRecord, RegistryFacts};

/// Coerced value of a supplied field; `None` when the field was not supplied
/// or its value could not be coerced.
fn supplied<T>(patch: &Patch<Value>, coerce: impl Fn(&Value) -> Option<T>) -> Option<T> {
    patch.as_present().and_then(coerce)
}

/// Text field: a supplied value always replaces the prior one, and a
/// supplied `null` or blank string clears it.
fn replaced_text(patch: &Patch<Value>, prior: Option<&str>) -> Option<String> {
    match patch {
        Patch::Present(value) => coerce::text(value),
        Patch::Absent => prior.map(str::to_string),
    }
}

/// Merge a sparse legal/tax update onto the current record.
///
/// Supplied fields overwrite, including `0`, `false` and, for text fields,
/// `null` (which clears them). Fields that were not supplied, and flags,
/// dates, counters or series whose value cannot be coerced (unknown flag
/// word, unparseable date, `null`), keep their prior value. This is not a full
/// replace: applying an older update after a newer one will still overwrite
/// whatever the older update supplies, so callers must apply updates in
/// arrival order against the latest record.
pub fn merge_legal_partial(current: &LegalRecord, partial: &LegalPartial) -> LegalRecord {
    let prior = &current.registry;

    let registry = RegistryFacts {
        status: replaced_text(&partial.status, prior.status.as_deref()),
        ghost_taxpayer: supplied(&partial.ghost_taxpayer, coerce::flag).or(prior.ghost_taxpayer),
        nonexistent_transactions: supplied(&partial.nonexistent_transactions, coerce::flag)
            .or(prior.nonexistent_transactions),
        accounting_obligation: supplied(&partial.accounting_obligation, coerce::flag)
            .or(prior.accounting_obligation),
        retention_agent: supplied(&partial.retention_agent, coerce::flag)
            .or(prior.retention_agent),
        special_taxpayer: supplied(&partial.special_taxpayer, coerce::flag)
            .or(prior.special_taxpayer),
        taxpayer_type: replaced_text(&partial.taxpayer_type, prior.taxpayer_type.as_deref()),
        tax_regime: replaced_text(&partial.tax_regime, prior.tax_regime.as_deref()),
        cessation_date: supplied(&partial.cessation_date, coerce::date).or(prior.cessation_date),
        reactivation_date: supplied(&partial.reactivation_date, coerce::date)
            .or(prior.reactivation_date),
    };

    let merged = LegalRecord {
        monthly_tax_liability: supplied(&partial.monthly_tax_liability, coerce::series)
            .unwrap_or_else(|| current.monthly_tax_liability.clone()),
        criminal_cases: supplied(&partial.criminal_cases, coerce::count)
            .unwrap_or(current.criminal_cases),
        labor_cases: supplied(&partial.labor_cases, coerce::count).unwrap_or(current.labor_cases),
        business_start: supplied(&partial.business_start, coerce::date).or(current.business_start),
        registry,
    };

    tracing::debug!(fields = ?partial.present_fields(), "legal partial merged");
    merged
}

impl Dossier {
    /// New dossier with `partial` merged into its legal record.
    pub fn with_legal_partial(&self, partial: &LegalPartial) -> Dossier {
        Dossier {
            legal: merge_legal_partial(&self.legal, partial),
            ..self.clone()
        }
    }
}
