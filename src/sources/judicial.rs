use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coerce::lenient_text;
use crate::merge::{LegalPartial, Patch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseKind {
    Criminal,
    Labor,
    Other,
}

/// One judicial case as returned by the records lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    #[serde(
        default,
        alias = "materia",
        alias = "nombreMateria",
        deserialize_with = "lenient_text"
    )]
    pub subject: Option<String>,
    #[serde(default, alias = "delito", deserialize_with = "lenient_text")]
    pub offence: Option<String>,
}

impl CaseRecord {
    pub fn kind(&self) -> CaseKind {
        classify_case(self.subject.as_deref(), self.offence.as_deref())
    }
}

/// Classify by subject matter. A named offence is criminal whatever the
/// subject says.
pub fn classify_case(subject: Option<&str>, offence: Option<&str>) -> CaseKind {
    let subject = subject.unwrap_or_default().to_uppercase();
    let has_offence = offence.is_some_and(|o| !o.trim().is_empty());
    if subject.contains("PENAL") || has_offence {
        CaseKind::Criminal
    } else if subject.contains("LABORAL") || subject.contains("TRABAJO") {
        CaseKind::Labor
    } else {
        CaseKind::Other
    }
}

/// Criminal and labor counters for one identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseCounts {
    #[serde(alias = "penal", alias = "procesosPenales")]
    pub criminal: u32,
    #[serde(alias = "laboral", alias = "procesosLaborales")]
    pub labor: u32,
}

impl CaseCounts {
    pub fn from_cases(cases: &[CaseRecord]) -> Self {
        cases.iter().fold(CaseCounts::default(), |mut counts, case| {
            match case.kind() {
                CaseKind::Criminal => counts.criminal += 1,
                CaseKind::Labor => counts.labor += 1,
                CaseKind::Other => {}
            }
            counts
        })
    }

    /// Counter-wise maximum across identities (company plus legal
    /// representatives). Empty input counts as clean.
    pub fn max_of<'a>(identities: impl IntoIterator<Item = &'a CaseCounts>) -> Self {
        identities
            .into_iter()
            .fold(CaseCounts::default(), |acc, counts| CaseCounts {
                criminal: acc.criminal.max(counts.criminal),
                labor: acc.labor.max(counts.labor),
            })
    }

    /// Partial carrying both counters, zeros included.
    pub fn to_partial(self) -> LegalPartial {
        LegalPartial {
            criminal_cases: Patch::<Value>::set(self.criminal),
            labor_cases: Patch::<Value>::set(self.labor),
            ..Default::default()
        }
    }
}

pub fn partial_from_cases(cases: &[CaseRecord]) -> LegalPartial {
    let counts = CaseCounts::from_cases(cases);
    tracing::debug!(
        cases = cases.len(),
        criminal = counts.criminal,
        labor = counts.labor,
        "judicial cases counted"
    );
    counts.to_partial()
}

pub fn partial_from_identities(identities: &[CaseCounts]) -> LegalPartial {
    CaseCounts::max_of(identities).to_partial()
}
