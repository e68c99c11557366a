use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A field of a sparse update: either not supplied at all, or supplied with
/// some raw value (which may itself be `null`, `false` or `0`).
///
/// Keeping this distinct from `Option` is what lets `{"criminal_cases": 0}`
/// mean "set to zero" while `{}` means "keep what we had".
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Patch<T> {
    #[default]
    Absent,
    Present(T),
}

impl<T> Patch<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Patch::Present(_))
    }

    pub fn is_absent(&self) -> bool {
        !self.is_present()
    }

    pub fn as_present(&self) -> Option<&T> {
        match self {
            Patch::Present(value) => Some(value),
            Patch::Absent => None,
        }
    }
}

impl Patch<Value> {
    /// Present with the given raw value.
    pub fn set(value: impl Into<Value>) -> Self {
        Patch::Present(value.into())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only reached when the key exists; missing keys take `Default`.
        T::deserialize(deserializer).map(Patch::Present)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Present(value) => value.serialize(serializer),
            Patch::Absent => serializer.serialize_none(),
        }
    }
}

/// Sparse legal/tax update produced by registry and judicial lookups.
///
/// Values are kept raw and coerced at merge time, so a malformed value can
/// fall back to the prior field instead of rejecting the whole update.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LegalPartial {
    #[serde(alias = "ivaPorPagarMensual", skip_serializing_if = "Patch::is_absent")]
    pub monthly_tax_liability: Patch<Value>,
    #[serde(alias = "procesosPenales", skip_serializing_if = "Patch::is_absent")]
    pub criminal_cases: Patch<Value>,
    #[serde(alias = "procesosLaborales", skip_serializing_if = "Patch::is_absent")]
    pub labor_cases: Patch<Value>,
    #[serde(alias = "fechaInicioActividades", skip_serializing_if = "Patch::is_absent")]
    pub business_start: Patch<Value>,
    #[serde(alias = "estadoRuc", skip_serializing_if = "Patch::is_absent")]
    pub status: Patch<Value>,
    #[serde(alias = "fantasma", skip_serializing_if = "Patch::is_absent")]
    pub ghost_taxpayer: Patch<Value>,
    #[serde(alias = "txInexistente", skip_serializing_if = "Patch::is_absent")]
    pub nonexistent_transactions: Patch<Value>,
    #[serde(alias = "obligadoContabilidad", skip_serializing_if = "Patch::is_absent")]
    pub accounting_obligation: Patch<Value>,
    #[serde(alias = "agenteRetencion", skip_serializing_if = "Patch::is_absent")]
    pub retention_agent: Patch<Value>,
    #[serde(alias = "contribuyenteEspecial", skip_serializing_if = "Patch::is_absent")]
    pub special_taxpayer: Patch<Value>,
    #[serde(alias = "tipoContribuyente", skip_serializing_if = "Patch::is_absent")]
    pub taxpayer_type: Patch<Value>,
    #[serde(alias = "regimen", skip_serializing_if = "Patch::is_absent")]
    pub tax_regime: Patch<Value>,
    #[serde(
        alias = "fechaCese",
        alias = "fechaCeseActividades",
        skip_serializing_if = "Patch::is_absent"
    )]
    pub cessation_date: Patch<Value>,
    #[serde(
        alias = "fechaReinicio",
        alias = "fechaReinicioActividades",
        skip_serializing_if = "Patch::is_absent"
    )]
    pub reactivation_date: Patch<Value>,
}

impl LegalPartial {
    /// Names of the supplied fields, in declaration order.
    pub fn present_fields(&self) -> Vec<&'static str> {
        [
            ("monthly_tax_liability", self.monthly_tax_liability.is_present()),
            ("criminal_cases", self.criminal_cases.is_present()),
            ("labor_cases", self.labor_cases.is_present()),
            ("business_start", self.business_start.is_present()),
            ("status", self.status.is_present()),
            ("ghost_taxpayer", self.ghost_taxpayer.is_present()),
            ("nonexistent_transactions", self.nonexistent_transactions.is_present()),
            ("accounting_obligation", self.accounting_obligation.is_present()),
            ("retention_agent", self.retention_agent.is_present()),
            ("special_taxpayer", self.special_taxpayer.is_present()),
            ("taxpayer_type", self.taxpayer_type.is_present()),
            ("tax_regime", self.tax_regime.is_present()),
            ("cessation_date", self.cessation_date.is_present()),
            ("reactivation_date", self.reactivation_date.is_present()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.present_fields().is_empty()
    }
}
