use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::coerce::{
    lenient_date, lenient_f64, lenient_flag, lenient_opt_f64, lenient_series, lenient_string,
    lenient_text, lenient_u32,
};

/// Full input record for one evaluation, keyed by the business tax id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dossier {
    #[serde(default, alias = "ruc", deserialize_with = "lenient_string")]
    pub tax_id: String,
    #[serde(default, alias = "financiera")]
    pub financial: Financial,
    #[serde(default)]
    pub digital: Digital,
    #[serde(default, alias = "comercialLegal")]
    pub legal: LegalRecord,
    #[serde(default, alias = "decision")]
    pub request: LoanRequest,
}

/// How the operating cash flow figure was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[serde(alias = "mensual")]
    Monthly,
    #[default]
    #[serde(alias = "anual")]
    Annual,
}

impl Period {
    /// Either spelling, any case. Anything else is unknown.
    pub fn parse(s: &str) -> Option<Period> {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "mensual" => Some(Period::Monthly),
            "annual" | "anual" => Some(Period::Annual),
            _ => None,
        }
    }

    pub fn annualize(self, value: f64) -> f64 {
        match self {
            Period::Monthly => value * 12.0,
            Period::Annual => value,
        }
    }
}

/// Statement figures, all annual except where noted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Financial {
    #[serde(alias = "activosCorrientes", deserialize_with = "lenient_f64")]
    pub current_assets: f64,
    #[serde(alias = "pasivosCorrientes", deserialize_with = "lenient_f64")]
    pub current_liabilities: f64,
    #[serde(alias = "pasivosTotales", deserialize_with = "lenient_f64")]
    pub total_liabilities: f64,
    #[serde(alias = "activosTotales", deserialize_with = "lenient_f64")]
    pub total_assets: f64,
    #[serde(alias = "utilidadNeta", deserialize_with = "lenient_f64")]
    pub net_income: f64,
    #[serde(alias = "ventas", deserialize_with = "lenient_f64")]
    pub sales: f64,
    #[serde(alias = "costoVentas", deserialize_with = "lenient_f64")]
    pub cost_of_sales: f64,
    #[serde(alias = "inventarioPromedio", deserialize_with = "lenient_f64")]
    pub average_inventory: f64,
    /// Monthly or annual depending on `cash_flow_period` (or the options default).
    #[serde(alias = "flujoCajaOperativo", deserialize_with = "lenient_f64")]
    pub operating_cash_flow: f64,
    #[serde(
        alias = "periodoFinanciero",
        deserialize_with = "lenient_period",
        skip_serializing_if = "Option::is_none"
    )]
    pub cash_flow_period: Option<Period>,
}

/// Unknown period words fall back to the options default.
fn lenient_period<'de, D>(deserializer: D) -> Result<Option<Period>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(Period::parse))
}

/// Social and review signals. Always computable; absent values read as zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Digital {
    #[serde(alias = "estrellas", deserialize_with = "lenient_f64")]
    pub star_rating: f64,
    #[serde(alias = "reseñas", alias = "resenas", deserialize_with = "lenient_f64")]
    pub review_count: f64,
    #[serde(alias = "fans", deserialize_with = "lenient_f64")]
    pub follower_count: f64,
    /// -1.0 (negative) .. 1.0 (positive)
    #[serde(alias = "sentimiento", deserialize_with = "lenient_f64")]
    pub sentiment: f64,
}

/// Commercial and legal facts. Updated in place by partial merges.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LegalRecord {
    #[serde(alias = "ivaPorPagarMensual", deserialize_with = "lenient_series")]
    pub monthly_tax_liability: Vec<f64>,
    #[serde(alias = "procesosPenales", deserialize_with = "lenient_u32")]
    pub criminal_cases: u32,
    #[serde(alias = "procesosLaborales", deserialize_with = "lenient_u32")]
    pub labor_cases: u32,
    #[serde(
        alias = "fechaInicioActividades",
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub business_start: Option<NaiveDate>,
    #[serde(flatten)]
    pub registry: RegistryFacts,
}

/// Tax-registry overlay. Every fact stays `None` until a registry lookup
/// supplies it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryFacts {
    #[serde(
        alias = "estadoRuc",
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<String>,
    #[serde(
        alias = "fantasma",
        deserialize_with = "lenient_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub ghost_taxpayer: Option<bool>,
    #[serde(
        alias = "txInexistente",
        deserialize_with = "lenient_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub nonexistent_transactions: Option<bool>,
    #[serde(
        alias = "obligadoContabilidad",
        deserialize_with = "lenient_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub accounting_obligation: Option<bool>,
    #[serde(
        alias = "agenteRetencion",
        deserialize_with = "lenient_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub retention_agent: Option<bool>,
    #[serde(
        alias = "contribuyenteEspecial",
        deserialize_with = "lenient_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub special_taxpayer: Option<bool>,
    #[serde(
        alias = "tipoContribuyente",
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub taxpayer_type: Option<String>,
    #[serde(
        alias = "regimen",
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub tax_regime: Option<String>,
    #[serde(
        alias = "fechaCese",
        alias = "fechaCeseActividades",
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub cessation_date: Option<NaiveDate>,
    #[serde(
        alias = "fechaReinicio",
        alias = "fechaReinicioActividades",
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub reactivation_date: Option<NaiveDate>,
}

impl RegistryFacts {
    /// Registry status reads as active. Both the English and the registry's
    /// Spanish spelling are accepted.
    pub fn is_active(&self) -> Option<bool> {
        self.status.as_deref().map(is_active_status)
    }
}

pub(crate) fn is_active_status(status: &str) -> bool {
    let s = status.trim();
    s.eq_ignore_ascii_case("ACTIVE") || s.eq_ignore_ascii_case("ACTIVO")
}

/// Loan request and household cash figures, monthly.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanRequest {
    #[serde(alias = "ingresosMensuales", deserialize_with = "lenient_f64")]
    pub monthly_income: f64,
    #[serde(alias = "egresosMensuales", deserialize_with = "lenient_f64")]
    pub monthly_expenses: f64,
    #[serde(alias = "cuotasVigentes", deserialize_with = "lenient_f64")]
    pub existing_installments: f64,
    #[serde(alias = "tasaMensual", deserialize_with = "lenient_f64")]
    pub monthly_rate: f64,
    #[serde(alias = "nMeses", deserialize_with = "lenient_u32")]
    pub periods: u32,
    #[serde(
        alias = "pmtPropuesta",
        deserialize_with = "lenient_opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub proposed_installment: Option<f64>,
}

impl LoanRequest {
    /// Existing plus proposed monthly debt service.
    pub fn monthly_debt_service(&self) -> f64 {
        self.existing_installments + self.proposed_installment.unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_period_annualize() {
        assert_eq!(Period::Monthly.annualize(1000.0), 12000.0);
        assert_eq!(Period::Annual.annualize(1000.0), 1000.0);
    }

    #[test]
    fn test_parse_upstream_field_names() {
        let raw = json!({
            "ruc": "1790012345001",
            "financiera": {
                "activosCorrientes": 120000,
                "pasivosCorrientes": "60000",
                "flujoCajaOperativo": 1750,
                "periodoFinanciero": "mensual"
            },
            "digital": { "estrellas": 4.3, "reseñas": 156 },
            "comercialLegal": {
                "ivaPorPagarMensual": [1200, "oops", 1180],
                "procesosPenales": 0,
                "procesosLaborales": 1,
                "fechaInicioActividades": "2016-05-10",
                "estadoRuc": "ACTIVO",
                "fantasma": "NO"
            },
            "decision": { "ingresosMensuales": 42000, "nMeses": 24, "pmtPropuesta": 1200 }
        });
        let dossier: Dossier = serde_json::from_value(raw).unwrap();
        assert_eq!(dossier.tax_id, "1790012345001");
        assert_eq!(dossier.financial.current_liabilities, 60000.0);
        assert_eq!(dossier.financial.cash_flow_period, Some(Period::Monthly));
        assert_eq!(dossier.digital.review_count, 156.0);
        assert_eq!(dossier.legal.monthly_tax_liability.len(), 3);
        assert!(dossier.legal.monthly_tax_liability[1].is_nan());
        assert_eq!(dossier.legal.labor_cases, 1);
        assert_eq!(
            dossier.legal.business_start,
            NaiveDate::from_ymd_opt(2016, 5, 10)
        );
        assert_eq!(dossier.legal.registry.status.as_deref(), Some("ACTIVO"));
        assert_eq!(dossier.legal.registry.ghost_taxpayer, Some(false));
        assert_eq!(dossier.request.periods, 24);
        assert_eq!(dossier.request.proposed_installment, Some(1200.0));
    }

    #[test]
    fn test_malformed_values_degrade_instead_of_failing() {
        let raw = json!({
            "tax_id": "x",
            "financial": { "sales": "lots", "net_income": null },
            "legal": { "business_start": "sometime", "criminal_cases": -3 }
        });
        let dossier: Dossier = serde_json::from_value(raw).unwrap();
        assert_eq!(dossier.financial.sales, 0.0);
        assert_eq!(dossier.financial.net_income, 0.0);
        assert_eq!(dossier.legal.business_start, None);
        assert_eq!(dossier.legal.criminal_cases, 0);
    }

    #[test]
    fn test_numeric_tax_id_rendered_as_text() {
        let dossier: Dossier = serde_json::from_value(json!({ "ruc": 1790012345001u64 })).unwrap();
        assert_eq!(dossier.tax_id, "1790012345001");

        let dossier: Dossier = serde_json::from_value(json!({ "ruc": null })).unwrap();
        assert_eq!(dossier.tax_id, "");
    }

    #[test]
    fn test_unknown_period_falls_back_to_none() {
        let dossier: Dossier = serde_json::from_value(json!({
            "financiera": { "periodoFinanciero": "trimestral", "ventas": 1000 }
        }))
        .unwrap();
        assert_eq!(dossier.financial.cash_flow_period, None);
        assert_eq!(dossier.financial.sales, 1000.0);

        let dossier: Dossier = serde_json::from_value(json!({
            "financial": { "cash_flow_period": " Monthly " }
        }))
        .unwrap();
        assert_eq!(dossier.financial.cash_flow_period, Some(Period::Monthly));
    }

    #[test]
    fn test_period_survives_save_and_load() {
        let mut dossier = Dossier::default();
        dossier.financial.cash_flow_period = Some(Period::Monthly);
        let text = serde_json::to_string(&dossier).unwrap();
        let back: Dossier = serde_json::from_str(&text).unwrap();
        assert_eq!(back.financial.cash_flow_period, Some(Period::Monthly));
    }

    #[test]
    fn test_registry_absent_until_supplied() {
        let dossier: Dossier = serde_json::from_value(json!({ "tax_id": "x" })).unwrap();
        assert_eq!(dossier.legal.registry, RegistryFacts::default());
        assert_eq!(dossier.legal.registry.is_active(), None);
    }

    #[test]
    fn test_active_status_spellings() {
        assert!(is_active_status("active"));
        assert!(is_active_status(" ACTIVO "));
        assert!(!is_active_status("SUSPENDIDO"));
        assert!(!is_active_status("INACTIVE"));
    }

    #[test]
    fn test_monthly_debt_service() {
        let request = LoanRequest {
            existing_installments: 3500.0,
            proposed_installment: Some(1200.0),
            ..Default::default()
        };
        assert_eq!(request.monthly_debt_service(), 4700.0);
        let request = LoanRequest {
            existing_installments: 3500.0,
            ..Default::default()
        };
        assert_eq!(request.monthly_debt_service(), 3500.0);
    }
}
