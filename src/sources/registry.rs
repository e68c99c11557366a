use serde_json::Value;

use crate::coerce;
use crate::merge::{LegalPartial, Patch};

/// First of `keys` holding a usable date, as a raw value for the partial.
fn first_date(record: &Value, keys: &[(&str, Option<&str>)]) -> Option<Value> {
    keys.iter().find_map(|(key, nested)| {
        let value = match nested {
            Some(inner) => record.get(key)?.get(inner)?,
            None => record.get(key)?,
        };
        coerce::date(value).map(|_| value.clone())
    })
}

/// Text field as reported; a reported `null` still clears the prior value.
fn present(record: &Value, key: &str) -> Patch<Value> {
    record.get(key).cloned().map(Patch::Present).unwrap_or_default()
}

/// Translate a tax-registry taxpayer record into a legal partial update.
///
/// Accepts either the bare record or the lookup envelope
/// `{ "ruc": ..., "existe": ..., "data": { ... } }`. Ghost-taxpayer and
/// nonexistent-transaction flags default to `false` when the registry
/// omits them; the other flags are only supplied when the registry has a
/// readable answer. Judicial counters are never touched.
pub fn partial_from_registry(response: &Value) -> LegalPartial {
    let record = match response.get("data") {
        Some(data) if data.is_object() => data,
        _ => response,
    };

    let blacklist_flag = |key: &str| {
        let flagged = record.get(key).and_then(coerce::flag).unwrap_or(false);
        Patch::Present(Value::Bool(flagged))
    };
    let optional_flag = |value: Option<&Value>| match value.and_then(coerce::flag) {
        Some(flag) => Patch::Present(Value::Bool(flag)),
        None => Patch::Absent,
    };

    let accounting = match record.get("obligadoBool") {
        Some(Value::Bool(flag)) => Patch::Present(Value::Bool(*flag)),
        _ => optional_flag(record.get("obligadoLlevarContabilidad")),
    };

    const DATES: &str = "informacionFechasContribuyente";
    // A reactivation restarts the activity clock.
    let business_start = first_date(
        record,
        &[
            ("fechaInicioISO", None),
            (DATES, Some("fechaReinicioActividades")),
            (DATES, Some("fechaInicioActividades")),
        ],
    );
    let cessation = first_date(record, &[(DATES, Some("fechaCeseActividades"))]);
    let reactivation = first_date(record, &[(DATES, Some("fechaReinicioActividades"))]);

    let to_patch = |value: Option<Value>| value.map(Patch::Present).unwrap_or_default();

    let partial = LegalPartial {
        business_start: to_patch(business_start),
        status: present(record, "estadoContribuyenteRuc"),
        ghost_taxpayer: blacklist_flag("contribuyenteFantasma"),
        nonexistent_transactions: blacklist_flag("transaccionesInexistente"),
        accounting_obligation: accounting,
        retention_agent: optional_flag(record.get("agenteRetencion")),
        special_taxpayer: optional_flag(record.get("contribuyenteEspecial")),
        taxpayer_type: present(record, "tipoContribuyente"),
        tax_regime: present(record, "regimen"),
        cessation_date: to_patch(cessation),
        reactivation_date: to_patch(reactivation),
        ..Default::default()
    };
    tracing::debug!(fields = ?partial.present_fields(), "registry record translated");
    partial
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dossier::LegalRecord;
    use crate::merge::merge_legal_partial;
    use chrono::NaiveDate;
    use serde_json::json;

    fn envelope() -> Value {
        json!({
            "ruc": "1790012345001",
            "existe": true,
            "data": {
                "estadoContribuyenteRuc": "ACTIVO",
                "contribuyenteFantasma": "NO",
                "obligadoLlevarContabilidad": "SI",
                "agenteRetencion": "NO",
                "contribuyenteEspecial": "",
                "tipoContribuyente": "SOCIEDAD",
                "regimen": "GENERAL",
                "informacionFechasContribuyente": {
                    "fechaInicioActividades": "2016-05-10 00:00:00.0",
                    "fechaCeseActividades": "",
                    "fechaReinicioActividades": null
                }
            }
        })
    }

    #[test]
    fn test_envelope_translated() {
        let partial = partial_from_registry(&envelope());
        assert_eq!(partial.status, Patch::<Value>::set("ACTIVO"));
        assert_eq!(partial.ghost_taxpayer, Patch::<Value>::set(false));
        assert_eq!(partial.nonexistent_transactions, Patch::<Value>::set(false));
        assert_eq!(partial.accounting_obligation, Patch::<Value>::set(true));
        assert_eq!(partial.retention_agent, Patch::<Value>::set(false));
        assert!(partial.special_taxpayer.is_absent());
        assert_eq!(partial.tax_regime, Patch::<Value>::set("GENERAL"));
        assert!(partial.cessation_date.is_absent());
        assert!(partial.reactivation_date.is_absent());
        assert!(partial.criminal_cases.is_absent());
        assert!(partial.labor_cases.is_absent());
    }

    #[test]
    fn test_bare_record_and_bool_obligation() {
        let partial = partial_from_registry(&json!({
            "estadoContribuyenteRuc": "SUSPENDIDO",
            "obligadoBool": false,
            "obligadoLlevarContabilidad": "SI",
            "transaccionesInexistente": "SI"
        }));
        assert_eq!(partial.status, Patch::<Value>::set("SUSPENDIDO"));
        assert_eq!(partial.accounting_obligation, Patch::<Value>::set(false));
        assert_eq!(partial.nonexistent_transactions, Patch::<Value>::set(true));
        assert!(partial.tax_regime.is_absent());
        assert!(partial.business_start.is_absent());
    }

    #[test]
    fn test_reactivation_restarts_business_start() {
        let partial = partial_from_registry(&json!({
            "informacionFechasContribuyente": {
                "fechaInicioActividades": "2010-01-01",
                "fechaCeseActividades": "2019-03-01",
                "fechaReinicioActividades": "2021-07-15"
            }
        }));
        let merged = merge_legal_partial(&LegalRecord::default(), &partial);
        assert_eq!(merged.business_start, NaiveDate::from_ymd_opt(2021, 7, 15));
        assert_eq!(merged.registry.cessation_date, NaiveDate::from_ymd_opt(2019, 3, 1));
        assert_eq!(merged.registry.reactivation_date, NaiveDate::from_ymd_opt(2021, 7, 15));
    }

    #[test]
    fn test_reported_null_status_clears_stale_value() {
        let current = LegalRecord {
            registry: crate::dossier::RegistryFacts {
                status: Some("SUSPENDIDO".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let partial = partial_from_registry(&json!({ "estadoContribuyenteRuc": null }));
        assert_eq!(partial.status, Patch::Present(Value::Null));
        assert!(partial.tax_regime.is_absent());

        let merged = merge_legal_partial(&current, &partial);
        assert_eq!(merged.registry.status, None);
        assert_eq!(merged.registry.is_active(), None);
    }

    #[test]
    fn test_iso_start_preferred() {
        let partial = partial_from_registry(&json!({
            "fechaInicioISO": "2015-02-02",
            "informacionFechasContribuyente": { "fechaInicioActividades": "2010-01-01" }
        }));
        assert_eq!(partial.business_start, Patch::<Value>::set("2015-02-02"));
    }

    #[test]
    fn test_merge_into_record_keeps_judicial_counts() {
        let current = LegalRecord {
            criminal_cases: 1,
            labor_cases: 2,
            ..Default::default()
        };
        let merged = merge_legal_partial(&current, &partial_from_registry(&envelope()));
        assert_eq!(merged.criminal_cases, 1);
        assert_eq!(merged.labor_cases, 2);
        assert_eq!(merged.registry.is_active(), Some(true));
        assert_eq!(merged.business_start, NaiveDate::from_ymd_opt(2016, 5, 10));
    }
}
