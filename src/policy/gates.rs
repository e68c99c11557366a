use chrono::NaiveDate;
use serde::Serialize;

use crate::dossier::Dossier;
use crate::scoring::curves::{floored_ratio, months_since};
use crate::scoring::kpi::finite_or_null;
use crate::scoring::ScoringOptions;

/// Reactivation younger than this many months fails the policy.
pub const RECENT_REACTIVATION_MONTHS: f64 = 6.0;

/// The eight hard policy predicates. Absent registry facts pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GateChecks {
    pub cfo_positive: bool,
    pub dscr_ok: bool,
    pub dsr_ok: bool,
    pub no_criminal_cases: bool,
    pub registry_active: bool,
    pub no_ghost_taxpayer: bool,
    pub no_nonexistent_transactions: bool,
    pub no_recent_reactivation: bool,
}

impl GateChecks {
    pub fn as_list(&self) -> [(&'static str, bool); 8] {
        [
            ("cfo_positive", self.cfo_positive),
            ("dscr_ok", self.dscr_ok),
            ("dsr_ok", self.dsr_ok),
            ("no_criminal_cases", self.no_criminal_cases),
            ("registry_active", self.registry_active),
            ("no_ghost_taxpayer", self.no_ghost_taxpayer),
            ("no_nonexistent_transactions", self.no_nonexistent_transactions),
            ("no_recent_reactivation", self.no_recent_reactivation),
        ]
    }

    pub fn all(&self) -> bool {
        self.as_list().iter().all(|(_, ok)| *ok)
    }

    /// Names of the predicates that did not hold.
    pub fn failed(&self) -> Vec<&'static str> {
        self.as_list()
            .into_iter()
            .filter_map(|(name, ok)| (!ok).then_some(name))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateResult {
    pub pass: bool,
    /// Annual CFO over annual debt service; infinite with no debt service.
    #[serde(serialize_with = "finite_or_null")]
    pub dscr: f64,
    pub dsr_ratio: f64,
    pub cfo_annual: f64,
    pub checks: GateChecks,
}

impl GateResult {
    pub fn failed(&self) -> Vec<&'static str> {
        self.checks.failed()
    }
}

pub fn evaluate_gates(
    dossier: &Dossier,
    cfo_annual: f64,
    options: &ScoringOptions,
    as_of: NaiveDate,
) -> GateResult {
    let request = &dossier.request;
    let registry = &dossier.legal.registry;

    let monthly_service = request.monthly_debt_service();
    let annual_service = 12.0 * monthly_service;
    let dscr = if annual_service > 0.0 {
        cfo_annual / annual_service
    } else {
        f64::INFINITY
    };
    let dsr_ratio = floored_ratio(monthly_service, request.monthly_income);

    let checks = GateChecks {
        cfo_positive: cfo_annual > 0.0,
        dscr_ok: dscr >= options.requirements.dscr_min,
        dsr_ok: dsr_ratio <= options.requirements.dsr_max,
        no_criminal_cases: dossier.legal.criminal_cases == 0,
        registry_active: registry.is_active().unwrap_or(true),
        no_ghost_taxpayer: registry.ghost_taxpayer != Some(true),
        no_nonexistent_transactions: registry.nonexistent_transactions != Some(true),
        no_recent_reactivation: months_since(registry.reactivation_date, as_of)
            >= RECENT_REACTIVATION_MONTHS,
    };

    let result = GateResult {
        pass: checks.all(),
        dscr,
        dsr_ratio,
        cfo_annual,
        checks,
    };
    tracing::debug!(
        pass = result.pass,
        dscr = result.dscr,
        dsr = result.dsr_ratio,
        failed = ?result.failed(),
        "gates evaluated"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn run(dossier: &Dossier) -> GateResult {
        evaluate_gates(dossier, dossier.financial.operating_cash_flow, &ScoringOptions::default(), as_of())
    }

    #[test]
    fn test_demo_fails_dscr_only() {
        let result = run(&Dossier::demo(None));
        assert!(!result.pass);
        assert_eq!(result.failed(), vec!["dscr_ok"]);
        assert!((result.dsr_ratio - 4700.0 / 42000.0).abs() < 1e-12);
        assert!((result.dscr - 21000.0 / 56400.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_debt_service_is_infinite_dscr() {
        let mut dossier = Dossier::demo(None);
        dossier.request.existing_installments = 0.0;
        dossier.request.proposed_installment = None;
        let result = run(&dossier);
        assert!(result.dscr.is_infinite());
        assert!(result.checks.dscr_ok);
        assert!(result.pass);
    }

    #[test]
    fn test_non_positive_cfo_fails() {
        let mut dossier = Dossier::demo(None);
        dossier.financial.operating_cash_flow = 0.0;
        let result = run(&dossier);
        assert!(!result.checks.cfo_positive);
        assert!(!result.pass);
    }

    #[test]
    fn test_dsr_limit() {
        let mut dossier = Dossier::demo(None);
        dossier.request.monthly_income = 10_000.0;
        let result = run(&dossier);
        assert!(!result.checks.dsr_ok);
    }

    #[test]
    fn test_registry_flags() {
        let mut dossier = Dossier::demo(None);
        let result = run(&dossier);
        assert!(result.checks.registry_active);
        assert!(result.checks.no_ghost_taxpayer);
        assert!(result.checks.no_recent_reactivation);

        dossier.legal.registry.status = Some("SUSPENDIDO".into());
        dossier.legal.registry.ghost_taxpayer = Some(true);
        dossier.legal.registry.nonexistent_transactions = Some(false);
        dossier.legal.criminal_cases = 1;
        let checks = run(&dossier).checks;
        assert!(!checks.registry_active);
        assert!(!checks.no_ghost_taxpayer);
        assert!(checks.no_nonexistent_transactions);
        assert!(!checks.no_criminal_cases);
    }

    #[test]
    fn test_recent_reactivation() {
        let mut dossier = Dossier::demo(None);
        dossier.legal.registry.reactivation_date = NaiveDate::from_ymd_opt(2024, 12, 1);
        assert!(!run(&dossier).checks.no_recent_reactivation);

        dossier.legal.registry.reactivation_date = NaiveDate::from_ymd_opt(2024, 6, 1);
        assert!(run(&dossier).checks.no_recent_reactivation);
    }
}
