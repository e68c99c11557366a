use chrono::NaiveDate;

use super::curves::{clamp_score, map_linear, map_linear_inv, mean, months_since, std_dev, years_between};
use super::kpi::{Kpi, KpiKey};
use crate::coerce::SERIES_WINDOW;
use crate::dossier::{Dossier, RegistryFacts};

const MIN_SERIES_POINTS: usize = 6;
const MIN_SERIES_MEAN: f64 = 100.0;
const CV_GOOD: f64 = 0.05;
const CV_BAD: f64 = 0.30;
const MAX_AGE_YEARS: f64 = 10.0;

/// Coefficient of variation of the usable part of the last twelve months.
/// `None` when the series is too short or too small to say anything.
pub fn filing_variability(series: &[f64]) -> Option<f64> {
    let window = &series[series.len().saturating_sub(SERIES_WINDOW)..];
    let usable: Vec<f64> = window
        .iter()
        .copied()
        .filter(|x| x.is_finite() && *x >= 0.0)
        .collect();
    let mu = mean(&usable);
    if usable.len() < MIN_SERIES_POINTS || mu < MIN_SERIES_MEAN {
        return None;
    }
    let cv = std_dev(&usable) / mu.abs();
    cv.is_finite().then_some(cv)
}

/// Registry tax regime score. Absent regime is `None`.
pub fn regime_score(regime: Option<&str>) -> Option<f64> {
    let regime = regime.map(str::trim).filter(|r| !r.is_empty())?;
    let upper = regime.to_uppercase();
    Some(if upper == "GENERAL" {
        100.0
    } else if upper.contains("RIMPE") {
        85.0
    } else {
        75.0
    })
}

fn formality_points(registry: &RegistryFacts) -> f64 {
    let positives = [
        registry.accounting_obligation,
        registry.retention_agent,
        registry.special_taxpayer,
    ]
    .iter()
    .filter(|flag| **flag == Some(true))
    .count();
    let negatives = [registry.ghost_taxpayer, registry.nonexistent_transactions]
        .iter()
        .filter(|flag| **flag == Some(true))
        .count();
    15.0 * positives as f64 - 40.0 * negatives as f64
}

fn stability_kpi(registry: &RegistryFacts, as_of: NaiveDate) -> Kpi {
    let months = registry
        .reactivation_date
        .map(|date| months_since(Some(date), as_of))
        .unwrap_or(f64::NAN);

    if registry.cessation_date.is_none() {
        return Kpi::scored(KpiKey::OperationalStability, months, 100.0);
    }
    if months.is_finite() {
        Kpi::scored(
            KpiKey::OperationalStability,
            months,
            map_linear(months, 6.0, 24.0),
        )
    } else {
        Kpi::missing(KpiKey::OperationalStability, f64::NAN)
    }
}

pub fn legal_kpis(dossier: &Dossier, as_of: NaiveDate) -> Vec<Kpi> {
    let legal = &dossier.legal;
    let registry = &legal.registry;

    let consistency = match filing_variability(&legal.monthly_tax_liability) {
        Some(cv) => Kpi::scored(
            KpiKey::FilingConsistency,
            cv,
            map_linear_inv(cv, CV_GOOD, CV_BAD),
        ),
        None => Kpi::missing(KpiKey::FilingConsistency, f64::NAN),
    };

    let penalty = 30.0 * legal.criminal_cases as f64 + 15.0 * legal.labor_cases as f64;
    let delinquency = Kpi::scored(KpiKey::LegalDelinquency, penalty, (100.0 - penalty).max(0.0));

    let age = match legal.business_start {
        Some(start) => {
            let years = years_between(start, as_of);
            Kpi::scored(
                KpiKey::BusinessAge,
                years,
                clamp_score(years.min(MAX_AGE_YEARS) / MAX_AGE_YEARS * 100.0),
            )
        }
        None => Kpi::missing(KpiKey::BusinessAge, f64::NAN),
    };

    let status = match registry.is_active() {
        Some(true) => Kpi::scored(KpiKey::RegistryStatus, 100.0, 100.0),
        Some(false) => Kpi::scored(KpiKey::RegistryStatus, 10.0, 10.0),
        None => Kpi::missing(KpiKey::RegistryStatus, f64::NAN),
    };

    let points = formality_points(registry);
    let formality = Kpi::scored(KpiKey::Formality, points, points);

    let regime = match regime_score(registry.tax_regime.as_deref()) {
        Some(score) => Kpi::scored(KpiKey::TaxRegime, score, score),
        None => Kpi::missing(KpiKey::TaxRegime, f64::NAN),
    };

    vec![
        consistency,
        delinquency,
        age,
        status,
        formality,
        stability_kpi(registry, as_of),
        regime,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn find(kpis: &[Kpi], key: KpiKey) -> Kpi {
        kpis.iter().find(|k| k.key == key).cloned().unwrap()
    }

    #[test]
    fn test_filing_variability_rules() {
        assert!(filing_variability(&[1000.0; 5]).is_none());
        assert!(filing_variability(&[50.0; 12]).is_none());
        assert_eq!(filing_variability(&[1000.0; 12]), Some(0.0));

        let mut with_gaps = vec![1000.0; 8];
        with_gaps.extend([f64::NAN, -5.0, f64::NAN, f64::NAN]);
        assert_eq!(filing_variability(&with_gaps), Some(0.0));
    }

    #[test]
    fn test_filing_variability_uses_last_twelve() {
        let mut series = vec![0.0; 6];
        series.extend(vec![1000.0; 12]);
        assert_eq!(filing_variability(&series), Some(0.0));
    }

    #[test]
    fn test_filing_window_taken_before_filtering() {
        // Twelve trailing months with only five usable points
        let mut series = vec![1000.0; 10];
        series.extend(vec![f64::NAN; 7]);
        series.extend(vec![1000.0; 5]);
        assert_eq!(series.len(), 22);
        assert!(filing_variability(&series).is_none());
        assert_eq!(filing_variability(&series[..12]), Some(0.0));
    }

    #[test]
    fn test_consistency_score() {
        let dossier = Dossier::demo(None);
        let kpis = legal_kpis(&dossier, as_of());
        let consistency = find(&kpis, KpiKey::FilingConsistency);
        assert!(!consistency.missing);
        assert_eq!(consistency.score, 100.0);

        let mut erratic = dossier.clone();
        erratic.legal.monthly_tax_liability =
            vec![200.0, 2000.0, 200.0, 2000.0, 200.0, 2000.0, 200.0, 2000.0];
        let kpis = legal_kpis(&erratic, as_of());
        assert_eq!(find(&kpis, KpiKey::FilingConsistency).score, 0.0);
    }

    #[test]
    fn test_delinquency_penalty() {
        let mut dossier = Dossier::demo(None);
        dossier.legal.criminal_cases = 1;
        dossier.legal.labor_cases = 2;
        let kpi = find(&legal_kpis(&dossier, as_of()), KpiKey::LegalDelinquency);
        assert_eq!(kpi.raw, 60.0);
        assert_eq!(kpi.score, 40.0);

        dossier.legal.criminal_cases = 5;
        let kpi = find(&legal_kpis(&dossier, as_of()), KpiKey::LegalDelinquency);
        assert_eq!(kpi.score, 0.0);
        assert!(!kpi.missing);
    }

    #[test]
    fn test_business_age() {
        let mut dossier = Dossier::demo(None);
        dossier.legal.business_start = NaiveDate::from_ymd_opt(2000, 1, 1);
        assert_eq!(find(&legal_kpis(&dossier, as_of()), KpiKey::BusinessAge).score, 100.0);

        dossier.legal.business_start = NaiveDate::from_ymd_opt(2020, 1, 15);
        let kpi = find(&legal_kpis(&dossier, as_of()), KpiKey::BusinessAge);
        assert!((kpi.score - 50.0).abs() < 0.1);

        dossier.legal.business_start = None;
        assert!(find(&legal_kpis(&dossier, as_of()), KpiKey::BusinessAge).missing);
    }

    #[test]
    fn test_registry_status() {
        let mut dossier = Dossier::demo(None);
        assert!(find(&legal_kpis(&dossier, as_of()), KpiKey::RegistryStatus).missing);

        dossier.legal.registry.status = Some("Active".to_string());
        assert_eq!(find(&legal_kpis(&dossier, as_of()), KpiKey::RegistryStatus).score, 100.0);

        dossier.legal.registry.status = Some("SUSPENDIDO".to_string());
        let kpi = find(&legal_kpis(&dossier, as_of()), KpiKey::RegistryStatus);
        assert_eq!(kpi.score, 10.0);
        assert!(!kpi.missing);
    }

    #[test]
    fn test_formality_points() {
        let mut dossier = Dossier::demo(None);
        assert_eq!(find(&legal_kpis(&dossier, as_of()), KpiKey::Formality).score, 0.0);

        let registry = &mut dossier.legal.registry;
        registry.accounting_obligation = Some(true);
        registry.retention_agent = Some(true);
        registry.special_taxpayer = Some(false);
        assert_eq!(find(&legal_kpis(&dossier, as_of()), KpiKey::Formality).score, 30.0);

        dossier.legal.registry.ghost_taxpayer = Some(true);
        let kpi = find(&legal_kpis(&dossier, as_of()), KpiKey::Formality);
        assert_eq!(kpi.raw, -10.0);
        assert_eq!(kpi.score, 0.0);
    }

    #[test]
    fn test_operational_stability() {
        let mut dossier = Dossier::demo(None);
        assert_eq!(
            find(&legal_kpis(&dossier, as_of()), KpiKey::OperationalStability).score,
            100.0
        );

        dossier.legal.registry.cessation_date = NaiveDate::from_ymd_opt(2022, 1, 1);
        assert!(find(&legal_kpis(&dossier, as_of()), KpiKey::OperationalStability).missing);

        dossier.legal.registry.reactivation_date = NaiveDate::from_ymd_opt(2024, 1, 15);
        let kpi = find(&legal_kpis(&dossier, as_of()), KpiKey::OperationalStability);
        assert!(!kpi.missing);
        assert!((kpi.raw - 12.0).abs() < 0.1);
        assert!((kpi.score - 33.3).abs() < 0.5);

        dossier.legal.registry.reactivation_date = NaiveDate::from_ymd_opt(2020, 1, 1);
        assert_eq!(
            find(&legal_kpis(&dossier, as_of()), KpiKey::OperationalStability).score,
            100.0
        );
    }

    #[test]
    fn test_regime_score() {
        assert_eq!(regime_score(Some("GENERAL")), Some(100.0));
        assert_eq!(regime_score(Some("rimpe emprendedor")), Some(85.0));
        assert_eq!(regime_score(Some("RIMPE NEGOCIO POPULAR")), Some(85.0));
        assert_eq!(regime_score(Some("OTRO")), Some(75.0));
        assert_eq!(regime_score(Some("  ")), None);
        assert_eq!(regime_score(None), None);
    }

    #[test]
    fn test_demo_missing_before_registry_lookup() {
        let kpis = legal_kpis(&Dossier::demo(None), as_of());
        let missing: Vec<KpiKey> = kpis.iter().filter(|k| k.missing).map(|k| k.key).collect();
        assert_eq!(missing, vec![KpiKey::RegistryStatus, KpiKey::TaxRegime]);
    }
}
