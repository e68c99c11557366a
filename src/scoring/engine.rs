use chrono::{NaiveDate, Utc};
use serde::Serialize;

use super::aggregate::{aggregate, CategorySummary};
use super::config::ScoringOptions;
use super::digital::digital_kpis;
use super::financial::{annual_cash_flow, financial_kpis};
use super::kpi::{Category, Kpi};
use super::legal::legal_kpis;
use crate::dossier::Dossier;
use crate::policy::{
    derive_amount, derive_capacity, evaluate_gates, probability_of_default, resolve_decision,
    AmountBreakdown, Capacity, Decision, GateResult, Rating,
};

/// KPIs of one category, in derivation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup {
    pub category: Category,
    pub kpis: Vec<Kpi>,
}

/// Everything one evaluation produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub tax_id: String,
    pub as_of: NaiveDate,
    pub kpis: Vec<Kpi>,
    pub category_groups: Vec<CategoryGroup>,
    pub categories: Vec<CategorySummary>,
    /// 0..100, after the coverage cap.
    pub global_score: u8,
    pub uncapped_score: u8,
    /// Weighted share of KPIs with usable data, 0..1.
    pub coverage: f64,
    pub coverage_capped: bool,
    pub gate_result: GateResult,
    pub capacity: Capacity,
    /// Same value as `amount_limits.recommended`.
    pub recommended_amount: u64,
    pub amount_limits: AmountBreakdown,
    pub decision: Decision,
    /// Percent, two decimals.
    pub probability_of_default: f64,
    pub rating: Rating,
}

impl Evaluation {
    pub fn group(&self, category: Category) -> &[Kpi] {
        self.category_groups
            .iter()
            .find(|g| g.category == category)
            .map(|g| g.kpis.as_slice())
            .unwrap_or(&[])
    }

    pub fn missing_kpis(&self) -> impl Iterator<Item = &Kpi> {
        self.kpis.iter().filter(|k| k.missing)
    }
}

fn evaluation_date(options: &ScoringOptions) -> NaiveDate {
    options.as_of.unwrap_or_else(|| Utc::now().date_naive())
}

/// Score a dossier and decide. Pure apart from reading today's date when
/// `options.as_of` is unset; never fails.
pub fn evaluate(dossier: &Dossier, options: &ScoringOptions) -> Evaluation {
    let as_of = evaluation_date(options);

    let mut kpis = financial_kpis(dossier, options);
    kpis.extend(digital_kpis(dossier));
    kpis.extend(legal_kpis(dossier, as_of));

    let category_groups: Vec<CategoryGroup> = Category::ALL
        .iter()
        .map(|category| CategoryGroup {
            category: *category,
            kpis: kpis
                .iter()
                .filter(|k| k.category == *category)
                .cloned()
                .collect(),
        })
        .collect();

    let totals = aggregate(&kpis, options);
    tracing::debug!(
        tax_id = %dossier.tax_id,
        coverage = totals.coverage,
        uncapped = totals.uncapped_score,
        score = totals.global_score,
        missing = kpis.iter().filter(|k| k.missing).count(),
        "kpis aggregated"
    );

    let cfo_annual = annual_cash_flow(dossier, options);
    let gate_result = evaluate_gates(dossier, cfo_annual, options, as_of);
    let capacity = derive_capacity(&dossier.request, options);
    let amount_limits = derive_amount(dossier, &capacity, cfo_annual, options, as_of);

    let score = f64::from(totals.global_score);
    let decision = resolve_decision(&gate_result, score, &options.thresholds);
    let probability_of_default = probability_of_default(score, &options.calibration);
    let rating = Rating::from_score(score);

    tracing::info!(
        tax_id = %dossier.tax_id,
        score = totals.global_score,
        decision = %decision,
        rating = %rating,
        "dossier evaluated"
    );

    Evaluation {
        tax_id: dossier.tax_id.clone(),
        as_of,
        kpis,
        category_groups,
        categories: totals.categories,
        global_score: totals.global_score,
        uncapped_score: totals.uncapped_score,
        coverage: totals.coverage,
        coverage_capped: totals.coverage_capped,
        gate_result,
        capacity,
        recommended_amount: amount_limits.recommended,
        amount_limits,
        decision,
        probability_of_default,
        rating,
    }
}
