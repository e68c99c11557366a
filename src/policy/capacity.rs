use chrono::NaiveDate;
use serde::Serialize;

use crate::dossier::{Dossier, LoanRequest, RegistryFacts};
use crate::scoring::curves::{floored_ratio, months_since, round_to};
use crate::scoring::ScoringOptions;

/// Monthly repayment capacity, in whole currency units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Capacity {
    pub disposable_monthly: u64,
    pub assignable_capacity: u64,
    pub max_installment: u64,
    /// Principal the max installment can service over the requested term.
    pub max_principal: u64,
    /// DSR as a whole percentage.
    pub dsr_percent: u64,
    /// DSR ratio, four decimals.
    pub dsr_ratio: f64,
}

/// How the recommended amount was bounded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmountBreakdown {
    pub capacity_cap: u64,
    pub sales_cap: u64,
    pub cfo_cap: u64,
    pub stability_factor: f64,
    pub regime_factor: f64,
    pub recommended: u64,
}

fn to_units(x: f64) -> u64 {
    if x.is_finite() && x > 0.0 {
        x as u64
    } else {
        0
    }
}

/// Present value of `periods` installments at `rate`; plain product when
/// the rate is zero or negative.
pub fn annuity_principal(installment: f64, rate: f64, periods: u32) -> f64 {
    let n = periods as f64;
    if rate > 0.0 {
        installment * (1.0 - (1.0 + rate).powf(-n)) / rate
    } else {
        installment * n
    }
}

pub fn derive_capacity(request: &LoanRequest, options: &ScoringOptions) -> Capacity {
    let disposable = (request.monthly_income
        - request.monthly_expenses
        - request.existing_installments)
        .max(0.0);
    let capacity = options.capacity_share * disposable;
    let max_installment = capacity;
    let max_principal = annuity_principal(max_installment, request.monthly_rate, request.periods);
    let dsr_ratio = floored_ratio(request.monthly_debt_service(), request.monthly_income);

    Capacity {
        disposable_monthly: to_units(disposable.round()),
        assignable_capacity: to_units(capacity.round()),
        max_installment: to_units(max_installment.round()),
        max_principal: to_units(max_principal.round()),
        dsr_percent: to_units((dsr_ratio * 100.0).round()),
        dsr_ratio: round_to(dsr_ratio, 4),
    }
}

/// Haircut for a recent reactivation.
pub fn stability_factor(registry: &RegistryFacts, as_of: NaiveDate) -> f64 {
    let months = months_since(registry.reactivation_date, as_of);
    if months < 6.0 {
        0.0
    } else if months < 12.0 {
        0.6
    } else if months < 24.0 {
        0.8
    } else {
        1.0
    }
}

/// Haircut by tax regime. "POPULAR" is checked first since popular-business
/// regimes also carry the RIMPE name.
pub fn regime_factor(regime: Option<&str>) -> f64 {
    let Some(regime) = regime else {
        return 0.85;
    };
    let upper = regime.trim().to_uppercase();
    if upper.contains("POPULAR") {
        0.8
    } else if upper.contains("RIMPE") {
        0.9
    } else if upper == "GENERAL" {
        1.0
    } else {
        0.85
    }
}

pub fn derive_amount(
    dossier: &Dossier,
    capacity: &Capacity,
    cfo_annual: f64,
    options: &ScoringOptions,
    as_of: NaiveDate,
) -> AmountBreakdown {
    let limits = &options.amount_limits;
    let registry = &dossier.legal.registry;

    let capacity_cap = capacity.max_principal as f64;
    let sales_cap = limits.sales_multiplier * dossier.financial.sales.max(0.0);
    let cfo_cap = limits.cfo_multiplier * cfo_annual.max(0.0);
    let stability = stability_factor(registry, as_of);
    let regime = regime_factor(registry.tax_regime.as_deref());

    let recommended = capacity_cap.min(sales_cap).min(cfo_cap) * stability * regime;

    AmountBreakdown {
        capacity_cap: capacity.max_principal,
        sales_cap: to_units(sales_cap.floor()),
        cfo_cap: to_units(cfo_cap.floor()),
        stability_factor: stability,
        regime_factor: regime,
        recommended: to_units(recommended.floor()),
    }
}
