use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::curves::Logistic;
use crate::dossier::Period;

/// Fully resolved engine options. Build one from [`ScoringOptions::default`]
/// or resolve a [`ScoringConfig`] onto it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringOptions {
    /// How `operating_cash_flow` is expressed when the dossier does not say.
    pub financial_period: Period,
    pub weights: CategoryWeights,
    pub thresholds: Thresholds,
    pub requirements: Requirements,
    /// Ceiling applied to the global score when coverage is below minimum.
    pub low_coverage_cap: f64,
    /// Share of disposable income that may go to the new installment.
    pub capacity_share: f64,
    pub amount_limits: AmountLimits,
    pub curves: Curves,
    pub calibration: Calibration,
    /// Evaluation date for age and reactivation math. Today (UTC) when unset.
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeights {
    pub financial: f64,
    pub digital: f64,
    pub commercial_legal: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub approved: f64,
    pub conditional: f64,
    pub review: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Requirements {
    pub coverage_min: f64,
    pub dsr_max: f64,
    pub dscr_min: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmountLimits {
    /// Cap as a fraction of annual sales.
    pub sales_multiplier: f64,
    /// Cap as a multiple of annualized operating cash flow.
    pub cfo_multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Curves {
    pub net_margin: Logistic,
    pub inventory_turnover: Logistic,
    pub cash_margin: Logistic,
}

/// Logistic PD calibration: `PD = 1 / (1 + e^-(a + b * score))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub a: f64,
    pub b: f64,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            financial_period: Period::Annual,
            weights: CategoryWeights {
                financial: 0.70,
                digital: 0.10,
                commercial_legal: 0.20,
            },
            thresholds: Thresholds {
                approved: 80.0,
                conditional: 65.0,
                review: 50.0,
            },
            requirements: Requirements {
                coverage_min: 0.70,
                dsr_max: 0.35,
                dscr_min: 1.20,
            },
            low_coverage_cap: 60.0,
            capacity_share: 0.60,
            amount_limits: AmountLimits {
                sales_multiplier: 0.25,
                cfo_multiplier: 8.0,
            },
            curves: Curves {
                net_margin: Logistic::new(60.0, 0.06),
                inventory_turnover: Logistic::new(0.7, 6.0),
                cash_margin: Logistic::new(50.0, 0.05),
            },
            calibration: Calibration { a: -5.0, b: 0.06 },
            as_of: None,
        }
    }
}

/// User-facing scoring configuration.
///
/// Every field is optional; anything left out keeps its default. Nested
/// sections merge key by key, so overriding `weights.digital` keeps the
/// default financial and commercial/legal weights.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   financial_period: monthly
///   weights:
///     financial: 0.6
///     commercial_legal: 0.3
///   requirements:
///     dscr_min: 1.5
///   curves:
///     net_margin: { k: 40 }
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_period: Option<Period>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<WeightsConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<ThresholdsConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<RequirementsConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_coverage_cap: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_share: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_limits: Option<AmountLimitsConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curves: Option<CurvesConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibration: Option<CalibrationConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WeightsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digital: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commercial_legal: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ThresholdsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RequirementsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dsr_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dscr_min: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AmountLimitsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cfo_multiplier: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CurvesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_margin: Option<LogisticConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory_turnover: Option<LogisticConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_margin: Option<LogisticConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LogisticConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x0: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CalibrationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<f64>,
}

/// Key-by-key layering: values set in `over` win, everything else comes
/// from `self`.
trait Layer: Sized + Clone {
    fn layer(&self, over: &Self) -> Self;
}

fn pick<T: Clone>(base: &Option<T>, over: &Option<T>) -> Option<T> {
    over.clone().or_else(|| base.clone())
}

fn pick_nested<T: Layer>(base: &Option<T>, over: &Option<T>) -> Option<T> {
    match (base, over) {
        (Some(b), Some(o)) => Some(b.layer(o)),
        _ => pick(base, over),
    }
}

impl Layer for WeightsConfig {
    fn layer(&self, over: &Self) -> Self {
        Self {
            financial: pick(&self.financial, &over.financial),
            digital: pick(&self.digital, &over.digital),
            commercial_legal: pick(&self.commercial_legal, &over.commercial_legal),
        }
    }
}

impl Layer for ThresholdsConfig {
    fn layer(&self, over: &Self) -> Self {
        Self {
            approved: pick(&self.approved, &over.approved),
            conditional: pick(&self.conditional, &over.conditional),
            review: pick(&self.review, &over.review),
        }
    }
}

impl Layer for RequirementsConfig {
    fn layer(&self, over: &Self) -> Self {
        Self {
            coverage_min: pick(&self.coverage_min, &over.coverage_min),
            dsr_max: pick(&self.dsr_max, &over.dsr_max),
            dscr_min: pick(&self.dscr_min, &over.dscr_min),
        }
    }
}

impl Layer for AmountLimitsConfig {
    fn layer(&self, over: &Self) -> Self {
        Self {
            sales_multiplier: pick(&self.sales_multiplier, &over.sales_multiplier),
            cfo_multiplier: pick(&self.cfo_multiplier, &over.cfo_multiplier),
        }
    }
}

impl Layer for LogisticConfig {
    fn layer(&self, over: &Self) -> Self {
        Self {
            k: pick(&self.k, &over.k),
            x0: pick(&self.x0, &over.x0),
        }
    }
}

impl Layer for CurvesConfig {
    fn layer(&self, over: &Self) -> Self {
        Self {
            net_margin: pick_nested(&self.net_margin, &over.net_margin),
            inventory_turnover: pick_nested(&self.inventory_turnover, &over.inventory_turnover),
            cash_margin: pick_nested(&self.cash_margin, &over.cash_margin),
        }
    }
}

impl Layer for CalibrationConfig {
    fn layer(&self, over: &Self) -> Self {
        Self {
            a: pick(&self.a, &over.a),
            b: pick(&self.b, &over.b),
        }
    }
}

impl Layer for ScoringConfig {
    fn layer(&self, over: &Self) -> Self {
        Self {
            financial_period: pick(&self.financial_period, &over.financial_period),
            weights: pick_nested(&self.weights, &over.weights),
            thresholds: pick_nested(&self.thresholds, &over.thresholds),
            requirements: pick_nested(&self.requirements, &over.requirements),
            low_coverage_cap: pick(&self.low_coverage_cap, &over.low_coverage_cap),
            capacity_share: pick(&self.capacity_share, &over.capacity_share),
            amount_limits: pick_nested(&self.amount_limits, &over.amount_limits),
            curves: pick_nested(&self.curves, &over.curves),
            calibration: pick_nested(&self.calibration, &over.calibration),
            as_of: pick(&self.as_of, &over.as_of),
        }
    }
}

fn resolve_logistic(base: Logistic, config: &Option<LogisticConfig>) -> Logistic {
    match config {
        Some(c) => Logistic {
            k: c.k.unwrap_or(base.k),
            x0: c.x0.unwrap_or(base.x0),
        },
        None => base,
    }
}

impl ScoringConfig {
    /// Layer `over` on top of this config; keys set in `over` win.
    pub fn merge(&self, over: &ScoringConfig) -> ScoringConfig {
        self.layer(over)
    }

    /// Resolve onto the defaults.
    pub fn resolve(&self) -> ScoringOptions {
        let d = ScoringOptions::default();

        let weights = self.weights.clone().unwrap_or_default();
        let thresholds = self.thresholds.clone().unwrap_or_default();
        let requirements = self.requirements.clone().unwrap_or_default();
        let limits = self.amount_limits.clone().unwrap_or_default();
        let curves = self.curves.clone().unwrap_or_default();
        let calibration = self.calibration.clone().unwrap_or_default();

        ScoringOptions {
            financial_period: self.financial_period.unwrap_or(d.financial_period),
            weights: CategoryWeights {
                financial: weights.financial.unwrap_or(d.weights.financial),
                digital: weights.digital.unwrap_or(d.weights.digital),
                commercial_legal: weights
                    .commercial_legal
                    .unwrap_or(d.weights.commercial_legal),
            },
            thresholds: Thresholds {
                approved: thresholds.approved.unwrap_or(d.thresholds.approved),
                conditional: thresholds.conditional.unwrap_or(d.thresholds.conditional),
                review: thresholds.review.unwrap_or(d.thresholds.review),
            },
            requirements: Requirements {
                coverage_min: requirements
                    .coverage_min
                    .unwrap_or(d.requirements.coverage_min),
                dsr_max: requirements.dsr_max.unwrap_or(d.requirements.dsr_max),
                dscr_min: requirements.dscr_min.unwrap_or(d.requirements.dscr_min),
            },
            low_coverage_cap: self.low_coverage_cap.unwrap_or(d.low_coverage_cap),
            capacity_share: self.capacity_share.unwrap_or(d.capacity_share),
            amount_limits: AmountLimits {
                sales_multiplier: limits
                    .sales_multiplier
                    .unwrap_or(d.amount_limits.sales_multiplier),
                cfo_multiplier: limits
                    .cfo_multiplier
                    .unwrap_or(d.amount_limits.cfo_multiplier),
            },
            curves: Curves {
                net_margin: resolve_logistic(d.curves.net_margin, &curves.net_margin),
                inventory_turnover: resolve_logistic(
                    d.curves.inventory_turnover,
                    &curves.inventory_turnover,
                ),
                cash_margin: resolve_logistic(d.curves.cash_margin, &curves.cash_margin),
            },
            calibration: Calibration {
                a: calibration.a.unwrap_or(d.calibration.a),
                b: calibration.b.unwrap_or(d.calibration.b),
            },
            as_of: self.as_of.or(d.as_of),
        }
    }

    /// Config that spells out every default, for writing a starter file.
    pub fn with_defaults() -> ScoringConfig {
        let d = ScoringOptions::default();
        let logistic = |c: Logistic| LogisticConfig {
            k: Some(c.k),
            x0: Some(c.x0),
        };
        ScoringConfig {
            financial_period: Some(d.financial_period),
            weights: Some(WeightsConfig {
                financial: Some(d.weights.financial),
                digital: Some(d.weights.digital),
                commercial_legal: Some(d.weights.commercial_legal),
            }),
            thresholds: Some(ThresholdsConfig {
                approved: Some(d.thresholds.approved),
                conditional: Some(d.thresholds.conditional),
                review: Some(d.thresholds.review),
            }),
            requirements: Some(RequirementsConfig {
                coverage_min: Some(d.requirements.coverage_min),
                dsr_max: Some(d.requirements.dsr_max),
                dscr_min: Some(d.requirements.dscr_min),
            }),
            low_coverage_cap: Some(d.low_coverage_cap),
            capacity_share: Some(d.capacity_share),
            amount_limits: Some(AmountLimitsConfig {
                sales_multiplier: Some(d.amount_limits.sales_multiplier),
                cfo_multiplier: Some(d.amount_limits.cfo_multiplier),
            }),
            curves: Some(CurvesConfig {
                net_margin: Some(logistic(d.curves.net_margin)),
                inventory_turnover: Some(logistic(d.curves.inventory_turnover)),
                cash_margin: Some(logistic(d.curves.cash_margin)),
            }),
            calibration: Some(CalibrationConfig {
                a: Some(d.calibration.a),
                b: Some(d.calibration.b),
            }),
            as_of: None,
        }
    }
}
