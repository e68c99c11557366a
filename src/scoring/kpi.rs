use serde::{Serialize, Serializer};

/// KPI grouping used for aggregation weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Financial,
    Digital,
    CommercialLegal,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Financial,
        Category::Digital,
        Category::CommercialLegal,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Financial => "Financial",
            Category::Digital => "Digital",
            Category::CommercialLegal => "Commercial/Legal",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiKey {
    Liquidity,
    Leverage,
    NetMargin,
    InventoryTurnover,
    CashMargin,
    Reputation,
    ReviewVolume,
    Engagement,
    Sentiment,
    FilingConsistency,
    LegalDelinquency,
    BusinessAge,
    RegistryStatus,
    Formality,
    OperationalStability,
    TaxRegime,
}

impl KpiKey {
    pub fn label(self) -> &'static str {
        match self {
            KpiKey::Liquidity => "Current liquidity",
            KpiKey::Leverage => "Leverage",
            KpiKey::NetMargin => "Net margin",
            KpiKey::InventoryTurnover => "Inventory turnover",
            KpiKey::CashMargin => "Cash margin",
            KpiKey::Reputation => "Reputation",
            KpiKey::ReviewVolume => "Review volume",
            KpiKey::Engagement => "Engagement",
            KpiKey::Sentiment => "Sentiment",
            KpiKey::FilingConsistency => "Filing consistency",
            KpiKey::LegalDelinquency => "Legal delinquency",
            KpiKey::BusinessAge => "Business age",
            KpiKey::RegistryStatus => "Registry status",
            KpiKey::Formality => "Formality",
            KpiKey::OperationalStability => "Operational stability",
            KpiKey::TaxRegime => "Tax regime",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            KpiKey::Liquidity | KpiKey::Leverage => "ratio",
            KpiKey::NetMargin | KpiKey::CashMargin => "%",
            KpiKey::InventoryTurnover => "turns/yr",
            KpiKey::Reputation
            | KpiKey::ReviewVolume
            | KpiKey::Engagement
            | KpiKey::Sentiment
            | KpiKey::RegistryStatus
            | KpiKey::TaxRegime => "0-100",
            KpiKey::FilingConsistency => "CV",
            KpiKey::LegalDelinquency => "penalty",
            KpiKey::BusinessAge => "years",
            KpiKey::Formality => "points",
            KpiKey::OperationalStability => "months",
        }
    }

    /// Short description of how the raw value is built.
    pub fn hint(self) -> &'static str {
        match self {
            KpiKey::Liquidity => "current assets / current liabilities",
            KpiKey::Leverage => "total liabilities / total assets",
            KpiKey::NetMargin => "net income / sales (annual)",
            KpiKey::InventoryTurnover => "cost of sales / average inventory",
            KpiKey::CashMargin => "annual CFO / annual sales",
            KpiKey::Reputation => "stars / 5",
            KpiKey::ReviewVolume => "capped at 200",
            KpiKey::Engagement => "capped at 5000",
            KpiKey::Sentiment => "[-1..1] to [0..100]",
            KpiKey::FilingConsistency => "CV over 12 months; n<6 or mean<100 is missing",
            KpiKey::LegalDelinquency => "30*criminal + 15*labor",
            KpiKey::BusinessAge => "capped at 10 years",
            KpiKey::RegistryStatus => "active 100, other 10",
            KpiKey::Formality => "+15 per obligation, -40 per blacklist flag",
            KpiKey::OperationalStability => "months since reactivation over [6, 24]",
            KpiKey::TaxRegime => "GENERAL 100, RIMPE 85, other 75",
        }
    }

    pub fn category(self) -> Category {
        match self {
            KpiKey::Liquidity
            | KpiKey::Leverage
            | KpiKey::NetMargin
            | KpiKey::InventoryTurnover
            | KpiKey::CashMargin => Category::Financial,
            KpiKey::Reputation | KpiKey::ReviewVolume | KpiKey::Engagement | KpiKey::Sentiment => {
                Category::Digital
            }
            KpiKey::FilingConsistency
            | KpiKey::LegalDelinquency
            | KpiKey::BusinessAge
            | KpiKey::RegistryStatus
            | KpiKey::Formality
            | KpiKey::OperationalStability
            | KpiKey::TaxRegime => Category::CommercialLegal,
        }
    }
}

/// One normalized indicator.
///
/// A `missing` KPI is excluded from aggregation whatever its `score` holds;
/// the score of a missing KPI is a placeholder (0).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub key: KpiKey,
    pub label: &'static str,
    /// Underlying value in `unit`. NaN when undefined.
    #[serde(serialize_with = "finite_or_null")]
    pub raw: f64,
    pub unit: &'static str,
    pub score: f64,
    pub category: Category,
    pub missing: bool,
    pub hint: &'static str,
}

impl Kpi {
    /// Usable KPI. The score is clamped to 0..100.
    pub fn scored(key: KpiKey, raw: f64, score: f64) -> Self {
        Self::build(key, raw, super::curves::clamp_score(score), false)
    }

    /// KPI without usable data: score 0, excluded from aggregation.
    pub fn missing(key: KpiKey, raw: f64) -> Self {
        Self::build(key, raw, 0.0, true)
    }

    fn build(key: KpiKey, raw: f64, score: f64, missing: bool) -> Self {
        Self {
            key,
            label: key.label(),
            raw,
            unit: key.unit(),
            score,
            category: key.category(),
            missing,
            hint: key.hint(),
        }
    }
}

/// JSON has no NaN or infinity; write them as `null`.
pub(crate) fn finite_or_null<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.serialize_none()
    }
}
