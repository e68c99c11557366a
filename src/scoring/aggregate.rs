use serde::Serialize;

use super::config::{CategoryWeights, ScoringOptions};
use super::curves::mean;
use super::kpi::{Category, Kpi};

/// Per-category rollup of the KPI list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: Category,
    /// Mean of usable KPI scores; 0 when none are usable.
    pub score: f64,
    /// usable / total
    pub coverage: f64,
    pub usable: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate {
    pub categories: Vec<CategorySummary>,
    pub coverage: f64,
    /// Weighted score before the coverage cap.
    pub uncapped_score: u8,
    pub global_score: u8,
    pub coverage_capped: bool,
}

impl CategoryWeights {
    pub fn weight(&self, category: Category) -> f64 {
        match category {
            Category::Financial => self.financial,
            Category::Digital => self.digital,
            Category::CommercialLegal => self.commercial_legal,
        }
    }

    pub fn total(&self) -> f64 {
        Category::ALL.iter().map(|c| self.weight(*c)).sum()
    }
}

pub fn summarize_category(kpis: &[Kpi], category: Category) -> CategorySummary {
    let in_category: Vec<&Kpi> = kpis.iter().filter(|k| k.category == category).collect();
    let usable: Vec<f64> = in_category
        .iter()
        .filter(|k| !k.missing)
        .map(|k| k.score)
        .collect();
    let total = in_category.len();
    CategorySummary {
        category,
        score: mean(&usable),
        coverage: if total > 0 {
            usable.len() as f64 / total as f64
        } else {
            0.0
        },
        usable: usable.len(),
        total,
    }
}

fn weighted_mean(
    summaries: &[CategorySummary],
    weights: &CategoryWeights,
    value: impl Fn(&CategorySummary) -> f64,
) -> f64 {
    let total = weights.total();
    if total <= 0.0 {
        return 0.0;
    }
    summaries
        .iter()
        .map(|s| value(s) * weights.weight(s.category))
        .sum::<f64>()
        / total
}

/// Category rollups, weighted coverage and the (possibly capped) global score.
pub fn aggregate(kpis: &[Kpi], options: &ScoringOptions) -> Aggregate {
    let categories: Vec<CategorySummary> = Category::ALL
        .iter()
        .map(|c| summarize_category(kpis, *c))
        .collect();

    let coverage = weighted_mean(&categories, &options.weights, |s| s.coverage);
    let weighted = weighted_mean(&categories, &options.weights, |s| s.score);
    let uncapped = weighted.round().clamp(0.0, 100.0);

    let coverage_capped = coverage < options.requirements.coverage_min;
    let global = if coverage_capped {
        uncapped.min(options.low_coverage_cap.clamp(0.0, 100.0).floor())
    } else {
        uncapped
    };

    if coverage_capped {
        tracing::warn!(
            coverage = format!("{:.2}", coverage),
            minimum = options.requirements.coverage_min,
            uncapped = uncapped,
            "coverage below minimum, global score capped"
        );
    }

    Aggregate {
        categories,
        coverage,
        uncapped_score: uncapped as u8,
        global_score: global as u8,
        coverage_capped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::kpi::KpiKey;

    fn kpis(financial: f64, digital: f64, legal: f64, legal_missing: usize) -> Vec<Kpi> {
        let mut out = vec![
            Kpi::scored(KpiKey::Liquidity, 0.0, financial),
            Kpi::scored(KpiKey::Leverage, 0.0, financial),
            Kpi::scored(KpiKey::Reputation, 0.0, digital),
        ];
        let legal_keys = [KpiKey::LegalDelinquency, KpiKey::BusinessAge, KpiKey::TaxRegime];
        for (i, key) in legal_keys.iter().enumerate() {
            if i < legal_missing {
                out.push(Kpi::missing(*key, f64::NAN));
            } else {
                out.push(Kpi::scored(*key, 0.0, legal));
            }
        }
        out
    }

    #[test]
    fn test_summarize_category() {
        let list = kpis(80.0, 60.0, 90.0, 1);
        let summary = summarize_category(&list, Category::CommercialLegal);
        assert_eq!(summary.score, 90.0);
        assert_eq!(summary.usable, 2);
        assert_eq!(summary.total, 3);
        assert!((summary.coverage - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_category_scores_zero() {
        let summary = summarize_category(&[], Category::Digital);
        assert_eq!(summary.score, 0.0);
        assert_eq!(summary.coverage, 0.0);
    }

    #[test]
    fn test_global_score_weighted() {
        let result = aggregate(&kpis(80.0, 60.0, 90.0, 0), &ScoringOptions::default());
        // 0.7*80 + 0.1*60 + 0.2*90 = 80
        assert_eq!(result.global_score, 80);
        assert_eq!(result.coverage, 1.0);
        assert!(!result.coverage_capped);
    }

    #[test]
    fn test_weights_normalized() {
        let mut options = ScoringOptions::default();
        options.weights = CategoryWeights {
            financial: 7.0,
            digital: 1.0,
            commercial_legal: 2.0,
        };
        let result = aggregate(&kpis(80.0, 60.0, 90.0, 0), &options);
        assert_eq!(result.global_score, 80);
    }

    #[test]
    fn test_zero_weights() {
        let mut options = ScoringOptions::default();
        options.weights = CategoryWeights {
            financial: 0.0,
            digital: 0.0,
            commercial_legal: 0.0,
        };
        let result = aggregate(&kpis(80.0, 60.0, 90.0, 0), &options);
        assert_eq!(result.global_score, 0);
        assert_eq!(result.coverage, 0.0);
    }

    #[test]
    fn test_low_coverage_caps_score() {
        let mut options = ScoringOptions::default();
        options.requirements.coverage_min = 0.95;
        let result = aggregate(&kpis(100.0, 100.0, 100.0, 1), &options);
        assert!(result.coverage_capped);
        assert_eq!(result.uncapped_score, 100);
        assert_eq!(result.global_score, 60);
    }

    #[test]
    fn test_cap_does_not_raise_score() {
        let mut options = ScoringOptions::default();
        options.requirements.coverage_min = 0.95;
        let result = aggregate(&kpis(30.0, 30.0, 30.0, 1), &options);
        assert!(result.coverage_capped);
        assert_eq!(result.global_score, 30);
    }
}
