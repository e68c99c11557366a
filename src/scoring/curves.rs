use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const DAYS_PER_YEAR: f64 = 365.25;
const DAYS_PER_MONTH: f64 = DAYS_PER_YEAR / 12.0;

/// Logistic curve `1 / (1 + e^(-k (x - x0)))`, scaled to 0..100 for scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Logistic {
    /// Steepness
    pub k: f64,
    /// Midpoint (score 50)
    pub x0: f64,
}

impl Logistic {
    pub const fn new(k: f64, x0: f64) -> Self {
        Self { k, x0 }
    }

    /// Raw 0..1 value of the curve at `x`.
    pub fn unit(&self, x: f64) -> f64 {
        1.0 / (1.0 + (-self.k * (x - self.x0)).exp())
    }

    /// 0..100 score at `x`. Non-finite input scores 0.
    pub fn score(&self, x: f64) -> f64 {
        if x.is_nan() {
            return 0.0;
        }
        clamp_score(100.0 * self.unit(x))
    }
}

/// Clamp to the 0..100 score range. NaN reads as 0.
pub fn clamp_score(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 100.0)
    }
}

/// Linear map of `[xmin, xmax]` onto `[0, 100]`, saturating at both ends.
pub fn map_linear(x: f64, xmin: f64, xmax: f64) -> f64 {
    if !x.is_finite() {
        return 0.0;
    }
    if x <= xmin {
        0.0
    } else if x >= xmax {
        100.0
    } else {
        (x - xmin) / (xmax - xmin) * 100.0
    }
}

/// Inverted linear map: `xmin` and below scores 100, `xmax` and above 0.
/// Non-finite input scores 0 rather than 100.
pub fn map_linear_inv(x: f64, xmin: f64, xmax: f64) -> f64 {
    if !x.is_finite() {
        return 0.0;
    }
    100.0 - map_linear(x, xmin, xmax)
}

/// Ratio with the denominator floored at 1, so empty statements give a large
/// finite number instead of infinity or NaN.
pub fn floored_ratio(numerator: f64, denominator: f64) -> f64 {
    numerator / denominator.max(1.0)
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Fractional years from `from` to `as_of`.
pub fn years_between(from: NaiveDate, as_of: NaiveDate) -> f64 {
    (as_of - from).num_days() as f64 / DAYS_PER_YEAR
}

/// Fractional months since `from`; infinite when there is no date.
pub fn months_since(from: Option<NaiveDate>, as_of: NaiveDate) -> f64 {
    match from {
        Some(date) => (as_of - date).num_days() as f64 / DAYS_PER_MONTH,
        None => f64::INFINITY,
    }
}

pub fn round_to(x: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (x * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_linear_saturates() {
        assert_eq!(map_linear(0.5, 0.8, 2.0), 0.0);
        assert_eq!(map_linear(0.8, 0.8, 2.0), 0.0);
        assert_eq!(map_linear(2.0, 0.8, 2.0), 100.0);
        assert_eq!(map_linear(3.0, 0.8, 2.0), 100.0);
        assert!((map_linear(1.4, 0.8, 2.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_map_linear_non_finite() {
        assert_eq!(map_linear(f64::NAN, 0.0, 1.0), 0.0);
        assert_eq!(map_linear(f64::INFINITY, 0.0, 1.0), 0.0);
        assert_eq!(map_linear_inv(f64::NAN, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_map_linear_inv() {
        assert_eq!(map_linear_inv(0.1, 0.2, 0.8), 100.0);
        assert_eq!(map_linear_inv(0.9, 0.2, 0.8), 0.0);
        assert!((map_linear_inv(0.5, 0.2, 0.8) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_logistic_midpoint_and_tails() {
        let curve = Logistic::new(60.0, 0.06);
        assert!((curve.score(0.06) - 50.0).abs() < 1e-9);
        assert!(curve.score(-1.0) < 0.001);
        assert!(curve.score(1.0) > 99.999);
        assert_eq!(curve.score(f64::NAN), 0.0);
    }

    #[test]
    fn test_logistic_is_monotonic() {
        let curve = Logistic::new(0.7, 6.0);
        assert!(curve.score(4.0) < curve.score(5.0));
        assert!(curve.score(5.0) < curve.score(7.0));
    }

    #[test]
    fn test_floored_ratio() {
        assert_eq!(floored_ratio(500.0, 0.0), 500.0);
        assert_eq!(floored_ratio(500.0, 0.25), 500.0);
        assert_eq!(floored_ratio(500.0, 250.0), 2.0);
    }

    #[test]
    fn test_mean_and_std_dev() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(std_dev(&[]), 0.0);
        assert_eq!(mean(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 5.0);
        assert_eq!(std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 2.0);
    }

    #[test]
    fn test_months_since() {
        let as_of = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let months = months_since(Some(from), as_of);
        assert!(months > 5.9 && months < 6.0, "got {}", months);
        assert!(months_since(None, as_of).is_infinite());
    }

    #[test]
    fn test_years_between() {
        let from = NaiveDate::from_ymd_opt(2014, 1, 1).unwrap();
        let as_of = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!((years_between(from, as_of) - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.111904, 4), 0.1119);
        assert_eq!(round_to(12.345, 1), 12.3);
    }
}
