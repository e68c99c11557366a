use serde::Serialize;

use crate::scoring::config::Calibration;
use crate::scoring::curves::round_to;

/// Letter bucket of the global score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Rating {
    A,
    B,
    C,
    D,
    E,
}

impl Rating {
    pub fn from_score(score: f64) -> Rating {
        if score >= 85.0 {
            Rating::A
        } else if score >= 75.0 {
            Rating::B
        } else if score >= 65.0 {
            Rating::C
        } else if score >= 50.0 {
            Rating::D
        } else {
            Rating::E
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rating::A => "A",
            Rating::B => "B",
            Rating::C => "C",
            Rating::D => "D",
            Rating::E => "E",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Probability of default in percent, two decimals:
/// `100 / (1 + e^-(a + b * score))`.
pub fn probability_of_default(score: f64, calibration: &Calibration) -> f64 {
    let z = calibration.a + calibration.b * score;
    round_to(100.0 / (1.0 + (-z).exp()), 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: Calibration = Calibration { a: -5.0, b: 0.06 };

    #[test]
    fn test_pd_default_calibration() {
        assert_eq!(probability_of_default(72.0, &DEFAULT), 33.63);
        assert_eq!(probability_of_default(0.0, &DEFAULT), 0.67);
        // Midpoint where a + b*score = 0
        assert_eq!(probability_of_default(250.0 / 3.0, &DEFAULT), 50.0);
    }

    #[test]
    fn test_pd_bounds() {
        for score in 0..=100 {
            let pd = probability_of_default(score as f64, &DEFAULT);
            assert!((0.0..=100.0).contains(&pd));
        }
    }

    #[test]
    fn test_rating_buckets() {
        assert_eq!(Rating::from_score(100.0), Rating::A);
        assert_eq!(Rating::from_score(85.0), Rating::A);
        assert_eq!(Rating::from_score(84.0), Rating::B);
        assert_eq!(Rating::from_score(75.0), Rating::B);
        assert_eq!(Rating::from_score(65.0), Rating::C);
        assert_eq!(Rating::from_score(50.0), Rating::D);
        assert_eq!(Rating::from_score(49.0), Rating::E);
        assert_eq!(Rating::from_score(0.0), Rating::E);
        assert_eq!(Rating::C.to_string(), "C");
    }
}
