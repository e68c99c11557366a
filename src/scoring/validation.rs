use super::config::{LogisticConfig, ScoringConfig};

fn check_range(errors: &mut Vec<String>, key: &str, value: Option<f64>, min: f64, max: f64) {
    if let Some(v) = value {
        if !v.is_finite() || v < min || v > max {
            errors.push(format!("scoring.{}: must be between {} and {}, got {}", key, min, max, v));
        }
    }
}

fn check_positive(errors: &mut Vec<String>, key: &str, value: Option<f64>) {
    if let Some(v) = value {
        if !v.is_finite() || v <= 0.0 {
            errors.push(format!("scoring.{}: must be positive, got {}", key, v));
        }
    }
}

fn check_non_negative(errors: &mut Vec<String>, key: &str, value: Option<f64>) {
    if let Some(v) = value {
        if !v.is_finite() || v < 0.0 {
            errors.push(format!("scoring.{}: must be non-negative, got {}", key, v));
        }
    }
}

fn check_curve(errors: &mut Vec<String>, key: &str, curve: &Option<LogisticConfig>) {
    if let Some(curve) = curve {
        check_positive(errors, &format!("curves.{}.k", key), curve.k);
        if let Some(x0) = curve.x0 {
            if !x0.is_finite() {
                errors.push(format!("scoring.curves.{}.x0: must be a finite number", key));
            }
        }
    }
}

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
///
/// Ladder ordering is checked on the resolved values, so a file that only
/// raises `review` above the default `conditional` is reported too.
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref weights) = config.weights {
        check_non_negative(&mut errors, "weights.financial", weights.financial);
        check_non_negative(&mut errors, "weights.digital", weights.digital);
        check_non_negative(&mut errors, "weights.commercial_legal", weights.commercial_legal);
    }
    let resolved = config.resolve();
    if resolved.weights.total() <= 0.0 {
        errors.push("scoring.weights: at least one weight must be positive".to_string());
    }

    if let Some(ref thresholds) = config.thresholds {
        check_range(&mut errors, "thresholds.approved", thresholds.approved, 0.0, 100.0);
        check_range(&mut errors, "thresholds.conditional", thresholds.conditional, 0.0, 100.0);
        check_range(&mut errors, "thresholds.review", thresholds.review, 0.0, 100.0);
    }
    let ladder = resolved.thresholds;
    if !(ladder.approved >= ladder.conditional && ladder.conditional >= ladder.review) {
        errors.push(format!(
            "scoring.thresholds: must satisfy approved >= conditional >= review, got {} / {} / {}",
            ladder.approved, ladder.conditional, ladder.review
        ));
    }

    if let Some(ref requirements) = config.requirements {
        check_range(&mut errors, "requirements.coverage_min", requirements.coverage_min, 0.0, 1.0);
        check_positive(&mut errors, "requirements.dscr_min", requirements.dscr_min);
        if let Some(dsr) = requirements.dsr_max {
            if !(dsr > 0.0 && dsr <= 1.0) {
                errors.push(format!(
                    "scoring.requirements.dsr_max: must be in (0, 1], got {}",
                    dsr
                ));
            }
        }
    }

    check_range(&mut errors, "low_coverage_cap", config.low_coverage_cap, 0.0, 100.0);
    check_positive(&mut errors, "capacity_share", config.capacity_share);

    if let Some(ref limits) = config.amount_limits {
        check_non_negative(&mut errors, "amount_limits.sales_multiplier", limits.sales_multiplier);
        check_non_negative(&mut errors, "amount_limits.cfo_multiplier", limits.cfo_multiplier);
    }

    if let Some(ref curves) = config.curves {
        check_curve(&mut errors, "net_margin", &curves.net_margin);
        check_curve(&mut errors, "inventory_turnover", &curves.inventory_turnover);
        check_curve(&mut errors, "cash_margin", &curves.cash_margin);
    }

    if let Some(ref calibration) = config.calibration {
        for (key, value) in [("a", calibration.a), ("b", calibration.b)] {
            if let Some(v) = value {
                if !v.is_finite() {
                    errors.push(format!("scoring.calibration.{}: must be a finite number", key));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
