use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::policy::Decision;
use crate::scoring::{Evaluation, Kpi};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a label to fit available width, accounting for Unicode
fn truncate_label(label: &str, max_width: usize) -> String {
    let chars: Vec<char> = label.chars().collect();
    if chars.len() <= max_width {
        label.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Whole currency units with thousands separators (1,234,567)
pub fn format_money(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Raw KPI value for display; undefined values show as "n/a"
pub fn format_raw(kpi: &Kpi) -> String {
    if !kpi.raw.is_finite() {
        return "n/a".to_string();
    }
    match kpi.unit {
        "%" | "years" | "months" => format!("{:.1}", kpi.raw),
        "ratio" | "CV" => format!("{:.2}", kpi.raw),
        _ => format!("{:.0}", kpi.raw),
    }
}

fn paint_decision(decision: Decision, use_colors: bool) -> String {
    let text = decision.as_str();
    if !use_colors {
        return text.to_string();
    }
    match decision {
        Decision::Approved => text.green().bold().to_string(),
        Decision::ApprovedWithConditions => text.green().to_string(),
        Decision::Review => text.yellow().to_string(),
        Decision::RejectedByPolicy => text.red().bold().to_string(),
    }
}

fn paint_check(ok: bool, use_colors: bool) -> String {
    match (ok, use_colors) {
        (true, true) => "pass".green().to_string(),
        (false, true) => "FAIL".red().bold().to_string(),
        (true, false) => "pass".to_string(),
        (false, false) => "FAIL".to_string(),
    }
}

/// One row per KPI: label, raw value, unit, score (or "missing")
/// Label column shrinks to fit narrow terminals; pipes get full labels.
pub fn format_kpi_rows(kpis: &[Kpi], use_colors: bool) -> String {
    let raw_width = 10;
    let unit_width = 8;
    let score_width = 7;
    let label_width = kpis.iter().map(|k| k.label.chars().count()).max().unwrap_or(0);
    let fixed = 4 + raw_width + unit_width + score_width + 3;
    let label_width = match get_terminal_width() {
        Some(w) if w > fixed + 10 => label_width.min(w - fixed),
        Some(_) => label_width.min(20),
        None => label_width,
    };

    kpis.iter()
        .map(|kpi| {
            let label = truncate_label(kpi.label, label_width);
            let score = if kpi.missing {
                "missing".to_string()
            } else {
                format!("{:.0}", kpi.score)
            };
            let line = format!(
                "    {:<lw$} {:>rw$} {:<uw$} {:>sw$}",
                label,
                format_raw(kpi),
                kpi.unit,
                score,
                lw = label_width,
                rw = raw_width,
                uw = unit_width,
                sw = score_width,
            );
            if use_colors && kpi.missing {
                line.dimmed().to_string()
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Multi-line human report of one evaluation
pub fn format_report(result: &Evaluation, use_colors: bool) -> String {
    let mut lines = Vec::new();

    let heading = format!("Dossier {} (as of {})", result.tax_id, result.as_of);
    lines.push(if use_colors {
        heading.bold().to_string()
    } else {
        heading
    });

    let capped = if result.coverage_capped {
        format!(" (capped from {})", result.uncapped_score)
    } else {
        String::new()
    };
    lines.push(format!("  Score: {}/100{}", result.global_score, capped));
    lines.push(format!("  Coverage: {:.0}%", result.coverage * 100.0));
    lines.push(format!(
        "  Decision: {}",
        paint_decision(result.decision, use_colors)
    ));
    lines.push(format!(
        "  PD: {:.2}%  Rating: {}",
        result.probability_of_default, result.rating
    ));

    for summary in &result.categories {
        lines.push(String::new());
        let title = format!(
            "  {} {:.0} ({}/{} usable)",
            summary.category, summary.score, summary.usable, summary.total
        );
        lines.push(if use_colors {
            title.cyan().to_string()
        } else {
            title
        });
        lines.push(format_kpi_rows(result.group(summary.category), use_colors));
    }

    lines.push(String::new());
    let gates = &result.gate_result;
    lines.push(format!(
        "  Gates: {}",
        paint_check(gates.pass, use_colors)
    ));
    let dscr = if gates.dscr.is_finite() {
        format!("{:.2}", gates.dscr)
    } else {
        "no debt service".to_string()
    };
    lines.push(format!(
        "    DSCR {}  DSR {:.4}  CFO (annual) {:.0}",
        dscr, gates.dsr_ratio, gates.cfo_annual
    ));
    for (name, ok) in gates.checks.as_list() {
        lines.push(format!("    {:<28} {}", name, paint_check(ok, use_colors)));
    }

    lines.push(String::new());
    let capacity = &result.capacity;
    lines.push("  Capacity (monthly)".to_string());
    lines.push(format!(
        "    Disposable {}  Assignable {}  Max installment {}  DSR {}%",
        format_money(capacity.disposable_monthly),
        format_money(capacity.assignable_capacity),
        format_money(capacity.max_installment),
        capacity.dsr_percent
    ));

    let limits = &result.amount_limits;
    lines.push("  Amount".to_string());
    lines.push(format!(
        "    Capacity cap {}  Sales cap {}  CFO cap {}",
        format_money(limits.capacity_cap),
        format_money(limits.sales_cap),
        format_money(limits.cfo_cap)
    ));
    lines.push(format!(
        "    Stability x{}  Regime x{}",
        limits.stability_factor, limits.regime_factor
    ));
    let recommended = format!("    Recommended: {}", format_money(result.recommended_amount));
    lines.push(if use_colors {
        recommended.bold().to_string()
    } else {
        recommended
    });

    lines.join("\n")
}

/// One tab-separated line for scripting (no headers, no colors)
/// Columns: tax_id, score, decision, rating, pd, coverage, recommended, failed gates
pub fn format_tsv(result: &Evaluation) -> String {
    let failed = result.gate_result.failed();
    format!(
        "{}\t{}\t{}\t{}\t{:.2}\t{:.2}\t{}\t{}",
        result.tax_id,
        result.global_score,
        result.decision,
        result.rating,
        result.probability_of_default,
        result.coverage,
        result.recommended_amount,
        if failed.is_empty() {
            "-".to_string()
        } else {
            failed.join(",")
        }
    )
}

/// Pretty JSON of the full evaluation
pub fn format_json(result: &Evaluation) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}
