use super::config::ScoringOptions;
use super::curves::{floored_ratio, map_linear, map_linear_inv};
use super::kpi::{Kpi, KpiKey};
use crate::dossier::Dossier;

/// Operating cash flow over twelve months, using the dossier's own period
/// when it states one.
pub fn annual_cash_flow(dossier: &Dossier, options: &ScoringOptions) -> f64 {
    let financial = &dossier.financial;
    financial
        .cash_flow_period
        .unwrap_or(options.financial_period)
        .annualize(financial.operating_cash_flow)
}

pub fn financial_kpis(dossier: &Dossier, options: &ScoringOptions) -> Vec<Kpi> {
    let f = &dossier.financial;
    let curves = &options.curves;
    let cfo12 = annual_cash_flow(dossier, options);

    let liquidity = floored_ratio(f.current_assets, f.current_liabilities);
    let leverage = floored_ratio(f.total_liabilities, f.total_assets);
    let margin = floored_ratio(f.net_income, f.sales);
    let cash_margin = floored_ratio(cfo12, f.sales);

    let turnover = if f.cost_of_sales > 0.0 && f.average_inventory > 0.0 {
        let turns = floored_ratio(f.cost_of_sales, f.average_inventory);
        Kpi::scored(
            KpiKey::InventoryTurnover,
            turns,
            curves.inventory_turnover.score(turns),
        )
    } else {
        Kpi::missing(KpiKey::InventoryTurnover, f64::NAN)
    };

    let cash_score = if cfo12 <= 0.0 {
        0.0
    } else {
        curves.cash_margin.score(cash_margin)
    };

    vec![
        Kpi::scored(KpiKey::Liquidity, liquidity, map_linear(liquidity, 0.8, 2.0)),
        Kpi::scored(
            KpiKey::Leverage,
            leverage,
            map_linear_inv(leverage, 0.2, 0.8),
        ),
        Kpi::scored(
            KpiKey::NetMargin,
            margin * 100.0,
            curves.net_margin.score(margin),
        ),
        turnover,
        Kpi::scored(KpiKey::CashMargin, cash_margin * 100.0, cash_score),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dossier::Period;

    fn find(kpis: &[Kpi], key: KpiKey) -> &Kpi {
        kpis.iter().find(|k| k.key == key).unwrap()
    }

    #[test]
    fn test_demo_liquidity_at_upper_clamp() {
        let kpis = financial_kpis(&Dossier::demo(None), &ScoringOptions::default());
        let liquidity = find(&kpis, KpiKey::Liquidity);
        assert_eq!(liquidity.raw, 2.0);
        assert_eq!(liquidity.score, 100.0);
    }

    #[test]
    fn test_leverage_inverted() {
        let mut dossier = Dossier::demo(None);
        dossier.financial.total_liabilities = 175_000.0;
        dossier.financial.total_assets = 350_000.0;
        let kpis = financial_kpis(&dossier, &ScoringOptions::default());
        let leverage = find(&kpis, KpiKey::Leverage);
        assert_eq!(leverage.raw, 0.5);
        assert!((leverage.score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_net_margin_raw_is_percent() {
        let mut dossier = Dossier::demo(None);
        dossier.financial.net_income = 18_000.0;
        dossier.financial.sales = 300_000.0;
        let kpis = financial_kpis(&dossier, &ScoringOptions::default());
        let margin = find(&kpis, KpiKey::NetMargin);
        assert!((margin.raw - 6.0).abs() < 1e-9);
        assert!((margin.score - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_inventory_turnover_missing_without_data() {
        let mut dossier = Dossier::demo(None);
        dossier.financial.average_inventory = 0.0;
        let kpis = financial_kpis(&dossier, &ScoringOptions::default());
        let turnover = find(&kpis, KpiKey::InventoryTurnover);
        assert!(turnover.missing);
        assert!(turnover.raw.is_nan());
        assert_eq!(turnover.score, 0.0);

        dossier.financial.average_inventory = 40_000.0;
        dossier.financial.cost_of_sales = 0.0;
        let kpis = financial_kpis(&dossier, &ScoringOptions::default());
        assert!(find(&kpis, KpiKey::InventoryTurnover).missing);
    }

    #[test]
    fn test_inventory_turnover_present() {
        let kpis = financial_kpis(&Dossier::demo(None), &ScoringOptions::default());
        let turnover = find(&kpis, KpiKey::InventoryTurnover);
        assert!(!turnover.missing);
        assert!((turnover.raw - 4.25).abs() < 1e-9);
    }

    #[test]
    fn test_cash_margin_floor_on_non_positive_cfo() {
        let mut dossier = Dossier::demo(None);
        dossier.financial.operating_cash_flow = 0.0;
        let kpis = financial_kpis(&dossier, &ScoringOptions::default());
        assert_eq!(find(&kpis, KpiKey::CashMargin).score, 0.0);

        dossier.financial.operating_cash_flow = -5_000.0;
        let kpis = financial_kpis(&dossier, &ScoringOptions::default());
        assert_eq!(find(&kpis, KpiKey::CashMargin).score, 0.0);
    }

    #[test]
    fn test_monthly_cash_flow_annualized() {
        let mut dossier = Dossier::demo(None);
        dossier.financial.operating_cash_flow = 1_750.0;
        let options = ScoringOptions {
            financial_period: Period::Monthly,
            ..Default::default()
        };
        assert_eq!(annual_cash_flow(&dossier, &options), 21_000.0);

        dossier.financial.cash_flow_period = Some(Period::Annual);
        assert_eq!(annual_cash_flow(&dossier, &options), 1_750.0);
    }

    #[test]
    fn test_zero_denominators_stay_finite() {
        let dossier = Dossier::default();
        let kpis = financial_kpis(&dossier, &ScoringOptions::default());
        for kpi in kpis.iter().filter(|k| k.key != KpiKey::InventoryTurnover) {
            assert!(kpi.raw.is_finite(), "{:?}", kpi.key);
            assert!((0.0..=100.0).contains(&kpi.score));
        }
    }
}
