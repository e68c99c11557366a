use chrono::NaiveDate;

use super::types::{Digital, Dossier, Financial, LegalRecord, LoanRequest, RegistryFacts};

pub const DEMO_TAX_ID: &str = "1790012345001";

impl Dossier {
    /// Reference small-business dossier used for demos and smoke tests.
    ///
    /// A blank or missing tax id falls back to [`DEMO_TAX_ID`]. Registry facts
    /// are left empty, as they would be before any registry lookup.
    pub fn demo(tax_id: Option<&str>) -> Self {
        let tax_id = tax_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(DEMO_TAX_ID)
            .to_string();

        Dossier {
            tax_id,
            financial: Financial {
                current_assets: 120_000.0,
                current_liabilities: 60_000.0,
                total_liabilities: 180_000.0,
                total_assets: 350_000.0,
                net_income: 32_000.0,
                sales: 280_000.0,
                cost_of_sales: 170_000.0,
                average_inventory: 40_000.0,
                operating_cash_flow: 21_000.0,
                cash_flow_period: None,
            },
            digital: Digital {
                star_rating: 4.3,
                review_count: 156.0,
                follower_count: 2_450.0,
                sentiment: 0.35,
            },
            legal: LegalRecord {
                monthly_tax_liability: vec![
                    1200.0, 1150.0, 1180.0, 1210.0, 1190.0, 1205.0, 1202.0, 1198.0, 1201.0,
                    1203.0, 1204.0, 1206.0,
                ],
                criminal_cases: 0,
                labor_cases: 1,
                business_start: NaiveDate::from_ymd_opt(2016, 5, 10),
                registry: RegistryFacts::default(),
            },
            request: LoanRequest {
                monthly_income: 42_000.0,
                monthly_expenses: 28_000.0,
                existing_installments: 3_500.0,
                monthly_rate: 0.025,
                periods: 24,
                proposed_installment: Some(1_200.0),
            },
        }
    }
}
