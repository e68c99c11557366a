use serde_json::Value;

use crate::coerce;
use crate::dossier::{Dossier, Financial};

/// The `fields` object of an extracted statement, if it has one.
fn fields(statement: Option<&Value>) -> Option<&Value> {
    statement
        .and_then(|s| s.get("fields"))
        .filter(|f| f.is_object())
}

fn figure(fields: Option<&Value>, key: &str) -> Option<f64> {
    fields.and_then(|f| f.get(key)).and_then(coerce::number)
}

/// Financial record from the extracted balance sheet, income statement and
/// cash-flow statement. Figures a statement does not carry read as zero.
///
/// Average inventory is the mean of opening and closing inventory from the
/// income statement when either is present, else the balance-sheet
/// inventory.
pub fn financial_from_statements(
    balance: Option<&Value>,
    income: Option<&Value>,
    cash_flow: Option<&Value>,
) -> Financial {
    let balance = fields(balance);
    let income = fields(income);
    let cash_flow = fields(cash_flow);

    let opening = figure(income, "inventario_inicial");
    let closing = figure(income, "inventario_final");
    let average_inventory = if opening.is_some() || closing.is_some() {
        (opening.unwrap_or(0.0) + closing.unwrap_or(0.0)) / 2.0
    } else {
        figure(balance, "inventarios").unwrap_or(0.0)
    };

    Financial {
        current_assets: figure(balance, "activos_corrientes").unwrap_or(0.0),
        current_liabilities: figure(balance, "pasivos_corrientes").unwrap_or(0.0),
        total_liabilities: figure(balance, "pasivos_totales").unwrap_or(0.0),
        total_assets: figure(balance, "activos_totales").unwrap_or(0.0),
        net_income: figure(income, "utilidad_neta").unwrap_or(0.0),
        sales: figure(income, "ventas").unwrap_or(0.0),
        cost_of_sales: figure(income, "costo_ventas").unwrap_or(0.0),
        average_inventory,
        operating_cash_flow: figure(cash_flow, "flujo_operacion").unwrap_or(0.0),
        cash_flow_period: None,
    }
}

/// First `header_meta.ruc` found, checking balance, income, then cash flow.
pub fn tax_id_from_statements(
    balance: Option<&Value>,
    income: Option<&Value>,
    cash_flow: Option<&Value>,
) -> Option<String> {
    [balance, income, cash_flow].into_iter().find_map(|statement| {
        statement?
            .get("header_meta")?
            .get("ruc")
            .and_then(coerce::text)
    })
}

/// Dossier whose tax id and financial record come from the statements.
/// Digital, legal and request sections start empty.
pub fn dossier_from_statements(
    balance: Option<&Value>,
    income: Option<&Value>,
    cash_flow: Option<&Value>,
) -> Dossier {
    let dossier = Dossier {
        tax_id: tax_id_from_statements(balance, income, cash_flow).unwrap_or_default(),
        financial: financial_from_statements(balance, income, cash_flow),
        ..Default::default()
    };
    tracing::debug!(
        tax_id = %dossier.tax_id,
        balance = balance.is_some(),
        income = income.is_some(),
        cash_flow = cash_flow.is_some(),
        "dossier assembled from statements"
    );
    dossier
}
