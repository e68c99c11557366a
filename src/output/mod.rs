pub mod formatter;

pub use formatter::{
    format_json, format_kpi_rows, format_money, format_raw, format_report,
    format_tsv, should_use_colors,
};
