//! Lead CSV export

use std::borrow::Cow;

use chrono::NaiveDate;

use super::Objective;
use crate::models::lead::Lead;

pub const CSV_HEADER: &str = "Nome,Email,Telefone,Tipo,Data";

fn type_label(objective: Objective) -> &'static str {
    match objective {
        Objective::Client => "Cliente",
        Objective::Consultant => "Consultor",
    }
}

/// Cell prefixes a spreadsheet would evaluate as a formula
const FORMULA_PREFIXES: [char; 6] = ['=', '+', '-', '@', '\t', '\r'];

/// Quotes a field containing a comma, quote or line break; visitor text that
/// would start a formula is prefixed with `'`
fn escape(field: &str) -> Cow<'_, str> {
    let field: Cow<'_, str> = if field.starts_with(FORMULA_PREFIXES) {
        Cow::Owned(format!("'{field}"))
    } else {
        Cow::Borrowed(field)
    };

    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        field
    }
}

/// Renders leads as CSV with a fixed header row, one line per lead
pub fn leads_to_csv(leads: &[Lead]) -> String {
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');

    for lead in leads {
        let date = lead.created_at.format("%d/%m/%Y %H:%M").to_string();
        let row = [
            escape(&lead.name),
            escape(&lead.email),
            escape(lead.phone.as_deref().unwrap_or_default()),
            Cow::Borrowed(type_label(lead.lead_type)),
            Cow::Owned(date),
        ];
        csv.push_str(&row.join(","));
        csv.push('\n');
    }

    csv
}

/// `leads-YYYY-MM-DD.csv`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("leads-{}.csv", date.format("%Y-%m-%d"))
}
