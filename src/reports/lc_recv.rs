//! Posted export invoices (LC receivable) across both companies.

use crate::dates::DateRange;
use crate::error::Result;
use crate::flatten::Column;
use crate::pipeline::{Pipeline, RecordReport, Target};
use crate::publish::{Destination, SheetWriter};
use crate::query::{CompanyScope, Domain, Specification};
use crate::reports::{DASHBOARD_SPREADSHEET, METAL_TRIMS, RECORD_CLEAR, RECORD_TIMESTAMP, ZIPPER};

const WORKSHEET: &str = "Lc recv";

pub const COLUMNS: &[Column] = &[
    Column::scalar("Delivery Date", "delivery_date"),
    Column::display_name("Incoterm", "invoice_incoterm_id"),
    Column::scalar("Invoice/Bill Date", "invoice_date"),
    Column::scalar("Metal Total", "m_total"),
    Column::scalar("Metal Total Qty", "m_total_q"),
    Column::scalar("Number", "name"),
    Column::display_name("Partner", "partner_id"),
    Column::display_name("Payment Terms", "invoice_payment_term_id"),
    Column::scalar("Qty Total", "qty_total"),
    Column::scalar("Status", "state"),
    Column::scalar("Total Value", "amount_total"),
    Column::scalar("Zipper Total", "z_total"),
    Column::scalar("Zipper Total Qty", "z_total_q"),
];

pub fn domain(range: &DateRange) -> Domain {
    Domain::new()
        .and()
        .leaf("state", "=", "posted")
        .and()
        .leaf("invoice_date", ">=", range.start_of_day())
        .leaf("invoice_date", "<=", range.end_of_day())
}

pub fn specification() -> Specification {
    Specification::new()
        .field("delivery_date")
        .display_name("invoice_incoterm_id")
        .field("invoice_date")
        .field("m_total")
        .field("m_total_q")
        .field("name")
        .display_name("partner_id")
        .display_name("invoice_payment_term_id")
        .field("qty_total")
        .field("state")
        .field("amount_total")
        .field("z_total")
        .field("z_total_q")
}

pub const REPORT: RecordReport = RecordReport {
    name: "lc_recv",
    model: "combine.invoice",
    domain,
    specification,
    columns: COLUMNS,
};

/// Both companies are visible in one query, acting as Zipper.
pub fn scope() -> CompanyScope {
    CompanyScope {
        allowed: vec![ZIPPER.id, METAL_TRIMS.id],
        current: ZIPPER.id,
    }
}

pub fn targets() -> Result<Vec<Target>> {
    Ok(vec![Target {
        scope: scope(),
        destination: Destination::new(
            DASHBOARD_SPREADSHEET,
            WORKSHEET,
            RECORD_CLEAR,
            RECORD_TIMESTAMP,
        )?,
    }])
}

pub async fn run<W>(pipeline: &Pipeline<W>, range: &DateRange) -> Result<()>
where
    W: SheetWriter + Send + Sync,
{
    pipeline.run_records_all(&REPORT, range, &targets()?).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Context;
    use crate::table::Cell;
    use serde_json::json;

    #[test]
    fn one_scope_for_both_companies() {
        let targets = targets().unwrap();
        assert_eq!(targets.len(), 1);
        let context = serde_json::to_value(Context::search(2, &targets[0].scope)).unwrap();
        assert_eq!(context["allowed_company_ids"], json!([1, 3]));
        assert_eq!(context["current_company_id"], 1);
    }

    #[test]
    fn header_matches_columns() {
        let header = REPORT.flattener().header();
        assert_eq!(header.first().map(String::as_str), Some("Delivery Date"));
        assert_eq!(header.last().map(String::as_str), Some("Zipper Total Qty"));
        assert_eq!(header.len(), specification().len());
    }

    #[test]
    fn flattens_invoice() {
        let record = json!({
            "id": 11,
            "delivery_date": false,
            "invoice_incoterm_id": {"id": 1, "display_name": "FOB"},
            "invoice_date": "2025-07-10",
            "m_total": 0,
            "m_total_q": 0,
            "name": "CI/2025/0042",
            "partner_id": {"id": 4, "display_name": "Acme Garments"},
            "invoice_payment_term_id": false,
            "qty_total": 12000,
            "state": "posted",
            "amount_total": 3400.5,
            "z_total": 3400.5,
            "z_total_q": 12000
        });
        let row = REPORT.flattener().flatten(record.as_object().unwrap());
        assert_eq!(row[0], Cell::Empty);
        assert_eq!(row[1], Cell::from("FOB"));
        assert_eq!(row[3], Cell::Number(0.0));
        assert_eq!(row[5], Cell::from("CI/2025/0042"));
        assert_eq!(row[7], Cell::Empty);
        assert_eq!(row[10], Cell::Number(3400.5));
    }
}
