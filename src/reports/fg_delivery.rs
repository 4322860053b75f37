//! Finished goods packed and waiting for delivery, per company.

use crate::dates::DateRange;
use crate::error::Result;
use crate::flatten::Column;
use crate::pipeline::{Pipeline, RecordReport, Target};
use crate::publish::{Destination, SheetWriter};
use crate::query::{CompanyScope, Domain, Specification};
use crate::reports::{DASHBOARD_SPREADSHEET, RECORD_CLEAR, RECORD_TIMESTAMP};

const DESTINATIONS: &[(i64, &str)] = &[(1, "Zip Fg pack"), (3, "MT Fg pack")];

pub const COLUMNS: &[Column] = &[
    Column::scalar("Action Date", "action_date"),
    Column::scalar("Qty", "qty"),
    Column::scalar("Final Price", "final_price"),
    Column::display_name("Customer", "partner_id"),
    Column::scalar("Item", "fg_categ_type"),
    Column::display_name("OA", "oa_id"),
    Column::display_name("Product", "product_template_id"),
    Column::scalar("Slider Code", "slidercodesfg"),
    Column::joined(
        "Sale Order Line/Invoice Lines",
        "sale_order_line",
        "invoice_lines",
        "display_name",
    ),
    Column::nested("Sale Order Line/Invoice Status", "sale_order_line", "invoice_status"),
    Column::joined(
        "Sale Order Line/Invoice Lines/Invoice/Bill Date",
        "sale_order_line",
        "invoice_lines",
        "invoice_date",
    ),
];

/// `next_operation` is tested twice; the server accepts the domain as sent.
pub fn domain(range: &DateRange) -> Domain {
    Domain::new()
        .and()
        .leaf("next_operation", "=", "Delivery")
        .and()
        .and()
        .leaf("next_operation", "=", "Delivery")
        .leaf("state", "!=", "done")
        .leaf("state", "!=", "closed")
        .and()
        .leaf("action_date", ">=", range.start_of_day())
        .leaf("action_date", "<=", range.end_of_day())
}

pub fn specification() -> Specification {
    Specification::new()
        .field("action_date")
        .field("qty")
        .field("final_price")
        .display_name("partner_id")
        .field("fg_categ_type")
        .display_name("oa_id")
        .display_name("product_template_id")
        .field("slidercodesfg")
        .nested(
            "sale_order_line",
            Specification::new()
                .nested(
                    "invoice_lines",
                    Specification::new().field("display_name").field("invoice_date"),
                )
                .field("invoice_status"),
        )
}

pub const REPORT: RecordReport = RecordReport {
    name: "fg_delivery",
    model: "operation.details",
    domain,
    specification,
    columns: COLUMNS,
};

pub fn targets() -> Result<Vec<Target>> {
    DESTINATIONS
        .iter()
        .map(|&(company_id, worksheet)| {
            Ok(Target {
                scope: CompanyScope::single(company_id),
                destination: Destination::new(
                    DASHBOARD_SPREADSHEET,
                    worksheet,
                    RECORD_CLEAR,
                    RECORD_TIMESTAMP,
                )?,
            })
        })
        .collect()
}

pub async fn run<W>(pipeline: &Pipeline<W>, range: &DateRange) -> Result<()>
where
    W: SheetWriter + Send + Sync,
{
    pipeline.run_records_all(&REPORT, range, &targets()?).await
}
