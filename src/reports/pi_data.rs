//! Confirmed regular proforma invoices, per company.

use chrono::NaiveDate;

use crate::dates::DateRange;
use crate::error::Result;
use crate::flatten::Column;
use crate::pipeline::{Pipeline, RecordReport, Target};
use crate::publish::{Destination, SheetWriter};
use crate::query::{CompanyScope, Domain, Specification};
use crate::reports::{DASHBOARD_SPREADSHEET, RECORD_CLEAR, RECORD_TIMESTAMP};

const DESTINATIONS: &[(i64, &str)] = &[(1, "Zip Pi"), (3, "MT PI")];

pub const COLUMNS: &[Column] = &[
    Column::scalar("Already invoiced", "amount_invoiced"),
    Column::scalar("Buyer", "buyer_name"),
    Column::display_name("Customer", "partner_id"),
    Column::scalar("Order Reference", "name"),
    Column::scalar("Sales Order Ref.", "order_ref"),
    Column::display_name("Salesperson", "user_id"),
    Column::scalar("PI Date", "pi_date"),
    Column::scalar("Order Date", "date_order"),
    Column::scalar("Total", "amount_total"),
    Column::scalar("Total PI Quantity", "total_product_qty"),
];

/// Start of the proforma history kept on the sheet.
pub fn history_start() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2025, 6, 1)
}

/// Default window: from [`history_start`] through the end of `default`.
pub fn default_range(default: DateRange) -> DateRange {
    DateRange {
        from: history_start().unwrap_or(default.from),
        to: default.to,
    }
}

/// The trailing `pi_type` leaf sits outside the `&` chain and is sent as is.
pub fn domain(range: &DateRange) -> Domain {
    Domain::new()
        .and()
        .leaf("sales_type", "=", "sale")
        .and()
        .leaf("state", "=", "sale")
        .and()
        .leaf("pi_date", ">=", range.start_of_day())
        .leaf("pi_date", "<=", range.end_of_day())
        .leaf("pi_type", "=", "regular")
}

pub fn specification() -> Specification {
    Specification::new()
        .field("amount_invoiced")
        .field("buyer_name")
        .display_name("partner_id")
        .field("name")
        .field("order_ref")
        .display_name("user_id")
        .field("pi_date")
        .field("date_order")
        .field("amount_total")
        .field("total_product_qty")
}

pub const REPORT: RecordReport = RecordReport {
    name: "pi_data",
    model: "sale.order",
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
