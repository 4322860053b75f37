//! Confirmed proforma invoices, per company.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;

use odoo_sheets::config::{connect, init_logging, Args};
use odoo_sheets::dates::DateRange;
use odoo_sheets::reports::pi_data;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let default = pi_data::default_range(DateRange::month_to_date(Local::now().date_naive()));
    let range = args.range(default)?;
    log::info!("Using FROM_DATE={}, TO_DATE={}", range.start_of_day(), range.end_of_day());

    let pipeline = connect(&args).await.context("Failed to connect to odoo and google sheets")?;
    pi_data::run(&pipeline, &range).await.context("pi_data failed")?;
    Ok(())
}
