//! Finished goods awaiting delivery, per company.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;

use odoo_sheets::config::{connect, init_logging, Args};
use odoo_sheets::dates::DateRange;
use odoo_sheets::reports::fg_delivery;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let range = args.range(DateRange::month_to_date(Local::now().date_naive()))?;
    log::info!("Using FROM_DATE={}, TO_DATE={}", range.start_of_day(), range.end_of_day());

    let pipeline = connect(&args).await.context("Failed to connect to odoo and google sheets")?;
    fg_delivery::run(&pipeline, &range).await.context("fg_delivery failed")?;
    Ok(())
}
