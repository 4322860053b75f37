//! Yesterday's production report for the dashboard.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;

use odoo_sheets::config::{connect, init_logging, Args};
use odoo_sheets::dates::DateRange;
use odoo_sheets::reports::production;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let range = args.range(DateRange::yesterday(Local::now().date_naive()))?;
    log::info!("Using FROM_DATE={}, TO_DATE={}", range.from_date(), range.to_date());

    let pipeline = connect(&args).await.context("Failed to connect to odoo and google sheets")?;
    let failed = production::run_dashboard(&pipeline, &range, &args.downloads).await?;
    if !failed.is_empty() {
        log::warn!("Finished with {} failed companies", failed.len());
    }
    Ok(())
}
