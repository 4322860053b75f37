//! Released order acceptance report for both companies.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;

use odoo_sheets::config::{connect, init_logging, Args};
use odoo_sheets::reports::order_released;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let range = args.range(order_released::default_range(Local::now().date_naive()))?;
    log::info!("Using FROM_DATE={}, TO_DATE={}", range.from_date(), range.to_date());

    let pipeline = connect(&args).await.context("Failed to connect to odoo and google sheets")?;
    let failed = order_released::run(&pipeline, &range, &args.downloads).await?;
    if !failed.is_empty() {
        log::warn!("Finished with {} failed companies", failed.len());
    }
    Ok(())
}
