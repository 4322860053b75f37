//! Slider-wise order release summary (STD/SPEC) into SLD_DF.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;

use odoo_sheets::config::{init_logging, Args};
use odoo_sheets::reports::slider;
use odoo_sheets::sheets::GoogleSheets;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let window = args.range(slider::window(Local::now().date_naive()))?;
    log::info!("Summarising releases from {} to {}", window.from_date(), window.to_date());

    let sheets = GoogleSheets::from_service_account_file(&args.credentials)
        .await
        .context("Failed to authorise google sheets")?;
    let outcome = slider::run(&sheets, window).await.context("slider summary failed")?;
    log::info!("{:?}", outcome);
    Ok(())
}
