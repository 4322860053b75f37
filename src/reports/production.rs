//! Production (`invs`) report, published both as the month's production data
//! and as yesterday's dashboard.

use std::path::Path;

use crate::dates::DateRange;
use crate::download::{Company, CompanyJob, SheetTarget, XlsxReport};
use crate::error::Result;
use crate::pipeline::Pipeline;
use crate::publish::{Destination, SheetWriter};
use crate::reports::{DASHBOARD_SPREADSHEET, METAL_TRIMS, ZIPPER};

pub const DATA: XlsxReport = XlsxReport::new("production_data", "invs");
pub const DASHBOARD: XlsxReport = XlsxReport::new("production_dashboard", "invs");

const CLEAR: &str = "A:AB";
const TIMESTAMP: &str = "AC2";

const DATA_SHEETS: &[(Company, &str)] =
    &[(ZIPPER, "Production Data"), (METAL_TRIMS, "MT_Production_QTY")];
const DASHBOARD_SHEETS: &[(Company, &str)] = &[(ZIPPER, "Zip_PDD"), (METAL_TRIMS, "MT_PDD")];

fn jobs(sheets: &[(Company, &str)]) -> Result<Vec<CompanyJob>> {
    sheets
        .iter()
        .map(|&(company, worksheet)| {
            Ok(CompanyJob {
                company,
                sheets: vec![SheetTarget {
                    sheet_index: 0,
                    destination: Destination::new(
                        DASHBOARD_SPREADSHEET,
                        worksheet,
                        CLEAR,
                        TIMESTAMP,
                    )?,
                }],
            })
        })
        .collect()
}

pub fn data_jobs() -> Result<Vec<CompanyJob>> {
    jobs(DATA_SHEETS)
}

pub fn dashboard_jobs() -> Result<Vec<CompanyJob>> {
    jobs(DASHBOARD_SHEETS)
}

pub async fn run_data<W>(
    pipeline: &Pipeline<W>,
    range: &DateRange,
    downloads: &Path,
) -> Result<Vec<Company>>
where
    W: SheetWriter + Send + Sync,
{
    Ok(pipeline.run_download(&DATA, &data_jobs()?, range, downloads).await)
}

pub async fn run_dashboard<W>(
    pipeline: &Pipeline<W>,
    range: &DateRange,
    downloads: &Path,
) -> Result<Vec<Company>>
where
    W: SheetWriter + Send + Sync,
{
    Ok(pipeline
        .run_download(&DASHBOARD, &dashboard_jobs()?, range, downloads)
        .await)
}
