//! Released order acceptances (`r_invs`): quantities on the first sheet,
//! values on the second.

use std::path::Path;

use chrono::NaiveDate;

use crate::dates::DateRange;
use crate::download::{Company, CompanyJob, SheetTarget, XlsxReport};
use crate::error::Result;
use crate::pipeline::Pipeline;
use crate::publish::{Destination, SheetWriter};
use crate::reports::{METAL_TRIMS, ORDER_SPREADSHEET, ZIPPER};

pub const REPORT: XlsxReport = XlsxReport::new("order_released", "r_invs");

/// Days into a month during which the previous month is still reported.
pub const GRACE_DAYS: u32 = 2;

const TIMESTAMP: &str = "AC2";

pub fn default_range(today: NaiveDate) -> DateRange {
    DateRange::month_to_date_with_grace(today, GRACE_DAYS)
}

fn job(company: Company, data_sheet: &str, value_sheet: &str) -> Result<CompanyJob> {
    Ok(CompanyJob {
        company,
        sheets: vec![
            SheetTarget {
                sheet_index: 0,
                destination: Destination::new(ORDER_SPREADSHEET, data_sheet, "", TIMESTAMP)?,
            },
            SheetTarget {
                sheet_index: 1,
                destination: Destination::new(ORDER_SPREADSHEET, value_sheet, "A:AC", TIMESTAMP)?,
            },
        ],
    })
}

pub fn jobs() -> Result<Vec<CompanyJob>> {
    Ok(vec![
        job(ZIPPER, "OA Data", "OA Value")?,
        job(METAL_TRIMS, "MT OA Data", "MT OA Value")?,
    ])
}

/// Returns the companies whose report could not be produced.
pub async fn run<W>(
    pipeline: &Pipeline<W>,
    range: &DateRange,
    downloads: &Path,
) -> Result<Vec<Company>>
where
    W: SheetWriter + Send + Sync,
{
    Ok(pipeline.run_download(&REPORT, &jobs()?, range, downloads).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::a1::ClearRange;

    #[test]
    fn two_sheets_per_company() {
        let jobs = jobs().unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].company, ZIPPER);
        let data = &jobs[0].sheets[0];
        assert_eq!(data.sheet_index, 0);
        assert_eq!(data.destination.worksheet, "OA Data");
        assert_eq!(data.destination.clear, ClearRange::Sheet);
        let value = &jobs[1].sheets[1];
        assert_eq!(value.sheet_index, 1);
        assert_eq!(value.destination.worksheet, "MT OA Value");
        assert_eq!(value.destination.clear, ClearRange::Columns { start: 0, end: 29 });
    }

    #[test]
    fn second_day_still_reports_last_month() {
        let range = default_range(NaiveDate::from_ymd_opt(2025, 9, 2).unwrap());
        assert_eq!(range.from_date(), "2025-08-01");
        assert_eq!(range.to_date(), "2025-08-31");
        let range = default_range(NaiveDate::from_ymd_opt(2025, 9, 3).unwrap());
        assert_eq!(range.from_date(), "2025-09-01");
    }

    #[test]
    fn file_name_for_metal_trims() {
        let range = default_range(NaiveDate::from_ymd_opt(2025, 9, 20).unwrap());
        assert_eq!(
            REPORT.file_name(&METAL_TRIMS, &range),
            "Metal_Trims_r_invs_2025-09-01_to_2025-09-20.xlsx"
        );
    }
}
