//! Slider-wise order release summary, sourced from another spreadsheet.

use chrono::{NaiveDate, Utc};
use log::info;

use crate::aggregate::summarize;
use crate::dates::DateRange;
use crate::error::Result;
use crate::publish::{publish, Destination, Outcome, SheetReader, SheetWriter};
use crate::reports::DASHBOARD_SPREADSHEET;

pub const SOURCE_SPREADSHEET: &str = "1Rz5ctnSMSh_UGmhYkE_jX6zYGCabz28BEHaNnfbRn0I";
pub const SOURCE_WORKSHEET: &str = "Sheet1";

const TARGET_WORKSHEET: &str = "SLD_DF";
const CLEAR: &str = "A:H";
const TIMESTAMP: &str = "I1";

/// Release dates before this are never summarised.
pub fn window_start() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2025, 7, 1)
}

pub fn window(today: NaiveDate) -> DateRange {
    DateRange {
        from: window_start().unwrap_or(today),
        to: today,
    }
}

pub fn destination() -> Result<Destination> {
    Destination::new(DASHBOARD_SPREADSHEET, TARGET_WORKSHEET, CLEAR, TIMESTAMP)
}

pub async fn run<S>(sheets: &S, window: DateRange) -> Result<Outcome>
where
    S: SheetReader + SheetWriter + Sync,
{
    let grid = sheets.read_values(SOURCE_SPREADSHEET, SOURCE_WORKSHEET).await?;
    if grid.is_empty() {
        info!("No data found in source sheet {}", SOURCE_WORKSHEET);
        return Ok(Outcome::Skipped);
    }
    let table = summarize(&grid, window)?;
    info!("{} groups from {} source rows", table.len(), grid.len().saturating_sub(2));
    publish(sheets, &table, &destination()?, Utc::now()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publish::tests::RecordingWriter;
    use crate::sheets::a1::CellRef;
    use crate::table::Cell;
    use async_trait::async_trait;

    struct FakeSheets {
        source: Vec<Vec<String>>,
        writer: RecordingWriter,
    }

    #[async_trait]
    impl SheetReader for FakeSheets {
        async fn read_values(
            &self,
            spreadsheet_id: &str,
            worksheet: &str,
        ) -> Result<Vec<Vec<String>>> {
            assert_eq!(spreadsheet_id, SOURCE_SPREADSHEET);
            assert_eq!(worksheet, SOURCE_WORKSHEET);
            Ok(self.source.clone())
        }
    }

    #[async_trait]
    impl SheetWriter for FakeSheets {
        async fn replace(
            &self,
            destination: &Destination,
            grid: Vec<Vec<Cell>>,
            stamp: &str,
        ) -> Result<()> {
            self.writer.replace(destination, grid, stamp).await
        }
    }

    fn rows(values: &[&[&str]]) -> Vec<Vec<String>> {
        values
            .iter()
            .map(|row| row.iter().map(|value| value.to_string()).collect())
            .collect()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 20).unwrap()
    }

    #[test]
    fn window_runs_from_july() {
        let window = window(today());
        assert_eq!(window.from_date(), "2025-07-01");
        assert_eq!(window.to_date(), "2025-08-20");
    }

    #[tokio::test]
    async fn summary_lands_in_sld_df() {
        let sheets = FakeSheets {
            source: rows(&[
                &["Slider release"],
                &["Release Date", "Product", "Category", "Slider", "Quantity (PCS)", "Unit Price"],
                &["2025-08-01", "Zipper", "Metal", "#5 TZP-999", "40", "0.2"],
                &["2025-08-01", "Zipper", "Metal", "#5 TZP-305", "10", "0.1"],
            ]),
            writer: RecordingWriter::default(),
        };
        let outcome = run(&sheets, window(today())).await.unwrap();
        assert_eq!(outcome, Outcome::Written { rows: 2 });

        let calls = sheets.writer.calls.lock().unwrap();
        let (destination, grid, _) = &calls[0];
        assert_eq!(destination.worksheet, "SLD_DF");
        assert_eq!(destination.timestamp_cell, CellRef { row: 0, col: 8 });
        assert_eq!(grid[0][0], Cell::from("TZP_Type"));
        assert_eq!(grid[1][3], Cell::from("TZP-305"));
        assert_eq!(grid[2][3], Cell::from("TZP-999"));
    }

    #[tokio::test]
    async fn empty_source_is_skipped() {
        let sheets = FakeSheets {
            source: Vec::new(),
            writer: RecordingWriter::default(),
        };
        assert_eq!(run(&sheets, window(today())).await.unwrap(), Outcome::Skipped);
        assert!(sheets.writer.calls.lock().unwrap().is_empty());
    }
}
