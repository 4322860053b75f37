use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use log::info;

use crate::error::Result;
use crate::sheets::a1::{CellRef, ClearRange};
use crate::table::{Cell, Table};

/// Asia/Dhaka, which has no daylight saving.
const LOCAL_OFFSET_SECONDS: i32 = 6 * 3600;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Where a table lands.
#[derive(Debug, Clone, PartialEq)]
pub struct Destination {
    pub spreadsheet_id: String,
    pub worksheet: String,
    pub clear: ClearRange,
    pub timestamp_cell: CellRef,
}

impl Destination {
    /// `clear` is an `A:AC` style column span, or empty for the whole sheet.
    pub fn new(
        spreadsheet_id: &str,
        worksheet: &str,
        clear: &str,
        timestamp_cell: &str,
    ) -> Result<Self> {
        Ok(Destination {
            spreadsheet_id: spreadsheet_id.to_string(),
            worksheet: worksheet.to_string(),
            clear: clear.parse()?,
            timestamp_cell: timestamp_cell.parse()?,
        })
    }
}

#[async_trait]
pub trait SheetWriter {
    /// Replaces the destination's clear range with `grid` (from A1) and
    /// writes `stamp` into its timestamp cell.
    async fn replace(
        &self,
        destination: &Destination,
        grid: Vec<Vec<Cell>>,
        stamp: &str,
    ) -> Result<()>;
}

#[async_trait]
pub trait SheetReader {
    /// Every row of a worksheet as formatted strings.
    async fn read_values(&self, spreadsheet_id: &str, worksheet: &str) -> Result<Vec<Vec<String>>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Skipped,
    Written { rows: usize },
}

pub fn local_timestamp(now: DateTime<Utc>) -> String {
    let offset = FixedOffset::east_opt(LOCAL_OFFSET_SECONDS).unwrap_or_else(|| Utc.fix());
    now.with_timezone(&offset).format(TIMESTAMP_FORMAT).to_string()
}

/// Writes `table` to `destination` unless it is empty. An empty table leaves
/// the worksheet untouched.
pub async fn publish<W>(
    writer: &W,
    table: &Table,
    destination: &Destination,
    now: DateTime<Utc>,
) -> Result<Outcome>
where
    W: SheetWriter + ?Sized,
{
    if table.is_empty() {
        info!("Skip: {} is empty, not pasting.", destination.worksheet);
        return Ok(Outcome::Skipped);
    }
    let stamp = local_timestamp(now);
    writer.replace(destination, table.grid(), &stamp).await?;
    info!(
        "Data pasted to {} ({} rows), timestamp {} at {}",
        destination.worksheet,
        table.len(),
        stamp,
        destination.timestamp_cell
    );
    Ok(Outcome::Written { rows: table.len() })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct RecordingWriter {
        pub calls: Mutex<Vec<(Destination, Vec<Vec<Cell>>, String)>>,
    }

    #[async_trait]
    impl SheetWriter for RecordingWriter {
        async fn replace(
            &self,
            destination: &Destination,
            grid: Vec<Vec<Cell>>,
            stamp: &str,
        ) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push((destination.clone(), grid, stamp.to_string()));
            Ok(())
        }
    }

    fn destination() -> Destination {
        Destination::new("sheet-id", "Lc recv", "A:AC", "AC2").unwrap()
    }

    #[tokio::test]
    async fn empty_table_is_not_written() {
        let writer = RecordingWriter::default();
        let table = Table::new(vec!["Number".into()]);
        let outcome = publish(&writer, &table, &destination(), Utc::now()).await.unwrap();
        assert_eq!(outcome, Outcome::Skipped);
        assert!(writer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn table_is_written_with_header_and_stamp() {
        let writer = RecordingWriter::default();
        let mut table = Table::new(vec!["Number".into(), "Total".into()]);
        table.push(vec![Cell::from("INV/1"), Cell::Number(10.0)]);
        table.push(vec![Cell::from("INV/2"), Cell::Number(20.0)]);
        let now = Utc.with_ymd_and_hms(2025, 7, 31, 20, 15, 0).unwrap();

        let outcome = publish(&writer, &table, &destination(), now).await.unwrap();
        assert_eq!(outcome, Outcome::Written { rows: 2 });

        let calls = writer.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (dest, grid, stamp) = &calls[0];
        assert_eq!(dest.worksheet, "Lc recv");
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[0], vec![Cell::from("Number"), Cell::from("Total")]);
        assert_eq!(stamp, "2025-08-01 02:15:00");
    }

    #[test]
    fn destination_parses_ranges() {
        let dest = Destination::new("id", "SLD_DF", "A:H", "I1").unwrap();
        assert_eq!(dest.clear, ClearRange::Columns { start: 0, end: 8 });
        assert_eq!(dest.timestamp_cell, CellRef { row: 0, col: 8 });
        assert!(Destination::new("id", "x", "A:H", "I").is_err());
    }
}
