use std::path::Path;

use std::iter;

use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::Timelike;

use crate::error::{Error, Result};
use crate::table::{Cell, Table};

pub fn data_cell(data: &Data) -> Cell {
    match data {
        Data::Int(value) => Cell::Number(*value as f64),
        Data::Float(value) => Cell::Number(*value),
        Data::String(value) if value.is_empty() => Cell::Empty,
        Data::String(value) => Cell::Text(value.to_owned()),
        Data::Bool(value) => Cell::Bool(*value),
        Data::DateTime(value) => match value.as_datetime() {
            Some(datetime) if datetime.time().num_seconds_from_midnight() == 0 => {
                Cell::Text(datetime.date().format("%Y-%m-%d").to_string())
            }
            Some(datetime) => Cell::Text(datetime.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Cell::Empty,
        },
        Data::DateTimeIso(value) | Data::DurationIso(value) => Cell::Text(value.to_owned()),
        Data::Error(_) | Data::Empty => Cell::Empty,
    }
}

/// First row is the header, the rest are data rows. Blank header cells get
/// positional names so every column stays addressable.
pub fn table_from_rows<'a, I>(rows: I) -> Table
where
    I: IntoIterator<Item = &'a [Data]>,
{
    let mut rows = rows.into_iter();
    let Some(header) = rows.next() else {
        return Table::default();
    };
    let columns = header
        .iter()
        .enumerate()
        .map(|(i, data)| match data_cell(data) {
            Cell::Empty => format!("Unnamed: {}", i),
            cell => cell.to_string(),
        })
        .collect();
    let mut table = Table::new(columns);
    for row in rows {
        let cells: Vec<Cell> = row.iter().map(data_cell).collect();
        if cells.iter().all(Cell::is_empty) {
            continue;
        }
        table.push(cells);
    }
    table
}

/// Rows of `range` anchored at A1. calamine starts a range at its first used
/// cell, so leading blank rows and columns are put back.
pub fn rows_from_a1(range: &Range<Data>) -> Vec<Vec<Data>> {
    let Some((top, left)) = range.start() else {
        return Vec::new();
    };
    let width = left as usize + range.width();
    let blank_rows = iter::repeat_with(|| vec![Data::Empty; width]).take(top as usize);
    let used_rows = range.rows().map(|row| {
        let mut cells = vec![Data::Empty; left as usize];
        cells.extend_from_slice(row);
        cells
    });
    blank_rows.chain(used_rows).collect()
}

/// Reads the sheet at `index` of an xlsx/xls/ods file into a table.
pub fn read_sheet(path: &Path, index: usize) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(index)
        .ok_or_else(|| Error::MissingSheet {
            path: path.display().to_string(),
            index,
        })??;
    let rows = rows_from_a1(&range);
    Ok(table_from_rows(rows.iter().map(Vec::as_slice)))
}
