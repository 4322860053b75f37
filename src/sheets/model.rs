//! Google Sheets v4 request/response bodies used by this crate.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::sheets::a1::{CellRef, ClearRange};
use crate::table::Cell;

#[derive(Deserialize, Debug, Default)]
pub struct Spreadsheet {
    #[serde(default)]
    pub sheets: Vec<SheetEntry>,
}

#[derive(Deserialize, Debug)]
pub struct SheetEntry {
    pub properties: SheetProperties,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    #[serde(default)]
    pub sheet_id: i64,
    pub title: String,
    #[serde(default)]
    pub grid_properties: GridProperties,
}

#[derive(Deserialize, Debug, Clone, Copy, Default)]
#[serde(rename_all = "camelCase")]
pub struct GridProperties {
    #[serde(default)]
    pub row_count: u32,
    #[serde(default)]
    pub column_count: u32,
}

#[derive(Deserialize, Debug, Default)]
pub struct ValueRange {
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

#[derive(Serialize, Debug)]
pub struct BatchUpdate {
    pub requests: Vec<Request>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    AppendDimension(AppendDimension),
    UpdateCells(UpdateCells),
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AppendDimension {
    pub sheet_id: i64,
    pub dimension: &'static str,
    pub length: u32,
}

#[skip_serializing_none]
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCells {
    pub rows: Vec<RowData>,
    pub fields: &'static str,
    pub range: Option<GridRange>,
    pub start: Option<GridCoordinate>,
}

#[skip_serializing_none]
#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GridRange {
    pub sheet_id: i64,
    pub start_column_index: Option<u32>,
    pub end_column_index: Option<u32>,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GridCoordinate {
    pub sheet_id: i64,
    pub row_index: u32,
    pub column_index: u32,
}

#[derive(Serialize, Debug)]
pub struct RowData {
    pub values: Vec<CellData>,
}

#[skip_serializing_none]
#[derive(Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CellData {
    pub user_entered_value: Option<ExtendedValue>,
    pub user_entered_format: Option<CellFormat>,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CellFormat {
    pub number_format: NumberFormat,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct NumberFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub pattern: &'static str,
}

const DATE_FORMAT: NumberFormat = NumberFormat {
    kind: "DATE",
    pattern: "yyyy-mm-dd",
};
const DATE_TIME_FORMAT: NumberFormat = NumberFormat {
    kind: "DATE_TIME",
    pattern: "yyyy-mm-dd hh:mm:ss",
};
const SECONDS_PER_DAY: f64 = 86_400.0;

/// `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS` text as a Sheets date serial (days
/// since 1899-12-30) plus the number format Sheets gives a typed-in date.
pub fn date_serial(text: &str) -> Option<(f64, NumberFormat)> {
    let (moment, format) = match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        Ok(date) => (date.and_time(NaiveTime::MIN), DATE_FORMAT),
        Err(_) => (
            NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").ok()?,
            DATE_TIME_FORMAT,
        ),
    };
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_time(NaiveTime::MIN);
    let seconds = (moment - epoch).num_seconds();
    Some((seconds as f64 / SECONDS_PER_DAY, format))
}

fn date_format(cell: &Cell) -> Option<NumberFormat> {
    match cell {
        Cell::Text(text) => date_serial(text).map(|(_, format)| format),
        _ => None,
    }
}

#[derive(Serialize, Debug, PartialEq)]
pub enum ExtendedValue {
    #[serde(rename = "stringValue")]
    String(String),
    #[serde(rename = "numberValue")]
    Number(f64),
    #[serde(rename = "boolValue")]
    Bool(bool),
}

impl From<&Cell> for CellData {
    fn from(cell: &Cell) -> Self {
        let value = match cell {
            Cell::Empty => None,
            Cell::Text(text) => match date_serial(text) {
                Some((serial, _)) => Some(ExtendedValue::Number(serial)),
                None => Some(ExtendedValue::String(text.clone())),
            },
            Cell::Number(number) if number.is_finite() => Some(ExtendedValue::Number(*number)),
            Cell::Number(_) => None,
            Cell::Bool(flag) => Some(ExtendedValue::Bool(*flag)),
        };
        CellData {
            user_entered_value: value,
            user_entered_format: None,
        }
    }
}

const VALUE_FIELDS: &str = "userEnteredValue";
const FORMAT_FIELDS: &str = "userEnteredFormat.numberFormat";

/// One atomic batch that replaces `clear` with `grid` (written from A1) and
/// stamps `stamp` into `stamp_cell`, growing the sheet first if needed.
///
/// Date-shaped text is written as a date serial and every data column holding
/// dates gets a date number format, which is what Sheets does with typed input.
/// The stamp stays plain text.
pub fn replace_batch(
    sheet: &SheetProperties,
    clear: ClearRange,
    grid: &[Vec<Cell>],
    stamp_cell: CellRef,
    stamp: &str,
) -> BatchUpdate {
    let width = grid.iter().map(Vec::len).max().unwrap_or(0) as u32;
    let needed_rows = (grid.len() as u32).max(stamp_cell.row + 1);
    let clear_end = match clear {
        ClearRange::Sheet => 0,
        ClearRange::Columns { end, .. } => end,
    };
    let needed_cols = width.max(stamp_cell.col + 1).max(clear_end);

    let mut requests = Vec::new();
    let grid_size = sheet.grid_properties;
    if needed_rows > grid_size.row_count {
        requests.push(Request::AppendDimension(AppendDimension {
            sheet_id: sheet.sheet_id,
            dimension: "ROWS",
            length: needed_rows - grid_size.row_count,
        }));
    }
    if needed_cols > grid_size.column_count {
        requests.push(Request::AppendDimension(AppendDimension {
            sheet_id: sheet.sheet_id,
            dimension: "COLUMNS",
            length: needed_cols - grid_size.column_count,
        }));
    }

    let first_column = match clear {
        ClearRange::Sheet => 0,
        ClearRange::Columns { start, .. } => start,
    };
    let range = match clear {
        ClearRange::Sheet => GridRange {
            sheet_id: sheet.sheet_id,
            start_column_index: None,
            end_column_index: None,
        },
        ClearRange::Columns { start, end } => GridRange {
            sheet_id: sheet.sheet_id,
            start_column_index: Some(start),
            end_column_index: Some(end.max(start + width)),
        },
    };
    let rows = grid
        .iter()
        .map(|row| RowData {
            values: row.iter().map(CellData::from).collect(),
        })
        .collect();
    requests.push(Request::UpdateCells(UpdateCells {
        rows,
        fields: VALUE_FIELDS,
        range: Some(range),
        start: None,
    }));
    for column in 0..width as usize {
        let formats: Vec<Option<NumberFormat>> = grid
            .iter()
            .skip(1)
            .map(|row| row.get(column).and_then(date_format))
            .collect();
        if formats.iter().all(Option::is_none) {
            continue;
        }
        let rows = formats
            .into_iter()
            .map(|format| RowData {
                values: vec![CellData {
                    user_entered_value: None,
                    user_entered_format: format.map(|number_format| CellFormat { number_format }),
                }],
            })
            .collect();
        requests.push(Request::UpdateCells(UpdateCells {
            rows,
            fields: FORMAT_FIELDS,
            range: None,
            start: Some(GridCoordinate {
                sheet_id: sheet.sheet_id,
                row_index: 1,
                column_index: first_column + column as u32,
            }),
        }));
    }
    requests.push(Request::UpdateCells(UpdateCells {
        rows: vec![RowData {
            values: vec![CellData {
                user_entered_value: Some(ExtendedValue::String(stamp.to_string())),
                user_entered_format: None,
            }],
        }],
        fields: VALUE_FIELDS,
        range: None,
        start: Some(GridCoordinate {
            sheet_id: sheet.sheet_id,
            row_index: stamp_cell.row,
            column_index: stamp_cell.col,
        }),
    }));
    BatchUpdate { requests }
}
