//! Slider-wise order release summary.
//!
//! Reads the released-order worksheet (header on its second row), derives a
//! TZP product code per slider, classifies it STD/SPEC, and totals quantities
//! per (type, product, category, code, month, release date).

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::dates::DateRange;
use crate::error::{Error, Result};
use crate::table::{Cell, Table};

pub const HEADER_ROW: usize = 1;
pub const OTHERS: &str = "Others";
pub const STD_CODES: &[&str] = &[
    "TZP-1862", "TZP-2239", "TZP-294", "TZP-305", "TZP-331", "TZP-373", "TZP-684", "TZP-793",
    "TZP-794", "TZP-645", "TZP-574",
];

const RELEASE_DATE: &str = "Release Date";
const SLIDER: &str = "Slider";
const QUANTITY: &str = "Quantity (PCS)";
const UNIT_PRICE: &str = "Unit Price";
const PRODUCT: &str = "Product";
const CATEGORY: &str = "Category";

pub const OUTPUT_COLUMNS: &[&str] = &[
    "TZP_Type",
    "Product",
    "Category",
    "TZP_Code",
    "Month",
    "Release Date",
    "Quantity_PCS_sum",
    "Avg_Unit_Price",
];

static CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"TZP.*$").expect("Hardcode regex pattern"));

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%m/%d/%Y", "%d-%b-%Y", "%d %b %Y", "%b %d, %Y", "%Y/%m/%d",
];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%m/%d/%Y %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SliderType {
    Std,
    Spec,
}

impl SliderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SliderType::Std => "STD",
            SliderType::Spec => "SPEC",
        }
    }
}

/// Trailing `TZP...` part of a slider description, or `Others`. A single
/// trailing newline is ignored.
pub fn product_code(slider: &str) -> String {
    let slider = slider.strip_suffix('\n').unwrap_or(slider);
    match CODE_PATTERN.find(slider) {
        Some(found) => found.as_str().replace('\u{a0}', ""),
        None => OTHERS.to_string(),
    }
}

pub fn classify(code: &str) -> SliderType {
    if STD_CODES.contains(&code) {
        SliderType::Std
    } else {
        SliderType::Spec
    }
}

/// Release moment of a row. Plain dates are taken at midnight.
pub fn parse_release_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .map(|date| date.and_time(NaiveTime::MIN))
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        })
}

fn release_label(date: NaiveDateTime) -> String {
    if date.time() == NaiveTime::MIN {
        date.format("%Y-%m-%d").to_string()
    } else {
        date.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Lenient numeric coercion; anything unparseable is missing.
pub fn parse_number(value: &str) -> Option<f64> {
    let cleaned: String = value.trim().chars().filter(|ch| *ch != ',').collect();
    cleaned.parse::<f64>().ok().filter(|number| number.is_finite())
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct GroupKey {
    kind: SliderType,
    product: String,
    category: String,
    code: String,
    month: NaiveDate,
    date: NaiveDateTime,
}

#[derive(Debug, Default)]
struct Totals {
    quantity: f64,
    price_sum: f64,
    price_count: usize,
}

struct Columns {
    release_date: usize,
    slider: usize,
    quantity: usize,
    unit_price: usize,
    product: usize,
    category: usize,
}

impl Columns {
    fn locate(header: &[String]) -> Result<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|column| column.trim() == name)
                .ok_or_else(|| Error::MissingColumn(name.to_string()))
        };
        Ok(Columns {
            release_date: find(RELEASE_DATE)?,
            slider: find(SLIDER)?,
            quantity: find(QUANTITY)?,
            unit_price: find(UNIT_PRICE)?,
            product: find(PRODUCT)?,
            category: find(CATEGORY)?,
        })
    }
}

fn value_at(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or_default()
}

/// Summarises the raw worksheet grid. Returns an empty table when the grid
/// has no header or no row falls inside `window`.
pub fn summarize(grid: &[Vec<String>], window: DateRange) -> Result<Table> {
    let mut table = Table::new(OUTPUT_COLUMNS.iter().map(|name| name.to_string()).collect());
    let Some(header) = grid.get(HEADER_ROW) else {
        return Ok(table);
    };
    let columns = Columns::locate(header)?;

    // both ends compare at midnight, so a later time on the last day is out
    let from = window.from.and_time(NaiveTime::MIN);
    let to = window.to.and_time(NaiveTime::MIN);
    let mut groups: BTreeMap<GroupKey, Totals> = BTreeMap::new();
    for row in grid.iter().skip(HEADER_ROW + 1) {
        let Some(date) = parse_release_date(value_at(row, columns.release_date)) else {
            continue;
        };
        if date < from || date > to {
            continue;
        }
        let code = product_code(value_at(row, columns.slider));
        let key = GroupKey {
            kind: classify(&code),
            product: value_at(row, columns.product).to_string(),
            category: value_at(row, columns.category).to_string(),
            code,
            month: date.date().with_day(1).unwrap_or(date.date()),
            date,
        };
        let totals = groups.entry(key).or_default();
        if let Some(quantity) = parse_number(value_at(row, columns.quantity)) {
            totals.quantity += quantity;
        }
        if let Some(price) = parse_number(value_at(row, columns.unit_price)) {
            totals.price_sum += price;
            totals.price_count += 1;
        }
    }

    let mut summary: Vec<(GroupKey, Totals)> = groups.into_iter().collect();
    summary.sort_by(|(a_key, a), (b_key, b)| {
        a_key
            .kind
            .cmp(&b_key.kind)
            .then_with(|| b.quantity.total_cmp(&a.quantity))
    });

    for (key, totals) in summary {
        let average = if totals.price_count > 0 {
            Cell::Number(totals.price_sum / totals.price_count as f64)
        } else {
            Cell::Empty
        };
        table.push(vec![
            Cell::text(key.kind.as_str()),
            Cell::Text(key.product),
            Cell::Text(key.category),
            Cell::Text(key.code),
            Cell::Text(key.month.format("%Y-%m-%d").to_string()),
            Cell::Text(release_label(key.date)),
            Cell::Number(totals.quantity),
            average,
        ]);
    }
    Ok(table)
}
