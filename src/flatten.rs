//! Turns nested `web_search_read` records into flat rows.
//!
//! Each report declares a `const` table of [`Column`]s; the column order of
//! that table is the column order of the published sheet, independent of the
//! order fields come back from the server.

use serde_json::Value;

use crate::table::{Cell, FlatRow, Table};

pub type Record = serde_json::Map<String, Value>;

const JOIN_SEPARATOR: &str = " / ";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    /// The field's value as is.
    Scalar(&'static str),
    /// `field.display_name` of a many2one.
    DisplayName(&'static str),
    /// A scalar inside a nested object: `parent.field`.
    Nested {
        parent: &'static str,
        field: &'static str,
    },
    /// `parent.list[*].field` joined with `" / "`.
    Joined {
        parent: &'static str,
        list: &'static str,
        field: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub name: &'static str,
    pub rule: Rule,
}

impl Column {
    pub const fn scalar(name: &'static str, field: &'static str) -> Self {
        Column {
            name,
            rule: Rule::Scalar(field),
        }
    }

    pub const fn display_name(name: &'static str, field: &'static str) -> Self {
        Column {
            name,
            rule: Rule::DisplayName(field),
        }
    }

    pub const fn nested(name: &'static str, parent: &'static str, field: &'static str) -> Self {
        Column {
            name,
            rule: Rule::Nested { parent, field },
        }
    }

    pub const fn joined(
        name: &'static str,
        parent: &'static str,
        list: &'static str,
        field: &'static str,
    ) -> Self {
        Column {
            name,
            rule: Rule::Joined { parent, list, field },
        }
    }
}

/// Odoo uses `false` for "no value" on every field type.
fn is_falsy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::Object(map)) => map.is_empty(),
        _ => false,
    }
}

fn scalar_cell(value: Option<&Value>) -> Cell {
    if is_falsy(value) {
        return Cell::Empty;
    }
    match value {
        Some(Value::String(text)) => Cell::Text(text.clone()),
        Some(Value::Number(number)) => number.as_f64().map(Cell::Number).unwrap_or_default(),
        Some(Value::Bool(flag)) => Cell::Bool(*flag),
        Some(other) => Cell::Text(other.to_string()),
        None => Cell::Empty,
    }
}

fn scalar_text(value: Option<&Value>) -> String {
    scalar_cell(value).to_string()
}

fn nested<'a>(record: &'a Record, field: &str) -> Option<&'a Record> {
    match record.get(field) {
        Some(Value::Object(map)) if !map.is_empty() => Some(map),
        _ => None,
    }
}

impl Rule {
    pub fn extract(&self, record: &Record) -> Cell {
        match *self {
            Rule::Scalar(field) => scalar_cell(record.get(field)),
            Rule::DisplayName(field) => nested(record, field)
                .map(|object| scalar_cell(object.get("display_name")))
                .unwrap_or_default(),
            Rule::Nested { parent, field } => nested(record, parent)
                .map(|object| scalar_cell(object.get(field)))
                .unwrap_or_default(),
            Rule::Joined { parent, list, field } => {
                let Some(object) = nested(record, parent) else {
                    return Cell::Empty;
                };
                let joined = object
                    .get(list)
                    .and_then(Value::as_array)
                    .map(|items| {
                        items
                            .iter()
                            .map(|item| scalar_text(item.get(field)))
                            .collect::<Vec<_>>()
                            .join(JOIN_SEPARATOR)
                    })
                    .unwrap_or_default();
                if joined.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(joined)
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Flattener {
    columns: &'static [Column],
}

impl Flattener {
    pub const fn new(columns: &'static [Column]) -> Self {
        Flattener { columns }
    }

    pub fn header(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.to_string()).collect()
    }

    pub fn flatten(&self, record: &Record) -> FlatRow {
        self.columns.iter().map(|column| column.rule.extract(record)).collect()
    }

    pub fn table(&self, records: &[Record]) -> Table {
        let mut table = Table::new(self.header());
        for record in records {
            table.push(self.flatten(record));
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const COLUMNS: &[Column] = &[
        Column::scalar("Qty", "qty"),
        Column::display_name("Customer", "partner_id"),
        Column::joined("Invoices", "sale_order_line", "invoice_lines", "display_name"),
        Column::nested("Invoice Status", "sale_order_line", "invoice_status"),
        Column::joined("Bill Dates", "sale_order_line", "invoice_lines", "invoice_date"),
    ];

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn full_record() {
        let rec = record(json!({
            "id": 9,
            "qty": 1200,
            "partner_id": {"id": 4, "display_name": "ACME Ltd"},
            "sale_order_line": {
                "id": 77,
                "invoice_status": "invoiced",
                "invoice_lines": [
                    {"id": 1, "display_name": "INV/001", "invoice_date": "2025-07-02"},
                    {"id": 2, "display_name": "INV/002", "invoice_date": false}
                ]
            }
        }));
        let row = Flattener::new(COLUMNS).flatten(&rec);
        assert_eq!(
            row,
            vec![
                Cell::Number(1200.0),
                Cell::from("ACME Ltd"),
                Cell::from("INV/001 / INV/002"),
                Cell::from("invoiced"),
                Cell::from("2025-07-02 / "),
            ]
        );
    }

    #[test]
    fn missing_sources_become_empty() {
        let rec = record(json!({"partner_id": false, "sale_order_line": false}));
        let row = Flattener::new(COLUMNS).flatten(&rec);
        assert_eq!(row.len(), COLUMNS.len());
        assert!(row.iter().all(Cell::is_empty));

        let row = Flattener::new(COLUMNS).flatten(&Record::new());
        assert_eq!(row.len(), COLUMNS.len());
        assert!(row.iter().all(Cell::is_empty));
    }

    #[test]
    fn table_keeps_column_order_and_count() {
        let records = vec![
            record(json!({"qty": 1, "partner_id": {"display_name": "B"}})),
            record(json!({"partner_id": {"display_name": "A"}, "qty": 2})),
            record(json!({})),
        ];
        let table = Flattener::new(COLUMNS).table(&records);
        assert_eq!(table.len(), records.len());
        assert_eq!(
            table.columns,
            vec!["Qty", "Customer", "Invoices", "Invoice Status", "Bill Dates"]
        );
        assert_eq!(table.rows[1][0], Cell::Number(2.0));
        assert_eq!(table.rows[1][1], Cell::from("A"));
    }

    #[test]
    fn empty_invoice_list_is_empty_cell() {
        let rec = record(json!({"sale_order_line": {"invoice_status": "no", "invoice_lines": []}}));
        let row = Flattener::new(COLUMNS).flatten(&rec);
        assert_eq!(row[2], Cell::Empty);
        assert_eq!(row[3], Cell::from("no"));
    }
}
