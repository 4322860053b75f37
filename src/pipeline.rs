use chrono::Utc;
use log::info;

use crate::dates::DateRange;
use crate::error::Result;
use crate::fetch::{fetch_all, PageSource, SearchRead};
use crate::flatten::{Column, Flattener};
use crate::odoo::Odoo;
use crate::publish::{publish, Destination, Outcome, SheetWriter};
use crate::query::{CompanyScope, Context, Domain, QuerySpec, Specification};

/// A `web_search_read` report: which model, how to filter and project it,
/// and how to flatten each record.
#[derive(Debug, Clone, Copy)]
pub struct RecordReport {
    pub name: &'static str,
    pub model: &'static str,
    pub domain: fn(&DateRange) -> Domain,
    pub specification: fn() -> Specification,
    pub columns: &'static [Column],
}

impl RecordReport {
    pub fn query(&self, range: &DateRange) -> QuerySpec {
        QuerySpec::new(self.model, (self.domain)(range), (self.specification)())
    }

    pub fn flattener(&self) -> Flattener {
        Flattener::new(self.columns)
    }
}

/// One company scope and the worksheet its rows go to.
#[derive(Debug, Clone)]
pub struct Target {
    pub scope: CompanyScope,
    pub destination: Destination,
}

/// Fetch every page from `source`, flatten, publish.
pub async fn collect_and_publish<S, W>(
    source: &S,
    page_size: usize,
    flattener: Flattener,
    writer: &W,
    destination: &Destination,
) -> Result<Outcome>
where
    S: PageSource + ?Sized,
    W: SheetWriter + ?Sized,
{
    let records = fetch_all(source, page_size).await?;
    let table = flattener.table(&records);
    publish(writer, &table, destination, Utc::now()).await
}

/// The per-run context: one ERP session and one spreadsheet client, passed
/// explicitly to every stage.
pub struct Pipeline<W> {
    pub odoo: Odoo,
    pub sheets: W,
}

impl<W> Pipeline<W>
where
    W: SheetWriter + Send + Sync,
{
    pub fn new(odoo: Odoo, sheets: W) -> Self {
        Pipeline { odoo, sheets }
    }

    pub async fn run_records(
        &self,
        report: &RecordReport,
        range: &DateRange,
        target: &Target,
    ) -> Result<Outcome> {
        let query = report.query(range);
        let source = SearchRead {
            odoo: &self.odoo,
            query: &query,
            context: Context::search(self.odoo.uid()?, &target.scope),
        };
        collect_and_publish(
            &source,
            query.page_size,
            report.flattener(),
            &self.sheets,
            &target.destination,
        )
        .await
    }

    /// Runs `report` for each target in order. The first failure aborts the
    /// run; targets already published stay published.
    pub async fn run_records_all(
        &self,
        report: &RecordReport,
        range: &DateRange,
        targets: &[Target],
    ) -> Result<()> {
        info!(
            "{}: fetching {} from {} to {}",
            report.name,
            report.model,
            range.start_of_day(),
            range.end_of_day()
        );
        for target in targets {
            let outcome = self.run_records(report, range, target).await?;
            info!("{} -> {}: {:?}", report.name, target.destination.worksheet, outcome);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::Record;
    use crate::publish::tests::RecordingWriter;
    use crate::table::Cell;
    use async_trait::async_trait;
    use serde_json::json;

    const COLUMNS: &[Column] = &[
        Column::scalar("Number", "name"),
        Column::display_name("Partner", "partner_id"),
    ];

    struct Pages(Vec<usize>);

    #[async_trait]
    impl PageSource for Pages {
        async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Record>> {
            let page = offset / limit;
            let size = self.0.get(page).copied().unwrap_or(0);
            Ok((0..size)
                .map(|i| {
                    json!({"name": format!("INV/{}", offset + i), "partner_id": false})
                        .as_object()
                        .cloned()
                        .unwrap()
                })
                .collect())
        }
    }

    fn destination() -> Destination {
        Destination::new("id", "Lc recv", "A:AC", "AC2").unwrap()
    }

    #[tokio::test]
    async fn rows_match_records() {
        let writer = RecordingWriter::default();
        let source = Pages(vec![3, 3, 1]);
        let flattener = Flattener::new(COLUMNS);
        let outcome = collect_and_publish(&source, 3, flattener, &writer, &destination())
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Written { rows: 7 });
        let calls = writer.calls.lock().unwrap();
        let grid = &calls[0].1;
        assert_eq!(grid.len(), 8);
        assert_eq!(grid[0], vec![Cell::from("Number"), Cell::from("Partner")]);
        assert_eq!(grid[7], vec![Cell::from("INV/6"), Cell::Empty]);
    }

    #[tokio::test]
    async fn nothing_fetched_nothing_written() {
        let writer = RecordingWriter::default();
        let source = Pages(vec![]);
        let flattener = Flattener::new(COLUMNS);
        let outcome = collect_and_publish(&source, 1000, flattener, &writer, &destination())
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Skipped);
        assert!(writer.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn report_builds_query() {
        fn domain(range: &DateRange) -> Domain {
            Domain::new().leaf("invoice_date", ">=", range.start_of_day())
        }
        fn specification() -> Specification {
            Specification::new().field("name").display_name("partner_id")
        }
        let report = RecordReport {
            name: "test",
            model: "combine.invoice",
            domain,
            specification,
            columns: COLUMNS,
        };
        let range = DateRange::month_to_date(chrono::NaiveDate::from_ymd_opt(2025, 7, 9).unwrap());
        let query = report.query(&range);
        assert_eq!(query.model, "combine.invoice");
        assert_eq!(query.page_size, 1000);
        assert_eq!(
            serde_json::to_value(&query.domain).unwrap(),
            json!([["invoice_date", ">=", "2025-07-01 00:00:00"]])
        );
        assert_eq!(report.flattener().header(), vec!["Number", "Partner"]);
    }
}
