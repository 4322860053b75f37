//! Server-generated xlsx reports.
//!
//! The report wizard (`mrp.report.custom`) is created and saved with the
//! report parameters, its button is pressed, and the resulting file is pulled
//! through `/report/download`. Each sheet of the file is then published to
//! its own worksheet.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use log::{error, info};
use serde_json::{json, Value};

use crate::dates::DateRange;
use crate::error::{Error, Result};
use crate::odoo::Odoo;
use crate::pipeline::Pipeline;
use crate::publish::{publish, Destination, Outcome, SheetWriter};
use crate::query::{Context, Specification};
use crate::workbook::read_sheet;

pub const REPORT_MODEL: &str = "mrp.report.custom";
pub const REPORT_BUTTON: &str = "action_generate_xlsx_report";
pub const FALLBACK_TEMPLATE: &str = "taps_manufacturing.pi_xls_template";
/// Pause between pressing the button and downloading.
pub const SETTLE_DELAY: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Company {
    pub id: i64,
    pub name: &'static str,
}

/// Sheet `sheet_index` of the downloaded file goes to `destination`.
#[derive(Debug, Clone)]
pub struct SheetTarget {
    pub sheet_index: usize,
    pub destination: Destination,
}

#[derive(Debug, Clone)]
pub struct CompanyJob {
    pub company: Company,
    pub sheets: Vec<SheetTarget>,
}

#[derive(Debug, Clone, Copy)]
pub struct XlsxReport {
    pub name: &'static str,
    pub report_type: &'static str,
    pub settle_delay: Duration,
}

impl XlsxReport {
    pub const fn new(name: &'static str, report_type: &'static str) -> Self {
        XlsxReport {
            name,
            report_type,
            settle_delay: SETTLE_DELAY,
        }
    }

    /// `{Company_Name}_{report_type}_{from}_to_{to}.xlsx`
    pub fn file_name(&self, company: &Company, range: &DateRange) -> String {
        format!(
            "{}_{}_{}_to_{}.xlsx",
            company.name.replace(' ', "_"),
            self.report_type,
            range.from_date(),
            range.to_date()
        )
    }
}

/// Template named by the button's action descriptor, or the fallback.
pub fn template_name(action: &Value) -> &str {
    action
        .get("report_name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .unwrap_or(FALLBACK_TEMPLATE)
}

pub fn report_path(template: &str, options: &Value, context: &Context) -> Result<String> {
    Ok(format!(
        "/report/xlsx/{}?options={}&context={}",
        template,
        serde_json::to_string(options)?,
        serde_json::to_string(context)?
    ))
}

fn saved_id(saved: &[serde_json::Map<String, Value>]) -> Result<i64> {
    saved
        .first()
        .and_then(|record| record.get("id"))
        .and_then(Value::as_i64)
        .ok_or_else(|| {
            Error::UnexpectedResponse(format!("{} web_save returned no id", REPORT_MODEL))
        })
}

/// Reads each target sheet of `file` and publishes it. Stops at the first
/// failure.
pub async fn publish_workbook<W>(
    writer: &W,
    file: &Path,
    sheets: &[SheetTarget],
) -> Result<Vec<Outcome>>
where
    W: SheetWriter + ?Sized,
{
    let mut outcomes = Vec::with_capacity(sheets.len());
    for target in sheets {
        let table = read_sheet(file, target.sheet_index)?;
        info!(
            "Loaded sheet {} of {} ({} rows)",
            target.sheet_index,
            file.display(),
            table.len()
        );
        outcomes.push(publish(writer, &table, &target.destination, Utc::now()).await?);
    }
    Ok(outcomes)
}

/// Produces the xlsx file of `report` for one company.
#[async_trait]
pub trait ReportGenerator {
    async fn generate(
        &self,
        report: &XlsxReport,
        company: &Company,
        range: &DateRange,
        dir: &Path,
    ) -> Result<PathBuf>;
}

#[async_trait]
impl ReportGenerator for Odoo {
    /// Runs the wizard for one company and stores the file under `dir`.
    async fn generate(
        &self,
        report: &XlsxReport,
        company: &Company,
        range: &DateRange,
        dir: &Path,
    ) -> Result<PathBuf> {
        let uid = self.uid()?;
        let created = self.create(REPORT_MODEL, json!({}), &Context::bare(uid)).await?;
        info!("Wizard created, ID = {}", created);

        let context = Context::localized(uid, vec![company.id]);
        let values = json!({
            "report_type": report.report_type,
            "date_from": range.from_date(),
            "date_to": range.to_date(),
        });
        let specification = Specification::new()
            .field("report_type")
            .field("date_from")
            .field("date_to");
        let saved = self
            .web_save(REPORT_MODEL, &[], values, &specification, &context)
            .await?;
        let wizard_id = saved_id(&saved)?;
        info!("Wizard saved, ID = {}", wizard_id);

        let action = self
            .call_button(REPORT_MODEL, REPORT_BUTTON, &[wizard_id], &context)
            .await?;
        info!("Report info received for {}", company.name);

        let csrf_token = self.csrf_token().await?;
        tokio::time::sleep(report.settle_delay).await;

        let options = json!({
            "date_from": range.from_date(),
            "date_to": range.to_date(),
            "company_id": company.id,
        });
        let download_context = context.with_active(REPORT_MODEL, wizard_id);
        let path = report_path(template_name(&action), &options, &download_context)?;
        let bytes = self
            .download_report(&path, &download_context, &csrf_token)
            .await?;

        tokio::fs::create_dir_all(dir).await?;
        let file = dir.join(report.file_name(company, range));
        tokio::fs::write(&file, bytes).await?;
        info!("Report downloaded for {}: {}", company.name, file.display());
        Ok(file)
    }
}

async fn run_job<G, W>(
    generator: &G,
    writer: &W,
    report: &XlsxReport,
    job: &CompanyJob,
    range: &DateRange,
    dir: &Path,
) -> Result<()>
where
    G: ReportGenerator + ?Sized,
    W: SheetWriter + ?Sized,
{
    let file = generator.generate(report, &job.company, range, dir).await?;
    publish_workbook(writer, &file, &job.sheets).await?;
    Ok(())
}

/// Runs every company job in order. A failing company is logged and
/// skipped; the companies that failed are returned.
pub async fn run_jobs<G, W>(
    generator: &G,
    writer: &W,
    report: &XlsxReport,
    jobs: &[CompanyJob],
    range: &DateRange,
    dir: &Path,
) -> Vec<Company>
where
    G: ReportGenerator + ?Sized,
    W: SheetWriter + ?Sized,
{
    info!(
        "{}: report type {} from {} to {}",
        report.name,
        report.report_type,
        range.from_date(),
        range.to_date()
    );
    let mut failed = Vec::new();
    for job in jobs {
        info!("Processing company: {} (ID={})", job.company.name, job.company.id);
        if let Err(err) = run_job(generator, writer, report, job, range, dir).await {
            error!("{} failed for {}: {}", report.name, job.company.name, err);
            failed.push(job.company);
        }
    }
    failed
}

impl<W> Pipeline<W>
where
    W: SheetWriter + Send + Sync,
{
    pub async fn run_download(
        &self,
        report: &XlsxReport,
        jobs: &[CompanyJob],
        range: &DateRange,
        dir: &Path,
    ) -> Vec<Company> {
        run_jobs(&self.odoo, &self.sheets, report, jobs, range, dir).await
    }
}
