use async_trait::async_trait;
use log::info;

use crate::error::Result;
use crate::flatten::Record;
use crate::odoo::Odoo;
use crate::query::{Context, QuerySpec};

#[async_trait]
pub trait PageSource {
    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Record>>;

    /// Prefix for progress logging.
    fn label(&self) -> String {
        String::new()
    }
}

/// Reads every page of `source`, stopping at the first short page.
///
/// When the total is an exact multiple of `page_size` this issues one final
/// request that comes back empty.
pub async fn fetch_all<S>(source: &S, page_size: usize) -> Result<Vec<Record>>
where
    S: PageSource + ?Sized,
{
    let label = source.label();
    let mut records = Vec::new();
    let mut offset = 0;
    loop {
        let page = source.fetch_page(offset, page_size).await?;
        let fetched = page.len();
        records.extend(page);
        info!("{}Fetched {} records, total so far: {}", label, fetched, records.len());
        if fetched < page_size {
            break;
        }
        offset += page_size;
    }
    info!("{}Total records fetched: {}", label, records.len());
    Ok(records)
}

/// `web_search_read` over one query and context.
pub struct SearchRead<'a> {
    pub odoo: &'a Odoo,
    pub query: &'a QuerySpec,
    pub context: Context,
}

#[async_trait]
impl PageSource for SearchRead<'_> {
    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Record>> {
        let page = self
            .odoo
            .web_search_read(self.query, offset, limit, &self.context)
            .await?;
        Ok(page.records)
    }

    fn label(&self) -> String {
        match self.context.current_company_id {
            Some(company) => format!("[{} company {}] ", self.query.model, company),
            None => format!("[{}] ", self.query.model),
        }
    }
}
