pub mod a1;
pub mod model;

use std::path::Path;

use async_trait::async_trait;
use log::debug;
use url::Url;
use yup_oauth2::authenticator::DefaultAuthenticator;

use crate::error::{Error, Result};
use crate::publish::{Destination, SheetReader, SheetWriter};
use crate::sheets::model::{replace_batch, SheetProperties, Spreadsheet, ValueRange};
use crate::table::Cell;

const SCOPES: &[&str; 1] = &["https://www.googleapis.com/auth/spreadsheets"];
const API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Google Sheets v4 client authorised with a service account key.
pub struct GoogleSheets {
    authenticator: DefaultAuthenticator,
    http: reqwest::Client,
}

/// `'Sheet Name'` with embedded quotes doubled.
fn quote_worksheet(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(Error::SheetsApi {
        status: status.as_u16(),
        body,
    })
}

impl GoogleSheets {
    pub async fn from_service_account_file(path: impl AsRef<Path>) -> Result<Self> {
        let key = yup_oauth2::read_service_account_key(path).await?;
        let authenticator = yup_oauth2::ServiceAccountAuthenticator::builder(key)
            .build()
            .await?;
        Ok(GoogleSheets {
            authenticator,
            http: reqwest::Client::new(),
        })
    }

    async fn token(&self) -> Result<String> {
        let token = self.authenticator.token(SCOPES).await?;
        Ok(token.as_str().to_string())
    }

    fn spreadsheet_url(spreadsheet_id: &str, tail: &[&str]) -> Result<Url> {
        let mut url = Url::parse(API_URL)?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| Error::InvalidRange(API_URL.to_string()))?;
            segments.push(spreadsheet_id);
            for segment in tail {
                segments.push(segment);
            }
        }
        Ok(url)
    }

    /// Looks up a worksheet's numeric id and grid size by its title.
    pub async fn worksheet(&self, spreadsheet_id: &str, title: &str) -> Result<SheetProperties> {
        let url = Self::spreadsheet_url(spreadsheet_id, &[])?;
        let response = self
            .http
            .get(url)
            .query(&[("fields", "sheets.properties")])
            .bearer_auth(self.token().await?)
            .send()
            .await?;
        let spreadsheet: Spreadsheet = check(response).await?.json().await?;
        spreadsheet
            .sheets
            .into_iter()
            .map(|entry| entry.properties)
            .find(|properties| properties.title == title)
            .ok_or_else(|| Error::WorksheetNotFound {
                spreadsheet_id: spreadsheet_id.to_string(),
                worksheet: title.to_string(),
            })
    }
}

#[async_trait]
impl SheetReader for GoogleSheets {
    async fn read_values(&self, spreadsheet_id: &str, worksheet: &str) -> Result<Vec<Vec<String>>> {
        let url = Self::spreadsheet_url(spreadsheet_id, &["values", &quote_worksheet(worksheet)])?;
        debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .bearer_auth(self.token().await?)
            .send()
            .await?;
        let range: ValueRange = check(response).await?.json().await?;
        Ok(range.values)
    }
}

#[async_trait]
impl SheetWriter for GoogleSheets {
    async fn replace(
        &self,
        destination: &Destination,
        grid: Vec<Vec<Cell>>,
        stamp: &str,
    ) -> Result<()> {
        let sheet = self
            .worksheet(&destination.spreadsheet_id, &destination.worksheet)
            .await?;
        let batch = replace_batch(
            &sheet,
            destination.clear,
            &grid,
            destination.timestamp_cell,
            stamp,
        );
        let base = Self::spreadsheet_url(&destination.spreadsheet_id, &[])?;
        let url = format!("{}:batchUpdate", base);
        debug!("POST {} ({} requests)", url, batch.requests.len());
        let response = self
            .http
            .post(url)
            .bearer_auth(self.token().await?)
            .json(&batch)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worksheet_names_are_quoted() {
        assert_eq!(quote_worksheet("Sheet1"), "'Sheet1'");
        assert_eq!(quote_worksheet("Bob's data"), "'Bob''s data'");
    }

    #[test]
    fn values_url_escapes_worksheet() {
        let segments = ["values", &quote_worksheet("Zip Fg pack")];
        let url = GoogleSheets::spreadsheet_url("abc123", &segments).unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123/values/'Zip%20Fg%20pack'"
        );
    }
}
