#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Request to odoo or google api failed (error: {0})")]
    Http(#[from] reqwest::Error),
    #[error("Malformed json payload (error: {0})")]
    Json(#[from] serde_json::Error),
    #[error("Google service account authentication error (error: {0})")]
    GoogleAuth(#[from] yup_oauth2::Error),
    #[error("Cannot read workbook (error: {0})")]
    Workbook(#[from] calamine::Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid url (error: {0})")]
    Url(#[from] url::ParseError),
    #[error("Odoo rpc error: {message} ({detail})")]
    Rpc { message: String, detail: String },
    #[error("Odoo authentication failed for database {database}: no uid in response")]
    Authentication { database: String },
    #[error("Unexpected odoo response: {0}")]
    UnexpectedResponse(String),
    #[error("Missing csrf token in {url}")]
    MissingCsrfToken { url: String },
    #[error("Report download failed: status={status}, content-type={content_type}")]
    DownloadFailed { status: u16, content_type: String },
    #[error("Google api error: status={status}: {body}")]
    SheetsApi { status: u16, body: String },
    #[error("Worksheet '{worksheet}' not found in spreadsheet {spreadsheet_id}")]
    WorksheetNotFound {
        spreadsheet_id: String,
        worksheet: String,
    },
    #[error("Workbook {path} has no sheet at index {index}")]
    MissingSheet { path: String, index: usize },
    #[error("Invalid A1 range '{0}'")]
    InvalidRange(String),
    #[error("Environment variable {0} is not set")]
    MissingEnv(&'static str),
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Column '{0}' not found in header row")]
    MissingColumn(String),
}

pub type Result<T> = std::result::Result<T, Error>;
