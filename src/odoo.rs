use std::sync::LazyLock;
use std::time::Duration;

use log::{debug, info};
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{parse_response, Page, Request, Response, Session};
use crate::error::{Error, Result};
use crate::query::{Context, QuerySpec, Specification, COUNT_LIMIT};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";
const DOWNLOAD_TIMEOUT_SECONDS: u64 = 60;
const DOWNLOAD_TOKEN: &str = "dummy-because-api-expects-one";
static CSRF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"var odoo = \{\s*csrf_token: "([A-Za-z0-9]+)""#).expect("Hardcode regex pattern")
});

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Authenticated Odoo web session.
///
/// The session cookie set by `/web/session/authenticate` is kept by the
/// underlying client and sent with every later call.
pub struct Odoo {
    host: String,
    database: String,
    client: reqwest::Client,
    uid: Option<i64>,
}

impl Odoo {
    pub fn new(host: &str, database: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Odoo {
            host: host.trim_end_matches('/').to_string(),
            database: database.to_string(),
            client,
            uid: None,
        })
    }

    pub async fn new_and_login(
        host: &str,
        database: &str,
        user: &str,
        password: &str,
    ) -> Result<Self> {
        let mut odoo = Odoo::new(host, database)?;
        odoo.login(user, password).await?;
        Ok(odoo)
    }

    pub async fn login(&mut self, user: &str, password: &str) -> Result<i64> {
        let params = json!({
            "db": self.database,
            "login": user,
            "password": password,
        });
        let session: Response<Session> = self.post("/web/session/authenticate", &params).await?;
        let uid = session.result.uid.ok_or_else(|| Error::Authentication {
            database: self.database.clone(),
        })?;
        info!("Logged in to {} as uid {}", self.database, uid);
        self.uid = Some(uid);
        Ok(uid)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Logged-in user id.
    pub fn uid(&self) -> Result<i64> {
        self.uid.ok_or_else(|| Error::Authentication {
            database: self.database.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }

    async fn post<T>(&self, path: &str, params: &Value) -> Result<Response<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = self.url(path);
        debug!("POST {}", url);
        let body = self
            .client
            .post(&url)
            .json(&Request::call(params))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_response(&body)
    }

    pub async fn call_kw<T>(
        &self,
        model: &str,
        method: &str,
        args: Value,
        kwargs: Value,
    ) -> Result<Response<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let params = json!({
            "model": model,
            "method": method,
            "args": args,
            "kwargs": kwargs,
        });
        self.post(&format!("/web/dataset/call_kw/{}/{}", model, method), &params)
            .await
    }

    pub async fn web_search_read(
        &self,
        query: &QuerySpec,
        offset: usize,
        limit: usize,
        context: &Context,
    ) -> Result<Page> {
        let kwargs = json!({
            "domain": query.domain,
            "specification": query.specification,
            "offset": offset,
            "limit": limit,
            "order": "",
            "context": context,
            "count_limit": COUNT_LIMIT,
        });
        let page: Response<Page> = self
            .call_kw(query.model, "web_search_read", json!([]), kwargs)
            .await?;
        Ok(page.result)
    }

    pub async fn create(&self, model: &str, values: Value, context: &Context) -> Result<i64> {
        let created: Response<i64> = self
            .call_kw(model, "create", json!([values]), json!({ "context": context }))
            .await?;
        Ok(created.result)
    }

    /// `web_save` with an empty id list creates a new record with `values`.
    pub async fn web_save(
        &self,
        model: &str,
        ids: &[i64],
        values: Value,
        specification: &Specification,
        context: &Context,
    ) -> Result<Vec<serde_json::Map<String, Value>>> {
        let saved: Response<Vec<serde_json::Map<String, Value>>> = self
            .call_kw(
                model,
                "web_save",
                json!([ids, values]),
                json!({ "context": context, "specification": specification }),
            )
            .await?;
        Ok(saved.result)
    }

    pub async fn call_button(
        &self,
        model: &str,
        method: &str,
        ids: &[i64],
        context: &Context,
    ) -> Result<Value> {
        let params = json!({
            "model": model,
            "method": method,
            "args": [ids],
            "kwargs": { "context": context },
        });
        let action: Response<Value> = self.post("/web/dataset/call_button", &params).await?;
        Ok(action.result)
    }

    /// Scrapes the CSRF token out of the web client bootstrap page.
    pub async fn csrf_token(&self) -> Result<String> {
        let url = self.url("/web");
        let html = self.client.get(&url).send().await?.text().await?;
        extract_csrf_token(&html).ok_or(Error::MissingCsrfToken { url })
    }

    /// Fetches a generated xlsx report through `/report/download`.
    pub async fn download_report(
        &self,
        report_path: &str,
        context: &Context,
        csrf_token: &str,
    ) -> Result<Vec<u8>> {
        let data = serde_json::to_string(&json!([report_path, "xlsx"]))?;
        let context = serde_json::to_string(context)?;
        let form = [
            ("data", data.as_str()),
            ("context", context.as_str()),
            ("token", DOWNLOAD_TOKEN),
            ("csrf_token", csrf_token),
        ];
        let response = self
            .client
            .post(self.url("/report/download"))
            .header("X-CSRF-Token", csrf_token)
            .header("Referer", self.url("/web"))
            .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECONDS))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if status != reqwest::StatusCode::OK || !content_type.contains(XLSX_CONTENT_TYPE) {
            return Err(Error::DownloadFailed {
                status: status.as_u16(),
                content_type,
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

pub fn extract_csrf_token(html: &str) -> Option<String> {
    CSRF_PATTERN
        .captures(html)
        .and_then(|captures| captures.get(1))
        .map(|token| token.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csrf_token_from_bootstrap_page() {
        let html = r#"<script type="text/javascript">
            var odoo = {
                csrf_token: "3f2a9c0d1e8b7a6f5c4d3e2f1a0b9c8d7e6f5a4bo1760000000",
                debug: "",
            };
        </script>"#;
        assert_eq!(
            extract_csrf_token(html).as_deref(),
            Some("3f2a9c0d1e8b7a6f5c4d3e2f1a0b9c8d7e6f5a4bo1760000000")
        );
    }

    #[test]
    fn csrf_token_absent() {
        assert!(extract_csrf_token("<html><body>login</body></html>").is_none());
    }

    #[test]
    fn host_is_normalized() {
        let odoo = Odoo::new("https://erp.example.com/", "prod").unwrap();
        assert_eq!(odoo.host(), "https://erp.example.com");
        assert_eq!(odoo.url("/web"), "https://erp.example.com/web");
        assert!(odoo.uid().is_err());
    }
}
