use std::path::PathBuf;

use clap::Parser;

use crate::dates::DateRange;
use crate::error::{Error, Result};
use crate::odoo::Odoo;
use crate::pipeline::Pipeline;
use crate::sheets::GoogleSheets;

/// Command line shared by every report binary.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Args {
    /// First day of the report window (YYYY-MM-DD)
    #[arg(long = "from_date", env = "FROM_DATE")]
    pub from_date: Option<String>,

    /// Last day of the report window (YYYY-MM-DD)
    #[arg(long = "to_date", env = "TO_DATE")]
    pub to_date: Option<String>,

    /// Google service account key file
    #[arg(long, default_value = "gcreds.json")]
    pub credentials: PathBuf,

    /// Where downloaded report files are written
    #[arg(long, default_value = "./downloads")]
    pub downloads: PathBuf,
}

impl Args {
    pub fn range(&self, default: DateRange) -> Result<DateRange> {
        DateRange::resolve(self.from_date.as_deref(), self.to_date.as_deref(), default)
    }
}

/// Odoo connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OdooSettings {
    pub url: String,
    pub db: String,
    pub username: String,
    pub password: String,
}

impl OdooSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or(Error::MissingEnv(key))
        };
        Ok(OdooSettings {
            url: get("ODOO_URL")?,
            db: get("ODOO_DB")?,
            username: get("ODOO_USERNAME")?,
            password: get("ODOO_PASSWORD")?,
        })
    }

    pub async fn login(&self) -> Result<Odoo> {
        Odoo::new_and_login(&self.url, &self.db, &self.username, &self.password).await
    }
}

/// `RUST_LOG` wins; otherwise everything at info and above.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Logs in to Odoo and authorises the Sheets client.
pub async fn connect(args: &Args) -> Result<Pipeline<GoogleSheets>> {
    let odoo = OdooSettings::from_env()?.login().await?;
    let sheets = GoogleSheets::from_service_account_file(&args.credentials).await?;
    Ok(Pipeline::new(odoo, sheets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn settings_from_lookup() {
        let vars = env(&[
            ("ODOO_URL", "https://erp.example.com"),
            ("ODOO_DB", "prod"),
            ("ODOO_USERNAME", "bot"),
            ("ODOO_PASSWORD", "secret"),
        ]);
        let settings = OdooSettings::from_lookup(|key| vars.get(key).cloned()).unwrap();
        assert_eq!(settings.db, "prod");
        assert_eq!(settings.username, "bot");
    }

    #[test]
    fn missing_variable_is_named() {
        let vars = env(&[("ODOO_URL", "https://erp.example.com"), ("ODOO_DB", "")]);
        let err = OdooSettings::from_lookup(|key| vars.get(key).cloned()).unwrap_err();
        assert!(matches!(err, Error::MissingEnv("ODOO_DB")));
    }

    #[test]
    fn args_defaults_and_overrides() {
        let args = Args::try_parse_from(["lc_recv", "--from_date", "2025-06-01"]).unwrap();
        assert_eq!(args.credentials, PathBuf::from("gcreds.json"));
        assert_eq!(args.downloads, PathBuf::from("./downloads"));

        let today = chrono::NaiveDate::from_ymd_opt(2025, 7, 20).unwrap();
        let range = args.range(DateRange::month_to_date(today)).unwrap();
        assert_eq!(range.from_date(), "2025-06-01");
        assert_eq!(range.to_date(), "2025-07-20");
    }
}
