//! Scheduled report extracts from Odoo, published to Google Sheets.
//!
//! Every report follows the same path: log in over JSON-RPC, page through a
//! query (or drive a report wizard and download its file), flatten into a
//! [`table::Table`], then replace a worksheet range in one batch update and
//! stamp the completion time.

pub mod aggregate;
pub mod api;
pub mod config;
pub mod dates;
pub mod download;
pub mod error;
pub mod fetch;
pub mod flatten;
pub mod odoo;
pub mod pipeline;
pub mod publish;
pub mod query;
pub mod reports;
pub mod sheets;
pub mod table;
pub mod workbook;

pub use error::{Error, Result};
pub use odoo::Odoo;
pub use pipeline::Pipeline;
