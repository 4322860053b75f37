//! The scheduled reports: what each one reads and where it writes.

pub mod fg_delivery;
pub mod lc_recv;
pub mod order_released;
pub mod pi_data;
pub mod production;
pub mod slider;

use crate::download::Company;

/// Dashboard workbook most reports publish into.
pub const DASHBOARD_SPREADSHEET: &str = "1acV7UrmC8ogC54byMrKRTaD9i1b1Cf9QZ-H1qHU5ZZc";
/// Order-acceptance workbook.
pub const ORDER_SPREADSHEET: &str = "1uUcLk27P-wAtgGYrSy7rVFFnw3JpEiJKGAgZICbBd-k";

pub const ZIPPER: Company = Company { id: 1, name: "Zipper" };
pub const METAL_TRIMS: Company = Company {
    id: 3,
    name: "Metal Trims",
};

/// Column span cleared before record reports are written.
pub const RECORD_CLEAR: &str = "A:AC";
pub const RECORD_TIMESTAMP: &str = "AC2";
