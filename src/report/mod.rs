//! Reports on what has been raised, by type, payment method, status, channel and masjid.

mod api_endpoints;
mod queries;
mod reports_page;
mod rows;

pub use api_endpoints::{export_report_endpoint, get_report_json};
pub use queries::{DateRange, build_report};
pub use reports_page::get_reports_page;
pub use rows::{RawReportRow, ReportRow, merge_rows};
