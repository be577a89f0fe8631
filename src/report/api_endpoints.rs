//! Machine-readable reports: JSON and per-section CSV downloads.

use axum::{Json, extract::State, response::Response};
use axum_extra::extract::Query;
use serde::Deserialize;
use time::Date;

use crate::{Error, export::csv_response, money::pence_to_decimal_string};

use super::{
    queries::{Report, ReportSection},
    reports_page::{ReportQuery, ReportsState, load_report},
};

const REPORT_EXPORT_HEADERS: [&str; 3] = ["label", "amount", "count"];

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReportExportQuery {
    pub from: Option<Date>,
    pub to: Option<Date>,
    pub section: ReportSection,
}

/// The report for the query's date range as JSON, amounts in pence.
pub async fn get_report_json(
    State(state): State<ReportsState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Report>, Error> {
    load_report(&state, query).map(Json)
}

/// Download one section of the report as CSV, amounts in pounds.
pub async fn export_report_endpoint(
    State(state): State<ReportsState>,
    Query(query): Query<ReportExportQuery>,
) -> Result<Response, Error> {
    let report = load_report(
        &state,
        ReportQuery {
            from: query.from,
            to: query.to,
        },
    )?;

    let filename = format!(
        "report-{}-{}-to-{}.csv",
        query.section.as_str(),
        report.from,
        report.to
    );

    csv_response(
        &filename,
        &REPORT_EXPORT_HEADERS,
        report.section(query.section).iter().map(|row| {
            vec![
                row.label.clone(),
                pence_to_decimal_string(row.amount_pence),
                row.count.to_string(),
            ]
        }),
    )
}
