//! The reports page: totals and breakdowns over a date range.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
    },
    money::format_pence,
    navigation::NavBar,
    timezone::local_today,
};

use super::{
    queries::{DateRange, Report, ReportSection, build_report},
    rows::ReportRow,
};

/// The state shared by the report page and the report API endpoints.
#[derive(Debug, Clone)]
pub struct ReportsState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Europe/London".
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The date range query string parameters, both optional.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct ReportQuery {
    pub from: Option<Date>,
    pub to: Option<Date>,
}

/// Resolve the query's range against today and build the report.
pub(super) fn load_report(state: &ReportsState, query: ReportQuery) -> Result<Report, Error> {
    let today = local_today(&state.local_timezone)?;
    let range = DateRange::resolve(query.from, query.to, today)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    build_report(range, &connection)
        .inspect_err(|error| tracing::error!("could not build report: {error}"))
}

pub async fn get_reports_page(
    State(state): State<ReportsState>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, Error> {
    let report = load_report(&state, query)?;

    Ok(reports_view(&report).into_response())
}

/// Turn stored codes like "BANK_TRANSFER" into "Bank Transfer", other labels are left as is.
fn display_label(label: &str) -> String {
    let is_code = label
        .chars()
        .all(|c| c.is_ascii_uppercase() || c == '_' || c.is_ascii_digit());

    if !is_code {
        return label.to_owned();
    }

    label
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_string() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn reports_view(report: &Report) -> Markup {
    let nav_bar = NavBar::new(endpoints::REPORTS_VIEW).into_html();
    let range_query = format!("from={}&to={}", report.from, report.to);
    let totals = report.totals;

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-6 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Reports" }

                    a
                        href={ (endpoints::REPORTS_API) "?" (range_query) }
                        class=(LINK_STYLE)
                    {
                        "View as JSON"
                    }
                }

                form
                    method="get"
                    action=(endpoints::REPORTS_VIEW)
                    class="flex flex-wrap gap-4 items-end"
                {
                    div
                    {
                        label for="from" class=(FORM_LABEL_STYLE) { "From" }
                        input id="from" type="date" name="from" value=(report.from) class=(FORM_TEXT_INPUT_STYLE);
                    }

                    div
                    {
                        label for="to" class=(FORM_LABEL_STYLE) { "To" }
                        input id="to" type="date" name="to" value=(report.to) class=(FORM_TEXT_INPUT_STYLE);
                    }

                    div
                    {
                        button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update" }
                    }
                }

                dl id="report-totals" class="grid grid-cols-2 gap-4 lg:grid-cols-4"
                {
                    (total_card("Donations", &format_pence(totals.donations_pence)))
                    (total_card("Fees covered", &format_pence(totals.fees_pence)))
                    (total_card("Masjid collections", &format_pence(totals.collections_pence)))
                    (total_card("Total raised", &format_pence(totals.total_pence)))
                }

                @for section in ReportSection::ALL {
                    (section_table(section, report.section(section), &range_query))
                }
            }
        }
    );

    base("Reports", &[], &content)
}

fn total_card(title: &str, value: &str) -> Markup {
    html!(
        div class="p-4 bg-white rounded shadow dark:bg-gray-800"
        {
            dt class="text-sm text-gray-500 dark:text-gray-400" { (title) }
            dd class="text-lg font-semibold" { (value) }
        }
    )
}

fn section_table(section: ReportSection, rows: &[ReportRow], range_query: &str) -> Markup {
    html!(
        section id=(section.as_str()) class="space-y-2"
        {
            header class="flex justify-between items-end"
            {
                h2 class="text-lg font-bold" { (section.title()) }

                a
                    href={
                        (endpoints::REPORTS_EXPORT) "?" (range_query) "&section=" (section.as_str())
                    }
                    class=(LINK_STYLE)
                {
                    "Export CSV"
                }
            }

            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Label" }
                        th scope="col" class="px-6 py-4 text-right" { "Amount" }
                        th scope="col" class="px-6 py-4 text-right" { "Count" }
                    }
                }

                tbody
                {
                    @for row in rows {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (display_label(&row.label)) }
                            td class="px-6 py-4 text-right" { (format_pence(row.amount_pence)) }
                            td class="px-6 py-4 text-right" { (row.count) }
                        }
                    }

                    @if rows.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan="3" class="px-6 py-4 text-center" { "Nothing recorded in this period." }
                        }
                    }
                }
            }
        }
    )
}
