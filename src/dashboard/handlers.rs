//! Dashboard HTTP handler and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    dashboard::{
        aggregation::{fill_months, format_month_label, last_twelve_months},
        cards::stat_cards_view,
        charts::{DashboardChart, by_type_chart, charts_script, charts_view, monthly_totals_chart},
        queries::{DashboardStats, get_dashboard_stats, get_monthly_totals},
        tables::recent_donations_table,
    },
    donation::{Donation, DonationFilter, count_donations, query_donations},
    endpoints,
    html::{HeadElement, base, link},
    navigation::NavBar,
    pagination::Page,
    report::{DateRange, build_report},
    timezone::local_today,
};

/// How many donations the recent donations table shows.
const RECENT_DONATION_COUNT: u64 = 10;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Europe/London".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Holds all the data needed to render the dashboard.
struct DashboardData {
    stats: DashboardStats,
    charts: [DashboardChart; 2],
    recent_donations: Vec<Donation>,
}

/// Display a page with an overview of recent giving and outstanding work.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    match build_dashboard_data(today, &connection)? {
        Some(data) => Ok(dashboard_view(nav_bar, &data).into_response()),
        None => Ok(dashboard_no_data_view(nav_bar).into_response()),
    }
}

/// Fetches and builds all data needed for the dashboard display.
///
/// Returns `None` if no donations have been recorded.
fn build_dashboard_data(
    today: Date,
    connection: &Connection,
) -> Result<Option<DashboardData>, Error> {
    let donation_count = count_donations(&DonationFilter::default(), connection)
        .inspect_err(|error| tracing::error!("could not count donations: {error}"))?;

    if donation_count == 0 {
        return Ok(None);
    }

    let stats = get_dashboard_stats(today, connection)
        .inspect_err(|error| tracing::error!("could not get dashboard stats: {error}"))?;

    let months = last_twelve_months(today);
    let first_month = months.first().copied().unwrap_or(today);
    let monthly_totals = get_monthly_totals(first_month, connection)
        .inspect_err(|error| tracing::error!("could not get monthly totals: {error}"))?;
    let labels = months.iter().copied().map(format_month_label).collect();

    let report = build_report(
        DateRange {
            from: first_month,
            to: today,
        },
        connection,
    )
    .inspect_err(|error| tracing::error!("could not get totals by type: {error}"))?;

    let charts = [
        DashboardChart {
            id: "monthly-totals-chart",
            options: monthly_totals_chart(labels, &fill_months(&months, &monthly_totals))
                .to_string(),
        },
        DashboardChart {
            id: "by-type-chart",
            options: by_type_chart(&report.by_type).to_string(),
        },
    ];

    let recent_donations = query_donations(
        &DonationFilter::default(),
        Some(Page {
            number: 1,
            size: RECENT_DONATION_COUNT,
        }),
        connection,
    )
    .inspect_err(|error| tracing::error!("could not get recent donations: {error}"))?;

    Ok(Some(DashboardData {
        stats,
        charts,
        recent_donations,
    }))
}

/// Renders the dashboard page when no donations exist.
fn dashboard_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();
    let donations_link = link(endpoints::DONATIONS_VIEW, "record one by hand");
    let checkout_link = link(endpoints::CHECKOUT_VIEW, "checkout page");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Charts will show up here once the first donation arrives through the "
                (checkout_link) ". You can also " (donations_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

fn dashboard_view(nav_bar: NavBar, data: &DashboardData) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (stat_cards_view(&data.stats))
            (charts_view(&data.charts))
            (recent_donations_table(&data.recent_donations))
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(&data.charts),
    ];

    base("Dashboard", &scripts, &content)
}
