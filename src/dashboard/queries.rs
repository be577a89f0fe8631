//! The figures behind the dashboard cards and charts.

use std::collections::HashMap;

use rusqlite::{Connection, named_params};
use time::Date;

use crate::{Error, money::Pence};

use super::aggregation::start_of_month;

/// The headline numbers shown on the dashboard cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct DashboardStats {
    /// Completed donations dated this month.
    pub raised_this_month_pence: Pence,
    pub donations_this_month: i64,
    /// Completed monthly or yearly donations, each of which is a live subscription.
    pub active_recurring: i64,
    pub open_water_projects: i64,
    pub open_sponsorships: i64,
}

pub(super) fn get_dashboard_stats(today: Date, connection: &Connection) -> Result<DashboardStats, Error> {
    let month_start = start_of_month(today);

    let (raised_this_month_pence, donations_this_month) = connection.query_row(
        "SELECT COALESCE(SUM(amount_pence), 0), COUNT(*) FROM donation \
        WHERE status = 'COMPLETED' AND date BETWEEN :from AND :to",
        named_params! {":from": month_start, ":to": today},
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let active_recurring = connection.query_row(
        "SELECT COUNT(*) FROM donation WHERE status = 'COMPLETED' AND frequency != 'ONE_OFF'",
        [],
        |row| row.get(0),
    )?;

    let open_water_projects = connection.query_row(
        "SELECT COUNT(*) FROM water_project_donation WHERE status IN ('PENDING', 'IN_PROGRESS')",
        [],
        |row| row.get(0),
    )?;

    let open_sponsorships = connection.query_row(
        "SELECT COUNT(*) FROM sponsorship_donation WHERE status IN ('PENDING', 'IN_PROGRESS')",
        [],
        |row| row.get(0),
    )?;

    Ok(DashboardStats {
        raised_this_month_pence,
        donations_this_month,
        active_recurring,
        open_water_projects,
        open_sponsorships,
    })
}

/// Completed donation totals keyed by the first day of their month, from `from` onwards.
pub(super) fn get_monthly_totals(
    from: Date,
    connection: &Connection,
) -> Result<HashMap<Date, Pence>, Error> {
    connection
        .prepare(
            "SELECT substr(date, 1, 7) || '-01' AS month, SUM(amount_pence) FROM donation \
            WHERE status = 'COMPLETED' AND date >= :from \
            GROUP BY month",
        )?
        .query_map(named_params! {":from": from}, |row| {
            Ok((row.get::<_, Date>(0)?, row.get::<_, Pence>(1)?))
        })?
        .map(|row| row.map_err(Error::from))
        .collect()
}
