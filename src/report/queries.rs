//! The grouped queries behind the reports page and its exports.

use rusqlite::{Connection, named_params};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, money::Pence};

use super::rows::{DEFAULT_CHANNEL_LABEL, DEFAULT_LABEL, RawReportRow, ReportRow, merge_rows};

/// An inclusive range of dates a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub from: Date,
    pub to: Date,
}

impl DateRange {
    /// Build a range from optional query parameters.
    ///
    /// A missing start defaults to the first day of `today`'s month and a
    /// missing end defaults to `today`.
    ///
    /// # Errors
    /// Returns [Error::InvalidDateRange] if the start is after the end.
    pub fn resolve(from: Option<Date>, to: Option<Date>, today: Date) -> Result<Self, Error> {
        let from = from.unwrap_or_else(|| today.replace_day(1).unwrap_or(today));
        let to = to.unwrap_or(today);

        if from > to {
            return Err(Error::InvalidDateRange);
        }

        Ok(Self { from, to })
    }
}

/// The headline figures for a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportTotals {
    /// Completed donations plus water-project and sponsorship donations that were not cancelled.
    pub donations_pence: Pence,
    pub donation_count: i64,
    /// Processing fees donors covered on completed donations.
    pub fees_pence: Pence,
    pub collections_pence: Pence,
    pub collection_count: i64,
    pub total_pence: Pence,
}

/// Everything raised over a date range, broken down several ways.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub from: Date,
    pub to: Date,
    pub totals: ReportTotals,
    /// Donation, water-project and sponsorship types side by side.
    pub by_type: Vec<ReportRow>,
    pub by_payment_method: Vec<ReportRow>,
    /// Every donation regardless of status, so failed and refunded amounts are visible.
    pub by_status: Vec<ReportRow>,
    pub by_channel: Vec<ReportRow>,
    pub by_masjid: Vec<ReportRow>,
}

impl Report {
    pub fn section(&self, section: ReportSection) -> &[ReportRow] {
        match section {
            ReportSection::ByType => &self.by_type,
            ReportSection::ByPaymentMethod => &self.by_payment_method,
            ReportSection::ByStatus => &self.by_status,
            ReportSection::ByChannel => &self.by_channel,
            ReportSection::ByMasjid => &self.by_masjid,
        }
    }
}

/// The breakdowns a report can be exported by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSection {
    ByType,
    ByPaymentMethod,
    ByStatus,
    ByChannel,
    ByMasjid,
}

impl ReportSection {
    pub const ALL: [ReportSection; 5] = [
        ReportSection::ByType,
        ReportSection::ByPaymentMethod,
        ReportSection::ByStatus,
        ReportSection::ByChannel,
        ReportSection::ByMasjid,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReportSection::ByType => "by_type",
            ReportSection::ByPaymentMethod => "by_payment_method",
            ReportSection::ByStatus => "by_status",
            ReportSection::ByChannel => "by_channel",
            ReportSection::ByMasjid => "by_masjid",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ReportSection::ByType => "By type",
            ReportSection::ByPaymentMethod => "By payment method",
            ReportSection::ByStatus => "By status",
            ReportSection::ByChannel => "By channel",
            ReportSection::ByMasjid => "By masjid",
        }
    }
}

const DONATIONS_BY_TYPE: &str = "SELECT donation_type, SUM(amount_pence), COUNT(*) FROM donation \
    WHERE status = 'COMPLETED' AND date BETWEEN :from AND :to \
    GROUP BY donation_type";

const WATER_PROJECTS_BY_TYPE: &str = "SELECT project_type, SUM(amount_pence), COUNT(*) \
    FROM water_project_donation \
    WHERE status != 'CANCELLED' AND created_at BETWEEN :from AND :to \
    GROUP BY project_type";

const SPONSORSHIPS_BY_TYPE: &str = "SELECT sponsorship_type, SUM(amount_pence), COUNT(*) \
    FROM sponsorship_donation \
    WHERE status != 'CANCELLED' AND created_at BETWEEN :from AND :to \
    GROUP BY sponsorship_type";

const DONATIONS_BY_PAYMENT_METHOD: &str = "SELECT payment_method, SUM(amount_pence), COUNT(*) \
    FROM donation \
    WHERE status = 'COMPLETED' AND date BETWEEN :from AND :to \
    GROUP BY payment_method";

const DONATIONS_BY_STATUS: &str = "SELECT status, SUM(amount_pence), COUNT(*) FROM donation \
    WHERE date BETWEEN :from AND :to \
    GROUP BY status";

const DONATIONS_BY_CHANNEL: &str = "SELECT collected_via, SUM(amount_pence), COUNT(*) \
    FROM donation \
    WHERE status = 'COMPLETED' AND date BETWEEN :from AND :to \
    GROUP BY collected_via";

const COLLECTIONS_BY_MASJID: &str = "SELECT masjid.name, SUM(collection.amount_pence), COUNT(collection.id) \
    FROM collection INNER JOIN masjid ON masjid.id = collection.masjid_id \
    WHERE collection.collected_on BETWEEN :from AND :to \
    GROUP BY collection.masjid_id";

const COMPLETED_FEES: &str = "SELECT SUM(fees_pence) FROM donation \
    WHERE status = 'COMPLETED' AND date BETWEEN :from AND :to";

fn query_grouped(
    sql: &str,
    range: DateRange,
    connection: &Connection,
) -> Result<Vec<RawReportRow>, Error> {
    connection
        .prepare(sql)?
        .query_map(named_params! {":from": range.from, ":to": range.to}, |row| {
            Ok(RawReportRow {
                label: row.get(0)?,
                amount_pence: row.get(1)?,
                count: row.get(2)?,
            })
        })?
        .map(|row| row.map_err(Error::from))
        .collect()
}

/// Run every grouped query for `range` and merge the results into a [Report].
pub fn build_report(range: DateRange, connection: &Connection) -> Result<Report, Error> {
    let mut type_rows = query_grouped(DONATIONS_BY_TYPE, range, connection)?;
    type_rows.extend(query_grouped(WATER_PROJECTS_BY_TYPE, range, connection)?);
    type_rows.extend(query_grouped(SPONSORSHIPS_BY_TYPE, range, connection)?);

    let by_type = merge_rows(type_rows, DEFAULT_LABEL);
    let by_payment_method = merge_rows(
        query_grouped(DONATIONS_BY_PAYMENT_METHOD, range, connection)?,
        DEFAULT_LABEL,
    );
    let by_status = merge_rows(
        query_grouped(DONATIONS_BY_STATUS, range, connection)?,
        DEFAULT_LABEL,
    );
    let by_channel = merge_rows(
        query_grouped(DONATIONS_BY_CHANNEL, range, connection)?,
        DEFAULT_CHANNEL_LABEL,
    );
    let by_masjid = merge_rows(
        query_grouped(COLLECTIONS_BY_MASJID, range, connection)?,
        DEFAULT_LABEL,
    );

    let fees_pence: Option<Pence> = connection.query_row(
        COMPLETED_FEES,
        named_params! {":from": range.from, ":to": range.to},
        |row| row.get(0),
    )?;

    let donations_pence = by_type.iter().map(|row| row.amount_pence).sum();
    let collections_pence = by_masjid.iter().map(|row| row.amount_pence).sum();
    let totals = ReportTotals {
        donations_pence,
        donation_count: by_type.iter().map(|row| row.count).sum(),
        fees_pence: fees_pence.unwrap_or(0),
        collections_pence,
        collection_count: by_masjid.iter().map(|row| row.count).sum(),
        total_pence: donations_pence + collections_pence,
    };

    Ok(Report {
        from: range.from,
        to: range.to,
        totals,
        by_type,
        by_payment_method,
        by_status,
        by_channel,
        by_masjid,
    })
}


#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{Error, report::rows::ReportRow};

    use super::{DateRange, build_report, test_utils::get_report_test_connection};

    fn row(label: &str, amount_pence: i64, count: i64) -> ReportRow {
        ReportRow {
            label: label.to_owned(),
            amount_pence,
            count,
        }
    }

    fn march() -> DateRange {
        DateRange {
            from: date!(2025 - 03 - 01),
            to: date!(2025 - 03 - 31),
        }
    }

    #[test]
    fn resolve_defaults_to_month_to_date() {
        let got = DateRange::resolve(None, None, date!(2025 - 03 - 18)).unwrap();

        assert_eq!(
            got,
            DateRange {
                from: date!(2025 - 03 - 01),
                to: date!(2025 - 03 - 18),
            }
        );
    }

    #[test]
    fn resolve_rejects_backwards_range() {
        let got = DateRange::resolve(
            Some(date!(2025 - 03 - 10)),
            Some(date!(2025 - 03 - 09)),
            date!(2025 - 03 - 18),
        );

        assert_eq!(got, Err(Error::InvalidDateRange));
    }

    #[test]
    fn resolve_allows_single_day() {
        let day = date!(2025 - 03 - 10);

        let got = DateRange::resolve(Some(day), Some(day), date!(2025 - 03 - 18)).unwrap();

        assert_eq!(got, DateRange { from: day, to: day });
    }

    #[test]
    fn merges_types_across_sources() {
        let conn = get_report_test_connection();

        let report = build_report(march(), &conn).unwrap();

        assert_eq!(
            report.by_type,
            vec![
                row("WATER_WELL", 30_000, 1),
                row("GENERAL", 12_500, 2),
                row("ZAKAT", 4_000, 1),
                row("ORPHANS", 3_000, 1),
            ]
        );
    }

    #[test]
    fn status_breakdown_includes_every_status() {
        let conn = get_report_test_connection();

        let report = build_report(march(), &conn).unwrap();

        assert_eq!(
            report.by_status,
            vec![row("COMPLETED", 16_500, 3), row("FAILED", 7_000, 1)]
        );
    }

    #[test]
    fn missing_channel_is_unspecified() {
        let conn = get_report_test_connection();

        let report = build_report(march(), &conn).unwrap();

        assert_eq!(
            report.by_channel,
            vec![
                row("WEBSITE", 10_000, 1),
                row("OFFICE", 4_000, 1),
                row("UNSPECIFIED", 2_500, 1),
            ]
        );
    }

    #[test]
    fn payment_methods_and_masjids() {
        let conn = get_report_test_connection();

        let report = build_report(march(), &conn).unwrap();

        assert_eq!(
            report.by_payment_method,
            vec![
                row("CARD", 10_000, 1),
                row("BANK_TRANSFER", 4_000, 1),
                row("CASH", 2_500, 1),
            ]
        );
        assert_eq!(report.by_masjid, vec![row("Masjid Noor", 20_000, 2)]);
    }

    #[test]
    fn totals_add_up_sections() {
        let conn = get_report_test_connection();

        let report = build_report(march(), &conn).unwrap();

        assert_eq!(report.totals.donations_pence, 49_500);
        assert_eq!(report.totals.donation_count, 5);
        assert_eq!(report.totals.fees_pence, 140);
        assert_eq!(report.totals.collections_pence, 20_000);
        assert_eq!(report.totals.collection_count, 2);
        assert_eq!(report.totals.total_pence, 69_500);
    }

    #[test]
    fn empty_range_has_empty_sections() {
        let conn = get_report_test_connection();
        let range = DateRange {
            from: date!(2024 - 01 - 01),
            to: date!(2024 - 01 - 31),
        };

        let report = build_report(range, &conn).unwrap();

        assert!(report.by_type.is_empty());
        assert!(report.by_masjid.is_empty());
        assert_eq!(report.totals.total_pence, 0);
    }
}
