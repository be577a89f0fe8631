//! Filtering and paging the donations table.

use rusqlite::{Connection, named_params};
use serde::Deserialize;
use time::Date;

use crate::{Error, pagination::Page};

use super::core::{DONATION_COLUMNS, Donation, DonationStatus, DonationType, map_row_to_donation};

/// The filters available on the donations table and its CSV export.
///
/// Every field is optional, an empty filter matches every donation.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct DonationFilter {
    /// Matched case-insensitively against the donor's name and email and the appeal title.
    pub search: Option<String>,
    pub status: Option<DonationStatus>,
    pub donation_type: Option<DonationType>,
    /// The earliest donation date to include.
    pub from: Option<Date>,
    /// The latest donation date to include.
    pub to: Option<Date>,
}

impl DonationFilter {
    fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|search| !search.is_empty())
            .map(|search| format!("%{}%", search.to_lowercase()))
    }

    /// The filter as query string parameters, without the leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut params = Vec::new();

        if let Some(search) = self.search.as_deref().filter(|search| !search.is_empty()) {
            params.push(format!("search={}", encode_query_value(search)));
        }
        if let Some(status) = self.status {
            params.push(format!("status={}", status.as_str()));
        }
        if let Some(donation_type) = self.donation_type {
            params.push(format!("donation_type={}", donation_type.as_str()));
        }
        if let Some(from) = self.from {
            params.push(format!("from={from}"));
        }
        if let Some(to) = self.to {
            params.push(format!("to={to}"));
        }

        params.join("&")
    }
}

fn encode_query_value(value: &str) -> String {
    value
        .bytes()
        .map(|byte| match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (byte as char).to_string()
            }
            b' ' => "+".to_owned(),
            byte => format!("%{byte:02X}"),
        })
        .collect()
}

const FILTER_CLAUSE: &str = "(:search IS NULL \
        OR lower(donor_name) LIKE :search \
        OR lower(coalesce(donor_email, '')) LIKE :search \
        OR lower(appeal_title) LIKE :search) \
    AND (:status IS NULL OR status = :status) \
    AND (:donation_type IS NULL OR donation_type = :donation_type) \
    AND (:from IS NULL OR date >= :from) \
    AND (:to IS NULL OR date <= :to)";

/// Get one page of the donations matching `filter`, newest first.
///
/// Pass `None` for `page` to get every matching donation, e.g. for an export.
pub fn query_donations(
    filter: &DonationFilter,
    page: Option<Page>,
    connection: &Connection,
) -> Result<Vec<Donation>, Error> {
    let search = filter.search_pattern();
    // SQLite treats a negative limit as no limit.
    let (limit, offset) = match page {
        Some(page) => (
            i64::try_from(page.size).unwrap_or(i64::MAX),
            i64::try_from(page.offset()).unwrap_or(i64::MAX),
        ),
        None => (-1, 0),
    };

    connection
        .prepare(&format!(
            "SELECT {DONATION_COLUMNS} FROM donation WHERE {FILTER_CLAUSE} \
            ORDER BY date DESC, id DESC LIMIT :limit OFFSET :offset"
        ))?
        .query_map(
            named_params! {
                ":search": search,
                ":status": filter.status,
                ":donation_type": filter.donation_type,
                ":from": filter.from,
                ":to": filter.to,
                ":limit": limit,
                ":offset": offset,
            },
            map_row_to_donation,
        )?
        .map(|donation| donation.map_err(Error::from))
        .collect()
}

/// Count the donations matching `filter`.
pub fn count_donations(filter: &DonationFilter, connection: &Connection) -> Result<u64, Error> {
    let search = filter.search_pattern();

    connection
        .query_row(
            &format!("SELECT COUNT(*) FROM donation WHERE {FILTER_CLAUSE}"),
            named_params! {
                ":search": search,
                ":status": filter.status,
                ":donation_type": filter.donation_type,
                ":from": filter.from,
                ":to": filter.to,
            },
            |row| row.get::<_, i64>(0),
        )
        .map(|count| count as u64)
        .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        donation::core::{
            DonationStatus, DonationType, create_donation, test_utils::new_donation,
        },
        pagination::Page,
    };

    use super::{DonationFilter, count_donations, query_donations};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn insert_sample_donations(connection: &Connection) {
        let mut zakat = new_donation(5000, date!(2025 - 01 - 10));
        zakat.donor_name = "Bilal Ahmed".to_owned();
        zakat.donor_email = Some("bilal@example.com".to_owned());
        zakat.donation_type = DonationType::Zakat;
        create_donation(zakat, connection).unwrap();

        let mut pending = new_donation(1000, date!(2025 - 02 - 10));
        pending.status = DonationStatus::Pending;
        pending.appeal_title = "Orphan Appeal".to_owned();
        create_donation(pending, connection).unwrap();

        create_donation(new_donation(2000, date!(2025 - 03 - 10)), connection).unwrap();
    }

    #[test]
    fn empty_filter_returns_all_newest_first() {
        let conn = get_test_connection();
        insert_sample_donations(&conn);

        let got = query_donations(&DonationFilter::default(), None, &conn).unwrap();

        let dates: Vec<_> = got.iter().map(|donation| donation.date).collect();
        assert_eq!(
            dates,
            vec![
                date!(2025 - 03 - 10),
                date!(2025 - 02 - 10),
                date!(2025 - 01 - 10)
            ]
        );
        assert_eq!(count_donations(&DonationFilter::default(), &conn), Ok(3));
    }

    #[test]
    fn filters_by_status_and_type() {
        let conn = get_test_connection();
        insert_sample_donations(&conn);

        let pending = DonationFilter {
            status: Some(DonationStatus::Pending),
            ..Default::default()
        };
        let zakat = DonationFilter {
            donation_type: Some(DonationType::Zakat),
            ..Default::default()
        };

        let got_pending = query_donations(&pending, None, &conn).unwrap();
        let got_zakat = query_donations(&zakat, None, &conn).unwrap();

        assert_eq!(got_pending.len(), 1);
        assert_eq!(got_pending[0].appeal_title, "Orphan Appeal");
        assert_eq!(got_zakat.len(), 1);
        assert_eq!(got_zakat[0].donor_name, "Bilal Ahmed");
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let conn = get_test_connection();
        insert_sample_donations(&conn);

        let by_email = DonationFilter {
            search: Some("BILAL@".to_owned()),
            ..Default::default()
        };
        let by_appeal = DonationFilter {
            search: Some("orphan".to_owned()),
            ..Default::default()
        };
        let blank = DonationFilter {
            search: Some("   ".to_owned()),
            ..Default::default()
        };

        assert_eq!(count_donations(&by_email, &conn), Ok(1));
        assert_eq!(count_donations(&by_appeal, &conn), Ok(1));
        assert_eq!(count_donations(&blank, &conn), Ok(3));
    }

    #[test]
    fn filters_by_inclusive_date_range() {
        let conn = get_test_connection();
        insert_sample_donations(&conn);

        let filter = DonationFilter {
            from: Some(date!(2025 - 02 - 10)),
            to: Some(date!(2025 - 03 - 10)),
            ..Default::default()
        };

        assert_eq!(count_donations(&filter, &conn), Ok(2));
    }

    #[test]
    fn pages_results() {
        let conn = get_test_connection();
        insert_sample_donations(&conn);

        let page = Page { number: 2, size: 2 };
        let got = query_donations(&DonationFilter::default(), Some(page), &conn).unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].date, date!(2025 - 01 - 10));
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let conn = get_test_connection();
        insert_sample_donations(&conn);

        let page = Page {
            number: u64::MAX / 10,
            size: 20,
        };
        let got = query_donations(&DonationFilter::default(), Some(page), &conn).unwrap();

        assert!(got.is_empty());
    }

    #[test]
    fn huge_page_size_still_limits_rows() {
        let conn = get_test_connection();
        insert_sample_donations(&conn);

        let page = Page {
            number: 1,
            size: u64::MAX,
        };
        let got = query_donations(&DonationFilter::default(), Some(page), &conn).unwrap();

        assert_eq!(got.len(), 3);
    }

    #[test]
    fn query_string_includes_set_filters() {
        let filter = DonationFilter {
            search: Some("Aisha Khan".to_owned()),
            status: Some(DonationStatus::Completed),
            from: Some(date!(2025 - 01 - 01)),
            ..Default::default()
        };

        assert_eq!(
            filter.to_query_string(),
            "search=Aisha+Khan&status=COMPLETED&from=2025-01-01"
        );
    }
}
