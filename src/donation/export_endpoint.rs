//! Defines the endpoint for downloading donations as CSV.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::Response,
};
use axum_extra::extract::Query;
use rusqlite::Connection;

use crate::{AppState, Error, export::csv_response, money::pence_to_decimal_string};

use super::{
    core::Donation,
    filter::{DonationFilter, query_donations},
};

const DONATION_EXPORT_HEADERS: [&str; 13] = [
    "id",
    "date",
    "order_id",
    "donor_name",
    "donor_email",
    "appeal_title",
    "donation_type",
    "frequency",
    "amount",
    "fees",
    "payment_method",
    "status",
    "collected_via",
];

/// The state needed to export donations.
#[derive(Debug, Clone)]
pub struct DonationExportState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DonationExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Download every donation matching the query string filters, newest first.
pub async fn export_donations_endpoint(
    State(state): State<DonationExportState>,
    Query(filter): Query<DonationFilter>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let donations = query_donations(&filter, None, &connection)
        .inspect_err(|error| tracing::error!("could not get donations for export: {error}"))?;

    tracing::debug!("Exporting {} donations", donations.len());

    csv_response(
        "donations.csv",
        &DONATION_EXPORT_HEADERS,
        donations.iter().map(donation_record),
    )
}

fn donation_record(donation: &Donation) -> Vec<String> {
    vec![
        donation.id.to_string(),
        donation.date.to_string(),
        donation.order_id.clone().unwrap_or_default(),
        donation.donor_name.clone(),
        donation.donor_email.clone().unwrap_or_default(),
        donation.appeal_title.clone(),
        donation.donation_type.as_str().to_owned(),
        donation.frequency.as_str().to_owned(),
        pence_to_decimal_string(donation.amount_pence),
        pence_to_decimal_string(donation.fees_pence),
        donation.payment_method.as_str().to_owned(),
        donation.status.as_str().to_owned(),
        donation
            .collected_via
            .map(|channel| channel.as_str().to_owned())
            .unwrap_or_default(),
    ]
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum_extra::extract::Query;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        donation::{
            core::{DonationType, create_donation, test_utils::new_donation},
            filter::DonationFilter,
        },
        test_utils::get_header,
    };

    use super::{DonationExportState, export_donations_endpoint};

    async fn export(state: DonationExportState, filter: DonationFilter) -> String {
        let response = export_donations_endpoint(State(state), Query(filter))
            .await
            .unwrap();
        assert_eq!(
            get_header(&response, "content-disposition"),
            "attachment; filename=\"donations.csv\""
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn exports_amounts_in_pounds() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let mut donation = new_donation(123_456, date!(2025 - 02 - 14));
        donation.fees_pence = 1502;
        create_donation(donation, &conn).unwrap();
        let state = DonationExportState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let csv = export(state, DonationFilter::default()).await;

        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("id,date,order_id,donor_name"));
        assert_eq!(
            lines[1],
            "1,2025-02-14,,Aisha Khan,aisha@example.com,General Fund,GENERAL,ONE_OFF,\
            1234.56,15.02,CARD,COMPLETED,WEBSITE"
        );
    }

    #[tokio::test]
    async fn export_honours_filter() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        create_donation(new_donation(100, date!(2025 - 02 - 14)), &conn).unwrap();
        let mut zakat = new_donation(200, date!(2025 - 02 - 15));
        zakat.donation_type = DonationType::Zakat;
        create_donation(zakat, &conn).unwrap();
        let state = DonationExportState {
            db_connection: Arc::new(Mutex::new(conn)),
        };
        let filter = DonationFilter {
            donation_type: Some(DonationType::Zakat),
            ..Default::default()
        };

        let csv = export(state, filter).await;

        assert_eq!(csv.lines().count(), 2);
        assert!(csv.contains(",ZAKAT,"));
        assert!(!csv.contains(",GENERAL,"));
    }
}
