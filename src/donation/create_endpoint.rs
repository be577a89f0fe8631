//! Defines the endpoint for recording a donation taken offline, e.g. cash at the office.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error, alert::Alert, basket::Frequency, endpoints, money::parse_pounds,
};

use super::core::{
    CollectedVia, DonationStatus, DonationType, NewDonation, PaymentMethod, create_donation,
};

/// The state needed to record a donation.
#[derive(Debug, Clone)]
pub struct CreateDonationState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateDonationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for an offline donation.
#[derive(Debug, Deserialize)]
pub struct DonationForm {
    pub donor_name: String,
    #[serde(default)]
    pub donor_email: String,
    pub appeal_title: String,
    /// The amount in pounds, e.g. "12.50".
    pub amount: String,
    pub donation_type: DonationType,
    pub payment_method: PaymentMethod,
    pub collected_via: CollectedVia,
    pub date: Date,
    #[serde(default)]
    pub gift_aid: bool,
}

/// A route handler for recording an offline donation, redirects to the donations view on success.
pub async fn create_donation_endpoint(
    State(state): State<CreateDonationState>,
    Form(form): Form<DonationForm>,
) -> Response {
    let new_donation = match new_donation_from_form(form) {
        Ok(new_donation) => new_donation,
        Err(response) => return response,
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_donation(new_donation, &connection) {
        Ok(donation) => {
            tracing::info!(
                "Recorded offline donation {} of {} pence",
                donation.id,
                donation.amount_pence
            );
        }
        Err(error) => {
            tracing::error!("could not record donation: {error}");
            return error.into_alert_response();
        }
    }

    (
        HxRedirect(endpoints::DONATIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

fn new_donation_from_form(form: DonationForm) -> Result<NewDonation, Response> {
    let donor_name = form.donor_name.trim();
    let appeal_title = form.appeal_title.trim();

    if donor_name.is_empty() || appeal_title.is_empty() {
        return Err(Alert::Error {
            message: "Missing details".to_owned(),
            details: "Enter the donor's name and the appeal the donation is for.".to_owned(),
        }
        .into_response_with_status(StatusCode::BAD_REQUEST));
    }

    let amount_pence = parse_pounds(&form.amount).map_err(Error::into_alert_response)?;
    let donor_email = Some(form.donor_email.trim())
        .filter(|email| !email.is_empty())
        .map(str::to_owned);

    Ok(NewDonation {
        order_id: None,
        donor_name: donor_name.to_owned(),
        donor_email,
        appeal_title: appeal_title.to_owned(),
        amount_pence,
        fees_pence: 0,
        frequency: Frequency::OneOff,
        donation_type: form.donation_type,
        payment_method: form.payment_method,
        status: DonationStatus::Completed,
        collected_via: Some(form.collected_via),
        gift_aid: form.gift_aid,
        date: form.date,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        donation::{
            core::{CollectedVia, DonationStatus, DonationType, PaymentMethod, get_donation},
            filter::{DonationFilter, count_donations},
        },
        endpoints,
        test_utils::assert_hx_redirect,
    };

    use super::{CreateDonationState, DonationForm, create_donation_endpoint};

    fn get_test_state() -> CreateDonationState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        CreateDonationState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    fn form(amount: &str) -> DonationForm {
        DonationForm {
            donor_name: "  Yusuf Ali ".to_owned(),
            donor_email: String::new(),
            appeal_title: "Masjid Roof".to_owned(),
            amount: amount.to_owned(),
            donation_type: DonationType::Lillah,
            payment_method: PaymentMethod::Cash,
            collected_via: CollectedVia::Office,
            date: date!(2025 - 06 - 01),
            gift_aid: true,
        }
    }

    #[tokio::test]
    async fn records_completed_donation() {
        let state = get_test_state();

        let response = create_donation_endpoint(State(state.clone()), Form(form("£1,250.50"))).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::DONATIONS_VIEW);
        let connection = state.db_connection.lock().unwrap();
        let donation = get_donation(1, &connection).unwrap();
        assert_eq!(donation.donor_name, "Yusuf Ali");
        assert_eq!(donation.donor_email, None);
        assert_eq!(donation.amount_pence, 125_050);
        assert_eq!(donation.status, DonationStatus::Completed);
        assert_eq!(donation.collected_via, Some(CollectedVia::Office));
        assert!(donation.gift_aid);
    }

    #[tokio::test]
    async fn rejects_invalid_amount() {
        let state = get_test_state();

        let response = create_donation_endpoint(State(state.clone()), Form(form("-5"))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_donations(&DonationFilter::default(), &connection), Ok(0));
    }

    #[tokio::test]
    async fn rejects_blank_donor_name() {
        let state = get_test_state();
        let mut form = form("10");
        form.donor_name = "   ".to_owned();

        let response = create_donation_endpoint(State(state), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
