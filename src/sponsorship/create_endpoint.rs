//! Defines the endpoint for recording a sponsorship donation.

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

use crate::{
    AppState, Error, alert::Alert, basket::Frequency, endpoints, money::parse_pounds,
    timezone::local_today,
};

use super::core::{NewSponsorship, SponsorshipType, create_sponsorship};

#[derive(Debug, Clone)]
pub struct CreateSponsorshipState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateSponsorshipState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SponsorshipForm {
    pub donor_name: String,
    pub sponsorship_type: SponsorshipType,
    /// Left blank when a beneficiary is yet to be assigned.
    #[serde(default)]
    pub beneficiary: String,
    /// The amount in pounds per payment.
    pub amount: String,
    pub frequency: Frequency,
}

/// Record a sponsorship dated today, redirects to the sponsorships view on success.
pub async fn create_sponsorship_endpoint(
    State(state): State<CreateSponsorshipState>,
    Form(form): Form<SponsorshipForm>,
) -> Response {
    let donor_name = form.donor_name.trim();
    if donor_name.is_empty() {
        return Alert::Error {
            message: "Missing details".to_owned(),
            details: "Enter the donor's name.".to_owned(),
        }
        .into_response_with_status(StatusCode::BAD_REQUEST);
    }

    let amount_pence = match parse_pounds(&form.amount) {
        Ok(amount_pence) => amount_pence,
        Err(error) => return error.into_alert_response(),
    };

    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let beneficiary = Some(form.beneficiary.trim())
        .filter(|beneficiary| !beneficiary.is_empty())
        .map(str::to_owned);

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let sponsorship = NewSponsorship {
        donor_name: donor_name.to_owned(),
        sponsorship_type: form.sponsorship_type,
        beneficiary,
        amount_pence,
        frequency: form.frequency,
        created_at: today,
    };

    if let Err(error) = create_sponsorship(sponsorship, &connection) {
        tracing::error!("could not record sponsorship: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::SPONSORSHIPS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, extract::State, http::StatusCode};
    use rusqlite::Connection;

    use crate::{
        basket::Frequency,
        db::initialize,
        endpoints,
        sponsorship::core::{SponsorshipType, get_sponsorship},
        test_utils::assert_hx_redirect,
    };

    use super::{CreateSponsorshipState, SponsorshipForm, create_sponsorship_endpoint};

    fn get_test_state() -> CreateSponsorshipState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        CreateSponsorshipState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Europe/London".to_owned(),
        }
    }

    #[tokio::test]
    async fn records_sponsorship() {
        let state = get_test_state();
        let form = SponsorshipForm {
            donor_name: "Zainab Hussain".to_owned(),
            sponsorship_type: SponsorshipType::Families,
            beneficiary: String::new(),
            amount: "35".to_owned(),
            frequency: Frequency::Yearly,
        };

        let response = create_sponsorship_endpoint(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::SPONSORSHIPS_VIEW);
        let connection = state.db_connection.lock().unwrap();
        let sponsorship = get_sponsorship(1, &connection).unwrap();
        assert_eq!(sponsorship.beneficiary, None);
        assert_eq!(sponsorship.amount_pence, 3_500);
        assert_eq!(sponsorship.frequency, Frequency::Yearly);
    }

    #[tokio::test]
    async fn rejects_blank_donor() {
        let state = get_test_state();
        let form = SponsorshipForm {
            donor_name: String::new(),
            sponsorship_type: SponsorshipType::Orphans,
            beneficiary: String::new(),
            amount: "35".to_owned(),
            frequency: Frequency::Monthly,
        };

        let response = create_sponsorship_endpoint(State(state), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
