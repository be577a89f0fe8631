//! Defines the endpoint for changing a donation's payment status.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{AppState, Error, alert::Alert};

use super::{
    core::{DonationId, DonationStatus, update_donation_status},
    donations_page::donation_row,
};

/// The state needed to update a donation's status.
#[derive(Debug, Clone)]
pub struct DonationStatusState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DonationStatusState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: DonationStatus,
}

/// Move a donation to a new status and respond with its updated table row.
pub async fn update_donation_status_endpoint(
    State(state): State<DonationStatusState>,
    Path(donation_id): Path<DonationId>,
    Form(form): Form<StatusForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_donation_status(donation_id, form.status, &connection) {
        Ok(donation) => {
            tracing::info!("Donation {donation_id} is now {}", donation.status);
            let alert = Alert::SuccessSimple {
                message: format!("Donation marked {}", donation.status.label().to_lowercase()),
            };

            maud::html!(
                (donation_row(&donation))
                (alert.into_html())
            )
            .into_response()
        }
        Err(error) => {
            tracing::warn!("could not update status of donation {donation_id}: {error}");
            error.into_alert_response()
        }
    }
}
