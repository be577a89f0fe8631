//! Defines the endpoint for moving a sponsorship through its workflow.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error, alert::Alert, fulfillment::FulfillmentStatusForm, timezone::local_today,
};

use super::{
    core::{SponsorshipId, update_sponsorship_status},
    sponsorships_page::sponsorship_row,
};

#[derive(Debug, Clone)]
pub struct SponsorshipStatusState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for SponsorshipStatusState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Move a sponsorship to a new status and respond with its updated table row.
pub async fn update_sponsorship_status_endpoint(
    State(state): State<SponsorshipStatusState>,
    Path(sponsorship_id): Path<SponsorshipId>,
    Form(form): Form<FulfillmentStatusForm>,
) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_sponsorship_status(sponsorship_id, form.status, today, &connection) {
        Ok(sponsorship) => {
            tracing::info!("Sponsorship {sponsorship_id} is now {}", sponsorship.status);
            let alert = Alert::SuccessSimple {
                message: format!("Sponsorship {}", sponsorship.status.label().to_lowercase()),
            };

            html!(
                (sponsorship_row(&sponsorship))
                (alert.into_html())
            )
            .into_response()
        }
        Err(error) => {
            tracing::warn!("could not update sponsorship {sponsorship_id}: {error}");
            error.into_alert_response()
        }
    }
}
