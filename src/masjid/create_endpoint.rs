//! Defines the endpoints for adding masjids and recording their collections.

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

use crate::{AppState, Error, alert::Alert, endpoints, money::parse_pounds};

use super::core::{
    CollectionType, MasjidId, NewCollection, NewMasjid, create_masjid, record_collection,
};

#[derive(Debug, Clone)]
pub struct MasjidState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for MasjidState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MasjidForm {
    pub name: String,
    pub city: String,
    #[serde(default)]
    pub contact_name: String,
}

#[derive(Debug, Deserialize)]
pub struct CollectionForm {
    pub masjid_id: MasjidId,
    /// The amount in pounds.
    pub amount: String,
    pub collected_on: Date,
    pub collection_type: CollectionType,
}

/// A route handler for adding a masjid, redirects to the masjids view on success.
pub async fn create_masjid_endpoint(
    State(state): State<MasjidState>,
    Form(form): Form<MasjidForm>,
) -> Response {
    let name = form.name.trim();
    let city = form.city.trim();
    if name.is_empty() || city.is_empty() {
        return Alert::Error {
            message: "Missing details".to_owned(),
            details: "Enter the masjid's name and city.".to_owned(),
        }
        .into_response_with_status(StatusCode::BAD_REQUEST);
    }

    let contact_name = Some(form.contact_name.trim())
        .filter(|contact_name| !contact_name.is_empty())
        .map(str::to_owned);

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let masjid = NewMasjid {
        name: name.to_owned(),
        city: city.to_owned(),
        contact_name,
    };

    match create_masjid(masjid, &connection) {
        Ok(masjid) => tracing::info!("Added masjid {} ({})", masjid.name, masjid.id),
        Err(error) => {
            tracing::warn!("could not add masjid {name}: {error}");
            return error.into_alert_response();
        }
    }

    (
        HxRedirect(endpoints::MASJIDS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

/// A route handler for recording a collection, redirects to the masjids view on success.
pub async fn record_collection_endpoint(
    State(state): State<MasjidState>,
    Form(form): Form<CollectionForm>,
) -> Response {
    let amount_pence = match parse_pounds(&form.amount) {
        Ok(amount_pence) => amount_pence,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let collection = NewCollection {
        masjid_id: form.masjid_id,
        amount_pence,
        collected_on: form.collected_on,
        collection_type: form.collection_type,
    };

    if let Err(error) = record_collection(collection, &connection) {
        tracing::warn!("could not record collection for masjid {}: {error}", form.masjid_id);
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::MASJIDS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
