//! Donations is a web app for running a charity's donation intake and back office.
//!
//! The public side is a checkout flow where donors build a basket of one-off and
//! recurring donations and optionally cover the card processing fees. The admin
//! side has a dashboard, reports, CSV exports, masjid collection tracking and the
//! fulfillment workflows for water-project and sponsorship donations.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod basket;
mod checkout;
mod dashboard;
mod database_id;
mod db;
mod donation;
mod endpoints;
mod export;
mod fulfillment;
mod html;
mod internal_server_error;
mod logging;
mod masjid;
mod money;
mod navigation;
mod not_found;
mod pagination;
mod report;
mod routing;
mod sponsorship;
mod timezone;
mod water_project;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use basket::{FeeSplit, split_fees};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use report::{RawReportRow, ReportRow, merge_rows};
pub use routing::build_router;

use crate::{
    alert::Alert,
    internal_server_error::{InternalServerError, get_internal_server_error_redirect},
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing or deserializing JSON.
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// The CSV writer failed while building an export.
    #[error("could not write CSV: {0}")]
    CsvError(String),

    /// A stored or submitted value did not name a known variant, e.g. an
    /// unknown donation type.
    #[error("\"{0}\" is not a recognised value")]
    InvalidVariant(String),

    /// An amount of money was negative or could not be represented in pence.
    #[error("{0} is not a valid amount")]
    InvalidAmount(String),

    /// The start of a date range was after its end.
    #[error("the date range is invalid, the start date must not be after the end date")]
    InvalidDateRange,

    /// An order was submitted with nothing in the basket.
    #[error("the basket is empty")]
    EmptyBasket,

    /// The specified masjid name already exists in the database.
    #[error("the masjid \"{0}\" already exists in the database")]
    DuplicateMasjidName(String),

    /// A collection referenced a masjid that does not exist.
    #[error("the masjid ID does not refer to a valid masjid")]
    InvalidMasjid,

    /// A donation or fulfillment workflow was asked to move between two
    /// statuses that are not connected.
    #[error("cannot change status from {from} to {to}")]
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
    },

    /// Tried to update a donation that does not exist
    #[error("tried to update a donation that is not in the database")]
    UpdateMissingDonation,

    /// Tried to update a water project that does not exist
    #[error("tried to update a water project that is not in the database")]
    UpdateMissingWaterProject,

    /// Tried to update a sponsorship that does not exist
    #[error("tried to update a sponsorship that is not in the database")]
    UpdateMissingSponsorship,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 787 && desc.contains("FOREIGN KEY") =>
            {
                Error::InvalidMasjid
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::JSONSerializationError(value.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        Error::CsvError(value.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::InvalidDateRange => (
                StatusCode::BAD_REQUEST,
                "The start date must not be after the end date.",
            )
                .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::InvalidTimezoneError(timezone) => Alert::Error {
                message: "Invalid Timezone Settings".to_owned(),
                details: format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR),
            Error::InvalidAmount(amount) => Alert::Error {
                message: "Invalid amount".to_owned(),
                details: format!(
                    "{amount} is not a valid amount. Enter an amount from £0 up to £1,000,000."
                ),
            }
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::InvalidVariant(value) => Alert::Error {
                message: "Invalid option".to_owned(),
                details: format!("\"{value}\" is not one of the available options."),
            }
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::DuplicateMasjidName(name) => Alert::Error {
                message: "Duplicate Masjid Name".to_owned(),
                details: format!(
                    "The masjid {name} already exists. Choose a different name, \
                    or record collections against the existing masjid."
                ),
            }
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::InvalidMasjid => Alert::Error {
                message: "Invalid masjid".to_owned(),
                details: "Could not find the selected masjid. Try refreshing the page.".to_owned(),
            }
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::InvalidStatusTransition { from, to } => Alert::Error {
                message: "Could not change status".to_owned(),
                details: format!("A {from} item cannot be changed to {to}."),
            }
            .into_response_with_status(StatusCode::CONFLICT),
            Error::UpdateMissingDonation => Alert::Error {
                message: "Could not update donation".to_owned(),
                details: "The donation could not be found.".to_owned(),
            }
            .into_response_with_status(StatusCode::NOT_FOUND),
            Error::UpdateMissingWaterProject => Alert::Error {
                message: "Could not update water project".to_owned(),
                details: "The water project donation could not be found.".to_owned(),
            }
            .into_response_with_status(StatusCode::NOT_FOUND),
            Error::UpdateMissingSponsorship => Alert::Error {
                message: "Could not update sponsorship".to_owned(),
                details: "The sponsorship donation could not be found.".to_owned(),
            }
            .into_response_with_status(StatusCode::NOT_FOUND),
            Error::DatabaseLockError => get_internal_server_error_redirect(),
            Error::EmptyBasket => Alert::Error {
                message: "Your basket is empty".to_owned(),
                details: "Add a donation to your basket before checking out.".to_owned(),
            }
            .into_response_with_status(StatusCode::BAD_REQUEST),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details: "An unexpected error occurred, check the server logs for more details."
                        .to_owned(),
                }
                .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}
