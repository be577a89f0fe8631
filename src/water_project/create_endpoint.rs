//! Defines the endpoint for recording a water-project donation.

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
    AppState, Error, alert::Alert, endpoints, money::parse_pounds, timezone::local_today,
};

use super::core::{NewWaterProject, WaterProjectType, create_water_project};

#[derive(Debug, Clone)]
pub struct CreateWaterProjectState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateWaterProjectState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WaterProjectForm {
    pub donor_name: String,
    pub project_type: WaterProjectType,
    pub location: String,
    /// The amount in pounds.
    pub amount: String,
    #[serde(default)]
    pub notes: String,
}

/// Record a water-project donation dated today, redirects to the water projects view on success.
pub async fn create_water_project_endpoint(
    State(state): State<CreateWaterProjectState>,
    Form(form): Form<WaterProjectForm>,
) -> Response {
    let donor_name = form.donor_name.trim();
    let location = form.location.trim();
    if donor_name.is_empty() || location.is_empty() {
        return Alert::Error {
            message: "Missing details".to_owned(),
            details: "Enter the donor's name and where the project will be built.".to_owned(),
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

    let notes = Some(form.notes.trim())
        .filter(|notes| !notes.is_empty())
        .map(str::to_owned);

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let project = NewWaterProject {
        donor_name: donor_name.to_owned(),
        project_type: form.project_type,
        location: location.to_owned(),
        amount_pence,
        notes,
        created_at: today,
    };

    if let Err(error) = create_water_project(project, &connection) {
        tracing::error!("could not record water project: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::WATER_PROJECTS_VIEW.to_owned()),
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
        db::initialize,
        endpoints,
        fulfillment::FulfillmentStatus,
        test_utils::assert_hx_redirect,
        water_project::core::{WaterProjectType, get_water_project, list_water_projects},
    };

    use super::{CreateWaterProjectState, WaterProjectForm, create_water_project_endpoint};

    fn get_test_state() -> CreateWaterProjectState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        CreateWaterProjectState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Europe/London".to_owned(),
        }
    }

    #[tokio::test]
    async fn records_pending_project() {
        let state = get_test_state();
        let form = WaterProjectForm {
            donor_name: "Hamza Iqbal".to_owned(),
            project_type: WaterProjectType::WudhuArea,
            location: " Mirpur, Pakistan ".to_owned(),
            amount: "1200".to_owned(),
            notes: "  ".to_owned(),
        };

        let response = create_water_project_endpoint(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::WATER_PROJECTS_VIEW);
        let connection = state.db_connection.lock().unwrap();
        let project = get_water_project(1, &connection).unwrap();
        assert_eq!(project.location, "Mirpur, Pakistan");
        assert_eq!(project.amount_pence, 120_000);
        assert_eq!(project.status, FulfillmentStatus::Pending);
        assert_eq!(project.notes, None);
    }

    #[tokio::test]
    async fn rejects_bad_amount() {
        let state = get_test_state();
        let form = WaterProjectForm {
            donor_name: "Hamza Iqbal".to_owned(),
            project_type: WaterProjectType::WaterTank,
            location: "Mirpur".to_owned(),
            amount: "twelve".to_owned(),
            notes: String::new(),
        };

        let response = create_water_project_endpoint(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let connection = state.db_connection.lock().unwrap();
        assert!(list_water_projects(None, &connection).unwrap().is_empty());
    }
}
