//! Defines the endpoint for moving a water project through its workflow.

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
    core::{WaterProjectId, update_water_project_status},
    water_projects_page::water_project_row,
};

#[derive(Debug, Clone)]
pub struct WaterProjectStatusState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for WaterProjectStatusState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Move a water project to a new status and respond with its updated table row.
pub async fn update_water_project_status_endpoint(
    State(state): State<WaterProjectStatusState>,
    Path(project_id): Path<WaterProjectId>,
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

    match update_water_project_status(project_id, form.status, today, &connection) {
        Ok(project) => {
            tracing::info!("Water project {project_id} is now {}", project.status);
            let alert = Alert::SuccessSimple {
                message: format!("Water project {}", project.status.label().to_lowercase()),
            };

            html!(
                (water_project_row(&project))
                (alert.into_html())
            )
            .into_response()
        }
        Err(error) => {
            tracing::warn!("could not update water project {project_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        fulfillment::{FulfillmentStatus, FulfillmentStatusForm},
        water_project::core::{
            NewWaterProject, WaterProjectType, create_water_project, get_water_project,
        },
    };

    use super::{WaterProjectStatusState, update_water_project_status_endpoint};

    fn get_test_state() -> WaterProjectStatusState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        create_water_project(
            NewWaterProject {
                donor_name: "Maryam".to_owned(),
                project_type: WaterProjectType::WaterWell,
                location: "Gambia".to_owned(),
                amount_pence: 50_000,
                notes: None,
                created_at: date!(2025 - 01 - 01),
            },
            &conn,
        )
        .unwrap();

        WaterProjectStatusState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Europe/London".to_owned(),
        }
    }

    async fn update(
        state: &WaterProjectStatusState,
        status: FulfillmentStatus,
    ) -> axum::response::Response {
        update_water_project_status_endpoint(
            State(state.clone()),
            Path(1),
            Form(FulfillmentStatusForm { status }),
        )
        .await
    }

    #[tokio::test]
    async fn completes_project_in_order() {
        let state = get_test_state();

        assert_eq!(update(&state, FulfillmentStatus::InProgress).await.status(), StatusCode::OK);
        assert_eq!(update(&state, FulfillmentStatus::Completed).await.status(), StatusCode::OK);

        let connection = state.db_connection.lock().unwrap();
        let project = get_water_project(1, &connection).unwrap();
        assert_eq!(project.status, FulfillmentStatus::Completed);
        assert!(project.completed_at.is_some());
    }

    #[tokio::test]
    async fn rejects_skipping_steps() {
        let state = get_test_state();

        let response = update(&state, FulfillmentStatus::Completed).await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
