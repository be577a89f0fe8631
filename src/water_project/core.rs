//! Water-project donations and the work to deliver them.

use std::str::FromStr;

use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, database_id::DatabaseId, db::sql_text_enum, fulfillment::FulfillmentStatus,
    money::Pence,
};

pub type WaterProjectId = DatabaseId;

/// What the donation pays to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WaterProjectType {
    WaterPump,
    WaterWell,
    WaterTank,
    WudhuArea,
}

impl WaterProjectType {
    pub const ALL: [WaterProjectType; 4] = [
        WaterProjectType::WaterPump,
        WaterProjectType::WaterWell,
        WaterProjectType::WaterTank,
        WaterProjectType::WudhuArea,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WaterProjectType::WaterPump => "WATER_PUMP",
            WaterProjectType::WaterWell => "WATER_WELL",
            WaterProjectType::WaterTank => "WATER_TANK",
            WaterProjectType::WudhuArea => "WUDHU_AREA",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WaterProjectType::WaterPump => "Water pump",
            WaterProjectType::WaterWell => "Water well",
            WaterProjectType::WaterTank => "Water tank",
            WaterProjectType::WudhuArea => "Wudhu area",
        }
    }
}

impl FromStr for WaterProjectType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WATER_PUMP" => Ok(WaterProjectType::WaterPump),
            "WATER_WELL" => Ok(WaterProjectType::WaterWell),
            "WATER_TANK" => Ok(WaterProjectType::WaterTank),
            "WUDHU_AREA" => Ok(WaterProjectType::WudhuArea),
            other => Err(Error::InvalidVariant(other.to_owned())),
        }
    }
}

sql_text_enum!(WaterProjectType);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaterProject {
    pub id: WaterProjectId,
    pub donor_name: String,
    pub project_type: WaterProjectType,
    /// Where the project is built, e.g. a village and country.
    pub location: String,
    pub amount_pence: Pence,
    pub status: FulfillmentStatus,
    pub notes: Option<String>,
    pub created_at: Date,
    /// Set when the project reaches [FulfillmentStatus::Completed].
    pub completed_at: Option<Date>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWaterProject {
    pub donor_name: String,
    pub project_type: WaterProjectType,
    pub location: String,
    pub amount_pence: Pence,
    pub notes: Option<String>,
    pub created_at: Date,
}

pub fn create_water_project_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS water_project_donation (
            id INTEGER PRIMARY KEY,
            donor_name TEXT NOT NULL,
            project_type TEXT NOT NULL,
            location TEXT NOT NULL,
            amount_pence INTEGER NOT NULL CHECK (amount_pence >= 0),
            status TEXT NOT NULL DEFAULT 'PENDING',
            notes TEXT,
            created_at TEXT NOT NULL,
            completed_at TEXT
        )",
        (),
    )?;

    Ok(())
}

const WATER_PROJECT_COLUMNS: &str = "id, donor_name, project_type, location, amount_pence, \
    status, notes, created_at, completed_at";

fn map_row_to_water_project(row: &Row) -> Result<WaterProject, rusqlite::Error> {
    Ok(WaterProject {
        id: row.get(0)?,
        donor_name: row.get(1)?,
        project_type: row.get(2)?,
        location: row.get(3)?,
        amount_pence: row.get(4)?,
        status: row.get(5)?,
        notes: row.get(6)?,
        created_at: row.get(7)?,
        completed_at: row.get(8)?,
    })
}

/// Record a water-project donation. New projects start as pending.
pub fn create_water_project(
    project: NewWaterProject,
    connection: &Connection,
) -> Result<WaterProject, Error> {
    if project.amount_pence < 0 {
        return Err(Error::InvalidAmount(project.amount_pence.to_string()));
    }

    connection.execute(
        "INSERT INTO water_project_donation \
            (donor_name, project_type, location, amount_pence, status, notes, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            project.donor_name,
            project.project_type,
            project.location,
            project.amount_pence,
            FulfillmentStatus::Pending,
            project.notes,
            project.created_at,
        ],
    )?;

    Ok(WaterProject {
        id: connection.last_insert_rowid(),
        donor_name: project.donor_name,
        project_type: project.project_type,
        location: project.location,
        amount_pence: project.amount_pence,
        status: FulfillmentStatus::Pending,
        notes: project.notes,
        created_at: project.created_at,
        completed_at: None,
    })
}

pub fn get_water_project(
    id: WaterProjectId,
    connection: &Connection,
) -> Result<WaterProject, Error> {
    connection
        .query_row(
            &format!("SELECT {WATER_PROJECT_COLUMNS} FROM water_project_donation WHERE id = ?1"),
            [id],
            map_row_to_water_project,
        )
        .map_err(Error::from)
}

/// List water projects, optionally only those with `status`, newest first.
pub fn list_water_projects(
    status: Option<FulfillmentStatus>,
    connection: &Connection,
) -> Result<Vec<WaterProject>, Error> {
    connection
        .prepare(&format!(
            "SELECT {WATER_PROJECT_COLUMNS} FROM water_project_donation \
            WHERE (?1 IS NULL OR status = ?1) \
            ORDER BY created_at DESC, id DESC"
        ))?
        .query_map([status], map_row_to_water_project)?
        .map(|project| project.map_err(Error::from))
        .collect()
}

/// Move a water project to `status`, stamping `completed_at` with `today` on completion.
///
/// # Errors
/// Returns [Error::UpdateMissingWaterProject] if the project does not exist and
/// [Error::InvalidStatusTransition] if the change is not allowed.
pub fn update_water_project_status(
    id: WaterProjectId,
    status: FulfillmentStatus,
    today: Date,
    connection: &Connection,
) -> Result<WaterProject, Error> {
    let mut project = match get_water_project(id, connection) {
        Ok(project) => project,
        Err(Error::NotFound) => return Err(Error::UpdateMissingWaterProject),
        Err(error) => return Err(error),
    };

    project.status = project.status.transition_to(status)?;
    if status == FulfillmentStatus::Completed {
        project.completed_at = Some(today);
    }

    connection.execute(
        "UPDATE water_project_donation SET status = ?1, completed_at = ?2 WHERE id = ?3",
        params![project.status, project.completed_at, id],
    )?;

    Ok(project)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{Error, db::initialize, fulfillment::FulfillmentStatus};

    use super::{
        NewWaterProject, WaterProjectType, create_water_project, get_water_project,
        list_water_projects, update_water_project_status,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn new_project(created_at: time::Date) -> NewWaterProject {
        NewWaterProject {
            donor_name: "Fatima Begum".to_owned(),
            project_type: WaterProjectType::WaterWell,
            location: "Sylhet, Bangladesh".to_owned(),
            amount_pence: 150_000,
            notes: None,
            created_at,
        }
    }

    #[test]
    fn new_project_is_pending() {
        let conn = get_test_connection();

        let project = create_water_project(new_project(date!(2025 - 01 - 01)), &conn).unwrap();

        assert_eq!(project.status, FulfillmentStatus::Pending);
        assert_eq!(get_water_project(project.id, &conn), Ok(project));
    }

    #[test]
    fn completing_sets_completed_at() {
        let conn = get_test_connection();
        let project = create_water_project(new_project(date!(2025 - 01 - 01)), &conn).unwrap();

        update_water_project_status(
            project.id,
            FulfillmentStatus::InProgress,
            date!(2025 - 02 - 01),
            &conn,
        )
        .unwrap();
        let completed = update_water_project_status(
            project.id,
            FulfillmentStatus::Completed,
            date!(2025 - 03 - 01),
            &conn,
        )
        .unwrap();

        assert_eq!(completed.completed_at, Some(date!(2025 - 03 - 01)));
        assert_eq!(get_water_project(project.id, &conn), Ok(completed));
    }

    #[test]
    fn cannot_skip_in_progress() {
        let conn = get_test_connection();
        let project = create_water_project(new_project(date!(2025 - 01 - 01)), &conn).unwrap();

        let result = update_water_project_status(
            project.id,
            FulfillmentStatus::Completed,
            date!(2025 - 03 - 01),
            &conn,
        );

        assert_eq!(
            result,
            Err(Error::InvalidStatusTransition {
                from: "PENDING".to_owned(),
                to: "COMPLETED".to_owned(),
            })
        );
        assert_eq!(
            get_water_project(project.id, &conn).unwrap().completed_at,
            None
        );
    }

    #[test]
    fn updating_missing_project_fails() {
        let conn = get_test_connection();

        let result =
            update_water_project_status(1, FulfillmentStatus::Cancelled, date!(2025 - 03 - 01), &conn);

        assert_eq!(result, Err(Error::UpdateMissingWaterProject));
    }

    #[test]
    fn lists_by_status_newest_first() {
        let conn = get_test_connection();
        let older = create_water_project(new_project(date!(2025 - 01 - 01)), &conn).unwrap();
        let newer = create_water_project(new_project(date!(2025 - 02 - 01)), &conn).unwrap();
        update_water_project_status(
            older.id,
            FulfillmentStatus::Cancelled,
            date!(2025 - 02 - 02),
            &conn,
        )
        .unwrap();

        let all = list_water_projects(None, &conn).unwrap();
        let pending = list_water_projects(Some(FulfillmentStatus::Pending), &conn).unwrap();

        assert_eq!(
            all.iter().map(|project| project.id).collect::<Vec<_>>(),
            vec![newer.id, older.id]
        );
        assert_eq!(pending, vec![newer]);
    }

    #[test]
    fn rejects_negative_amount() {
        let conn = get_test_connection();
        let mut project = new_project(date!(2025 - 01 - 01));
        project.amount_pence = -10;

        assert_eq!(
            create_water_project(project, &conn),
            Err(Error::InvalidAmount("-10".to_owned()))
        );
    }
}
