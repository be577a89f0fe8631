//! Sponsorship donations: orphans, hafiz students and families supported by a donor.

use std::str::FromStr;

use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, basket::Frequency, database_id::DatabaseId, db::sql_text_enum,
    fulfillment::FulfillmentStatus, money::Pence,
};

pub type SponsorshipId = DatabaseId;

/// Who the sponsorship supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SponsorshipType {
    Orphans,
    Hafiz,
    Families,
}

impl SponsorshipType {
    pub const ALL: [SponsorshipType; 3] = [
        SponsorshipType::Orphans,
        SponsorshipType::Hafiz,
        SponsorshipType::Families,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SponsorshipType::Orphans => "ORPHANS",
            SponsorshipType::Hafiz => "HAFIZ",
            SponsorshipType::Families => "FAMILIES",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SponsorshipType::Orphans => "Orphan sponsorship",
            SponsorshipType::Hafiz => "Hafiz sponsorship",
            SponsorshipType::Families => "Family sponsorship",
        }
    }
}

impl FromStr for SponsorshipType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ORPHANS" => Ok(SponsorshipType::Orphans),
            "HAFIZ" => Ok(SponsorshipType::Hafiz),
            "FAMILIES" => Ok(SponsorshipType::Families),
            other => Err(Error::InvalidVariant(other.to_owned())),
        }
    }
}

sql_text_enum!(SponsorshipType);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sponsorship {
    pub id: SponsorshipId,
    pub donor_name: String,
    pub sponsorship_type: SponsorshipType,
    /// The person or family being sponsored, `None` until one is assigned.
    pub beneficiary: Option<String>,
    pub amount_pence: Pence,
    pub frequency: Frequency,
    pub status: FulfillmentStatus,
    pub created_at: Date,
    pub completed_at: Option<Date>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSponsorship {
    pub donor_name: String,
    pub sponsorship_type: SponsorshipType,
    pub beneficiary: Option<String>,
    pub amount_pence: Pence,
    pub frequency: Frequency,
    pub created_at: Date,
}

pub fn create_sponsorship_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS sponsorship_donation (
            id INTEGER PRIMARY KEY,
            donor_name TEXT NOT NULL,
            sponsorship_type TEXT NOT NULL,
            beneficiary TEXT,
            amount_pence INTEGER NOT NULL CHECK (amount_pence >= 0),
            frequency TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'PENDING',
            created_at TEXT NOT NULL,
            completed_at TEXT
        )",
        (),
    )?;

    Ok(())
}

const SPONSORSHIP_COLUMNS: &str = "id, donor_name, sponsorship_type, beneficiary, amount_pence, \
    frequency, status, created_at, completed_at";

fn map_row_to_sponsorship(row: &Row) -> Result<Sponsorship, rusqlite::Error> {
    Ok(Sponsorship {
        id: row.get(0)?,
        donor_name: row.get(1)?,
        sponsorship_type: row.get(2)?,
        beneficiary: row.get(3)?,
        amount_pence: row.get(4)?,
        frequency: row.get(5)?,
        status: row.get(6)?,
        created_at: row.get(7)?,
        completed_at: row.get(8)?,
    })
}

/// Record a sponsorship donation. New sponsorships start as pending.
pub fn create_sponsorship(
    sponsorship: NewSponsorship,
    connection: &Connection,
) -> Result<Sponsorship, Error> {
    if sponsorship.amount_pence < 0 {
        return Err(Error::InvalidAmount(sponsorship.amount_pence.to_string()));
    }

    connection.execute(
        "INSERT INTO sponsorship_donation \
            (donor_name, sponsorship_type, beneficiary, amount_pence, frequency, status, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            sponsorship.donor_name,
            sponsorship.sponsorship_type,
            sponsorship.beneficiary,
            sponsorship.amount_pence,
            sponsorship.frequency,
            FulfillmentStatus::Pending,
            sponsorship.created_at,
        ],
    )?;

    Ok(Sponsorship {
        id: connection.last_insert_rowid(),
        donor_name: sponsorship.donor_name,
        sponsorship_type: sponsorship.sponsorship_type,
        beneficiary: sponsorship.beneficiary,
        amount_pence: sponsorship.amount_pence,
        frequency: sponsorship.frequency,
        status: FulfillmentStatus::Pending,
        created_at: sponsorship.created_at,
        completed_at: None,
    })
}

pub fn get_sponsorship(id: SponsorshipId, connection: &Connection) -> Result<Sponsorship, Error> {
    connection
        .query_row(
            &format!("SELECT {SPONSORSHIP_COLUMNS} FROM sponsorship_donation WHERE id = ?1"),
            [id],
            map_row_to_sponsorship,
        )
        .map_err(Error::from)
}

/// List sponsorships, optionally only those with `status`, newest first.
pub fn list_sponsorships(
    status: Option<FulfillmentStatus>,
    connection: &Connection,
) -> Result<Vec<Sponsorship>, Error> {
    connection
        .prepare(&format!(
            "SELECT {SPONSORSHIP_COLUMNS} FROM sponsorship_donation \
            WHERE (?1 IS NULL OR status = ?1) \
            ORDER BY created_at DESC, id DESC"
        ))?
        .query_map([status], map_row_to_sponsorship)?
        .map(|sponsorship| sponsorship.map_err(Error::from))
        .collect()
}

/// Move a sponsorship to `status`, stamping `completed_at` with `today` on completion.
///
/// # Errors
/// Returns [Error::UpdateMissingSponsorship] if the sponsorship does not exist and
/// [Error::InvalidStatusTransition] if the change is not allowed.
pub fn update_sponsorship_status(
    id: SponsorshipId,
    status: FulfillmentStatus,
    today: Date,
    connection: &Connection,
) -> Result<Sponsorship, Error> {
    let mut sponsorship = match get_sponsorship(id, connection) {
        Ok(sponsorship) => sponsorship,
        Err(Error::NotFound) => return Err(Error::UpdateMissingSponsorship),
        Err(error) => return Err(error),
    };

    sponsorship.status = sponsorship.status.transition_to(status)?;
    if status == FulfillmentStatus::Completed {
        sponsorship.completed_at = Some(today);
    }

    connection.execute(
        "UPDATE sponsorship_donation SET status = ?1, completed_at = ?2 WHERE id = ?3",
        params![sponsorship.status, sponsorship.completed_at, id],
    )?;

    Ok(sponsorship)
}
