//! Masjids the charity works with and the collections taken at them.

use std::str::FromStr;

use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::DatabaseId, db::sql_text_enum, money::Pence};

pub type MasjidId = DatabaseId;

/// SQLite's extended result code for a UNIQUE constraint failure.
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Masjid {
    pub id: MasjidId,
    pub name: String,
    pub city: String,
    pub contact_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMasjid {
    pub name: String,
    pub city: String,
    pub contact_name: Option<String>,
}

/// The occasion a collection was taken for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollectionType {
    Jummah,
    Ramadan,
    Eid,
    General,
}

impl CollectionType {
    pub const ALL: [CollectionType; 4] = [
        CollectionType::Jummah,
        CollectionType::Ramadan,
        CollectionType::Eid,
        CollectionType::General,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CollectionType::Jummah => "JUMMAH",
            CollectionType::Ramadan => "RAMADAN",
            CollectionType::Eid => "EID",
            CollectionType::General => "GENERAL",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CollectionType::Jummah => "Jummah",
            CollectionType::Ramadan => "Ramadan",
            CollectionType::Eid => "Eid",
            CollectionType::General => "General",
        }
    }
}

impl FromStr for CollectionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JUMMAH" => Ok(CollectionType::Jummah),
            "RAMADAN" => Ok(CollectionType::Ramadan),
            "EID" => Ok(CollectionType::Eid),
            "GENERAL" => Ok(CollectionType::General),
            other => Err(Error::InvalidVariant(other.to_owned())),
        }
    }
}

sql_text_enum!(CollectionType);

/// Money collected at a masjid on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collection {
    pub id: DatabaseId,
    pub masjid_id: MasjidId,
    pub amount_pence: Pence,
    pub collected_on: Date,
    pub collection_type: CollectionType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCollection {
    pub masjid_id: MasjidId,
    pub amount_pence: Pence,
    pub collected_on: Date,
    pub collection_type: CollectionType,
}

/// The running totals for one masjid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MasjidTotal {
    pub masjid: Masjid,
    pub total_pence: Pence,
    pub collection_count: i64,
    /// `None` if nothing has been collected yet.
    pub last_collected_on: Option<Date>,
}

pub fn create_masjid_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS masjid (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            city TEXT NOT NULL,
            contact_name TEXT
        )",
        (),
    )?;

    Ok(())
}

pub fn create_collection_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS collection (
            id INTEGER PRIMARY KEY,
            masjid_id INTEGER NOT NULL,
            amount_pence INTEGER NOT NULL CHECK (amount_pence >= 0),
            collected_on TEXT NOT NULL,
            collection_type TEXT NOT NULL,
            FOREIGN KEY(masjid_id) REFERENCES masjid(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_collection_masjid_id ON collection(masjid_id);",
    )?;

    Ok(())
}

/// Add a masjid.
///
/// # Errors
/// Returns [Error::DuplicateMasjidName] if a masjid already has the name.
pub fn create_masjid(masjid: NewMasjid, connection: &Connection) -> Result<Masjid, Error> {
    connection
        .execute(
            "INSERT INTO masjid (name, city, contact_name) VALUES (?1, ?2, ?3)",
            params![masjid.name, masjid.city, masjid.contact_name],
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(error, Some(_))
                if error.extended_code == SQLITE_CONSTRAINT_UNIQUE =>
            {
                Error::DuplicateMasjidName(masjid.name.clone())
            }
            error => error.into(),
        })?;

    Ok(Masjid {
        id: connection.last_insert_rowid(),
        name: masjid.name,
        city: masjid.city,
        contact_name: masjid.contact_name,
    })
}

/// Get every masjid ordered by name.
pub fn get_all_masjids(connection: &Connection) -> Result<Vec<Masjid>, Error> {
    connection
        .prepare("SELECT id, name, city, contact_name FROM masjid ORDER BY name ASC")?
        .query_map([], |row| {
            Ok(Masjid {
                id: row.get(0)?,
                name: row.get(1)?,
                city: row.get(2)?,
                contact_name: row.get(3)?,
            })
        })?
        .map(|masjid| masjid.map_err(Error::from))
        .collect()
}

/// Record a collection against a masjid.
///
/// # Errors
/// Returns [Error::InvalidMasjid] if the masjid does not exist and
/// [Error::InvalidAmount] if the amount is negative.
pub fn record_collection(
    collection: NewCollection,
    connection: &Connection,
) -> Result<Collection, Error> {
    if collection.amount_pence < 0 {
        return Err(Error::InvalidAmount(collection.amount_pence.to_string()));
    }

    connection.execute(
        "INSERT INTO collection (masjid_id, amount_pence, collected_on, collection_type)
        VALUES (?1, ?2, ?3, ?4)",
        params![
            collection.masjid_id,
            collection.amount_pence,
            collection.collected_on,
            collection.collection_type,
        ],
    )?;

    Ok(Collection {
        id: connection.last_insert_rowid(),
        masjid_id: collection.masjid_id,
        amount_pence: collection.amount_pence,
        collected_on: collection.collected_on,
        collection_type: collection.collection_type,
    })
}

/// Per-masjid collection totals, highest total first.
///
/// Masjids without any collections are included with a zero total.
pub fn get_masjid_totals(connection: &Connection) -> Result<Vec<MasjidTotal>, Error> {
    connection
        .prepare(
            "SELECT masjid.id, masjid.name, masjid.city, masjid.contact_name, \
                COALESCE(SUM(collection.amount_pence), 0), COUNT(collection.id), \
                MAX(collection.collected_on) \
            FROM masjid \
            LEFT JOIN collection ON collection.masjid_id = masjid.id \
            GROUP BY masjid.id \
            ORDER BY 5 DESC, masjid.name ASC",
        )?
        .query_map([], |row| {
            Ok(MasjidTotal {
                masjid: Masjid {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    city: row.get(2)?,
                    contact_name: row.get(3)?,
                },
                total_pence: row.get(4)?,
                collection_count: row.get(5)?,
                last_collected_on: row.get(6)?,
            })
        })?
        .map(|total| total.map_err(Error::from))
        .collect()
}
