//! Database initialisation and the helpers shared by the table modules.

use rusqlite::{Connection, TransactionBehavior};

use crate::{
    Error,
    basket::create_checkout_session_table,
    donation::create_donation_table,
    masjid::{create_collection_table, create_masjid_table},
    sponsorship::create_sponsorship_table,
    water_project::create_water_project_table,
};

/// Create the tables for all of the domain models.
///
/// Safe to call on an existing database, tables that already exist are left as is.
///
/// # Errors
/// Returns an error if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Foreign keys are off by default in SQLite and cannot be changed inside a transaction.
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction =
        rusqlite::Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_checkout_session_table(&transaction)?;
    create_donation_table(&transaction)?;
    create_masjid_table(&transaction)?;
    create_collection_table(&transaction)?;
    create_water_project_table(&transaction)?;
    create_sponsorship_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Store an enum as its `as_str` text and read it back with [std::str::FromStr].
///
/// The type must have an `as_str(self) -> &'static str` method and implement
/// `FromStr`. Unknown text in the database is reported as a conversion error.
macro_rules! sql_text_enum {
    ($type:ty) => {
        impl rusqlite::types::ToSql for $type {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(rusqlite::types::ToSqlOutput::from(self.as_str()))
            }
        }

        impl rusqlite::types::FromSql for $type {
            fn column_result(
                value: rusqlite::types::ValueRef<'_>,
            ) -> rusqlite::types::FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|error| rusqlite::types::FromSqlError::Other(Box::new(error)))
            }
        }
    };
}

pub(crate) use sql_text_enum;
