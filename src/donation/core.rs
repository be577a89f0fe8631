//! The donation record and its enumerations.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, basket::Frequency, database_id::DatabaseId, db::sql_text_enum, money::Pence,
};

pub type DonationId = DatabaseId;

/// The Islamic giving category a donation is made under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DonationType {
    General,
    Zakat,
    Sadaqah,
    Lillah,
}

impl DonationType {
    pub const ALL: [DonationType; 4] = [
        DonationType::General,
        DonationType::Zakat,
        DonationType::Sadaqah,
        DonationType::Lillah,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DonationType::General => "GENERAL",
            DonationType::Zakat => "ZAKAT",
            DonationType::Sadaqah => "SADAQAH",
            DonationType::Lillah => "LILLAH",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DonationType::General => "General",
            DonationType::Zakat => "Zakat",
            DonationType::Sadaqah => "Sadaqah",
            DonationType::Lillah => "Lillah",
        }
    }
}

impl FromStr for DonationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GENERAL" => Ok(DonationType::General),
            "ZAKAT" => Ok(DonationType::Zakat),
            "SADAQAH" => Ok(DonationType::Sadaqah),
            "LILLAH" => Ok(DonationType::Lillah),
            other => Err(Error::InvalidVariant(other.to_owned())),
        }
    }
}

/// How the money was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Card,
    Cash,
    BankTransfer,
    Cheque,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Card,
        PaymentMethod::Cash,
        PaymentMethod::BankTransfer,
        PaymentMethod::Cheque,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Card => "CARD",
            PaymentMethod::Cash => "CASH",
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
            PaymentMethod::Cheque => "CHEQUE",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Card => "Card",
            PaymentMethod::Cash => "Cash",
            PaymentMethod::BankTransfer => "Bank transfer",
            PaymentMethod::Cheque => "Cheque",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CARD" => Ok(PaymentMethod::Card),
            "CASH" => Ok(PaymentMethod::Cash),
            "BANK_TRANSFER" => Ok(PaymentMethod::BankTransfer),
            "CHEQUE" => Ok(PaymentMethod::Cheque),
            other => Err(Error::InvalidVariant(other.to_owned())),
        }
    }
}

/// Where a donation is in the payment lifecycle.
///
/// Allowed changes: pending to completed or failed, failed back to pending
/// for a retry, and completed to refunded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DonationStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl DonationStatus {
    pub const ALL: [DonationStatus; 4] = [
        DonationStatus::Pending,
        DonationStatus::Completed,
        DonationStatus::Failed,
        DonationStatus::Refunded,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DonationStatus::Pending => "PENDING",
            DonationStatus::Completed => "COMPLETED",
            DonationStatus::Failed => "FAILED",
            DonationStatus::Refunded => "REFUNDED",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DonationStatus::Pending => "Pending",
            DonationStatus::Completed => "Completed",
            DonationStatus::Failed => "Failed",
            DonationStatus::Refunded => "Refunded",
        }
    }

    pub fn can_transition_to(self, next: DonationStatus) -> bool {
        matches!(
            (self, next),
            (DonationStatus::Pending, DonationStatus::Completed)
                | (DonationStatus::Pending, DonationStatus::Failed)
                | (DonationStatus::Failed, DonationStatus::Pending)
                | (DonationStatus::Completed, DonationStatus::Refunded)
        )
    }
}

impl Display for DonationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DonationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(DonationStatus::Pending),
            "COMPLETED" => Ok(DonationStatus::Completed),
            "FAILED" => Ok(DonationStatus::Failed),
            "REFUNDED" => Ok(DonationStatus::Refunded),
            other => Err(Error::InvalidVariant(other.to_owned())),
        }
    }
}

/// The channel a donation came in through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollectedVia {
    Website,
    Office,
    CollectionBox,
}

impl CollectedVia {
    pub const ALL: [CollectedVia; 3] = [
        CollectedVia::Website,
        CollectedVia::Office,
        CollectedVia::CollectionBox,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CollectedVia::Website => "WEBSITE",
            CollectedVia::Office => "OFFICE",
            CollectedVia::CollectionBox => "COLLECTION_BOX",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CollectedVia::Website => "Website",
            CollectedVia::Office => "Office",
            CollectedVia::CollectionBox => "Collection box",
        }
    }
}

impl FromStr for CollectedVia {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WEBSITE" => Ok(CollectedVia::Website),
            "OFFICE" => Ok(CollectedVia::Office),
            "COLLECTION_BOX" => Ok(CollectedVia::CollectionBox),
            other => Err(Error::InvalidVariant(other.to_owned())),
        }
    }
}

sql_text_enum!(DonationType);
sql_text_enum!(PaymentMethod);
sql_text_enum!(DonationStatus);
sql_text_enum!(CollectedVia);

/// A donation as recorded in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Donation {
    pub id: DonationId,
    /// The checkout order the donation was placed in, `None` for offline donations.
    pub order_id: Option<String>,
    pub donor_name: String,
    pub donor_email: Option<String>,
    pub appeal_title: String,
    pub amount_pence: Pence,
    /// The donor's share of the processing fees for this donation.
    pub fees_pence: Pence,
    pub frequency: Frequency,
    pub donation_type: DonationType,
    pub payment_method: PaymentMethod,
    pub status: DonationStatus,
    pub collected_via: Option<CollectedVia>,
    pub gift_aid: bool,
    pub date: Date,
}

/// The fields needed to record a donation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDonation {
    pub order_id: Option<String>,
    pub donor_name: String,
    pub donor_email: Option<String>,
    pub appeal_title: String,
    pub amount_pence: Pence,
    pub fees_pence: Pence,
    pub frequency: Frequency,
    pub donation_type: DonationType,
    pub payment_method: PaymentMethod,
    pub status: DonationStatus,
    pub collected_via: Option<CollectedVia>,
    pub gift_aid: bool,
    pub date: Date,
}

pub fn create_donation_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS donation (
            id INTEGER PRIMARY KEY,
            order_id TEXT,
            donor_name TEXT NOT NULL,
            donor_email TEXT,
            appeal_title TEXT NOT NULL,
            amount_pence INTEGER NOT NULL CHECK (amount_pence >= 0),
            fees_pence INTEGER NOT NULL DEFAULT 0 CHECK (fees_pence >= 0),
            frequency TEXT NOT NULL,
            donation_type TEXT NOT NULL,
            payment_method TEXT NOT NULL,
            status TEXT NOT NULL,
            collected_via TEXT,
            gift_aid INTEGER NOT NULL DEFAULT 0,
            date TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_donation_date ON donation(date);
        CREATE INDEX IF NOT EXISTS idx_donation_order_id ON donation(order_id);",
    )?;

    Ok(())
}

/// The columns selected by [map_row_to_donation], in order.
pub(crate) const DONATION_COLUMNS: &str = "id, order_id, donor_name, donor_email, appeal_title, \
    amount_pence, fees_pence, frequency, donation_type, payment_method, status, collected_via, \
    gift_aid, date";

pub fn map_row_to_donation(row: &Row) -> Result<Donation, rusqlite::Error> {
    Ok(Donation {
        id: row.get(0)?,
        order_id: row.get(1)?,
        donor_name: row.get(2)?,
        donor_email: row.get(3)?,
        appeal_title: row.get(4)?,
        amount_pence: row.get(5)?,
        fees_pence: row.get(6)?,
        frequency: row.get(7)?,
        donation_type: row.get(8)?,
        payment_method: row.get(9)?,
        status: row.get(10)?,
        collected_via: row.get(11)?,
        gift_aid: row.get(12)?,
        date: row.get(13)?,
    })
}

/// Record a donation and return it with its generated ID.
///
/// # Errors
/// Returns [Error::InvalidAmount] for negative amounts or fees, or an SQL error.
pub fn create_donation(donation: NewDonation, connection: &Connection) -> Result<Donation, Error> {
    if donation.amount_pence < 0 {
        return Err(Error::InvalidAmount(donation.amount_pence.to_string()));
    }

    if donation.fees_pence < 0 {
        return Err(Error::InvalidAmount(donation.fees_pence.to_string()));
    }

    connection.execute(
        "INSERT INTO donation (order_id, donor_name, donor_email, appeal_title, amount_pence, \
            fees_pence, frequency, donation_type, payment_method, status, collected_via, \
            gift_aid, date)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            donation.order_id,
            donation.donor_name,
            donation.donor_email,
            donation.appeal_title,
            donation.amount_pence,
            donation.fees_pence,
            donation.frequency,
            donation.donation_type,
            donation.payment_method,
            donation.status,
            donation.collected_via,
            donation.gift_aid,
            donation.date,
        ],
    )?;

    let id = connection.last_insert_rowid();

    Ok(Donation {
        id,
        order_id: donation.order_id,
        donor_name: donation.donor_name,
        donor_email: donation.donor_email,
        appeal_title: donation.appeal_title,
        amount_pence: donation.amount_pence,
        fees_pence: donation.fees_pence,
        frequency: donation.frequency,
        donation_type: donation.donation_type,
        payment_method: donation.payment_method,
        status: donation.status,
        collected_via: donation.collected_via,
        gift_aid: donation.gift_aid,
        date: donation.date,
    })
}

/// Retrieve a single donation by ID.
pub fn get_donation(id: DonationId, connection: &Connection) -> Result<Donation, Error> {
    connection
        .prepare(&format!(
            "SELECT {DONATION_COLUMNS} FROM donation WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_row_to_donation)
        .map_err(Error::from)
}

/// Move a donation to `status`.
///
/// # Errors
/// Returns [Error::UpdateMissingDonation] if the donation does not exist and
/// [Error::InvalidStatusTransition] if the change is not allowed.
pub fn update_donation_status(
    id: DonationId,
    status: DonationStatus,
    connection: &Connection,
) -> Result<Donation, Error> {
    let mut donation = match get_donation(id, connection) {
        Ok(donation) => donation,
        Err(Error::NotFound) => return Err(Error::UpdateMissingDonation),
        Err(error) => return Err(error),
    };

    if !donation.status.can_transition_to(status) {
        return Err(Error::InvalidStatusTransition {
            from: donation.status.to_string(),
            to: status.to_string(),
        });
    }

    connection.execute(
        "UPDATE donation SET status = ?1 WHERE id = ?2",
        params![status, id],
    )?;

    donation.status = status;

    Ok(donation)
}
