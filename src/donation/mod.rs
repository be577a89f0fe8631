//! Donation records: storage, the donations table page and its endpoints.

mod core;
mod create_endpoint;
mod donations_page;
mod export_endpoint;
mod filter;
mod status_endpoint;

pub use core::{
    CollectedVia, Donation, DonationId, DonationStatus, DonationType, NewDonation, PaymentMethod,
    create_donation, create_donation_table, get_donation, update_donation_status,
};
pub use create_endpoint::create_donation_endpoint;
pub use donations_page::get_donations_page;
pub use export_endpoint::export_donations_endpoint;
pub use filter::{DonationFilter, count_donations, query_donations};
pub use status_endpoint::update_donation_status_endpoint;

#[cfg(test)]
pub(crate) use core::test_utils;
