//! Sponsorship donations for orphans, hafiz students and families.

mod core;
mod create_endpoint;
mod sponsorships_page;
mod status_endpoint;

pub use core::create_sponsorship_table;
#[cfg(test)]
pub use core::{NewSponsorship, SponsorshipType, create_sponsorship};
pub use create_endpoint::create_sponsorship_endpoint;
pub use sponsorships_page::get_sponsorships_page;
pub use status_endpoint::update_sponsorship_status_endpoint;
