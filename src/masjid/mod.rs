//! Masjids and the collections taken at them.

mod core;
mod create_endpoint;
mod masjids_page;

pub use core::{create_collection_table, create_masjid_table};
pub use create_endpoint::{create_masjid_endpoint, record_collection_endpoint};
pub use masjids_page::get_masjids_page;
