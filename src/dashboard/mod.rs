//! The admin dashboard: headline figures, charts and the latest donations.

mod aggregation;
mod cards;
mod charts;
mod handlers;
mod queries;
mod tables;

pub use handlers::{DashboardState, get_dashboard_page};
