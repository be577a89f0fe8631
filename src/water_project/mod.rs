//! Water-project donations: wells, pumps, tanks and wudhu areas built on the donor's behalf.

mod core;
mod create_endpoint;
mod status_endpoint;
mod water_projects_page;

pub use core::create_water_project_table;
#[cfg(test)]
pub use core::{NewWaterProject, WaterProjectType, create_water_project};
pub use create_endpoint::create_water_project_endpoint;
pub use status_endpoint::update_water_project_status_endpoint;
pub use water_projects_page::get_water_projects_page;
