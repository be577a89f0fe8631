//! The page listing water-project donations and their progress.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    fulfillment::{FulfillmentQuery, FulfillmentStatus, status_actions, status_filter_links},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, pound_input_styles,
        select_input, status_badge,
    },
    money::format_pence,
    navigation::NavBar,
};

use super::core::{WaterProject, WaterProjectType, list_water_projects};

/// The state needed for the water projects page.
#[derive(Debug, Clone)]
pub struct WaterProjectsViewState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for WaterProjectsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

pub async fn get_water_projects_page(
    State(state): State<WaterProjectsViewState>,
    Query(query): Query<FulfillmentQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let projects = list_water_projects(query.status, &connection)
        .inspect_err(|error| tracing::error!("could not get water projects: {error}"))?;

    Ok(water_projects_view(&projects, query.status).into_response())
}

fn water_projects_view(projects: &[WaterProject], status: Option<FulfillmentStatus>) -> Markup {
    let nav_bar = NavBar::new(endpoints::WATER_PROJECTS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-6xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Water Projects" }
                }

                (status_filter_links(endpoints::WATER_PROJECTS_VIEW, status))

                div class="w-full overflow-x-auto dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Created" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Donor" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Project" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Location" }
                                th scope="col" class="px-6 py-4 text-right" { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for project in projects {
                                (water_project_row(project))
                            }

                            @if projects.is_empty() {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td colspan="7" class="px-6 py-4 text-center"
                                    {
                                        "No water projects yet."
                                    }
                                }
                            }
                        }
                    }
                }

                (new_water_project_form())
            }
        }
    );

    base("Water Projects", &[pound_input_styles()], &content)
}

pub(crate) fn water_project_row(project: &WaterProject) -> Markup {
    let status_url = format_endpoint(endpoints::WATER_PROJECT_STATUS, project.id);

    html!(
        tr class=(TABLE_ROW_STYLE) id={ "water-project-" (project.id) }
        {
            td class=(TABLE_CELL_STYLE)
            {
                time datetime=(project.created_at) { (project.created_at) }
            }
            td class=(TABLE_CELL_STYLE) { (project.donor_name) }
            td class=(TABLE_CELL_STYLE)
            {
                (project.project_type.label())

                @if let Some(notes) = &project.notes {
                    br;
                    span class="text-xs" { (notes) }
                }
            }
            td class=(TABLE_CELL_STYLE) { (project.location) }
            td class="px-6 py-4 text-right" { (format_pence(project.amount_pence)) }
            td class=(TABLE_CELL_STYLE)
            {
                (status_badge(project.status.label()))

                @if let Some(completed_at) = project.completed_at {
                    br;
                    span class="text-xs" { "on " (completed_at) }
                }
            }
            td class=(TABLE_CELL_STYLE) { (status_actions(project.status, &status_url)) }
        }
    )
}

fn new_water_project_form() -> Markup {
    let type_options: Vec<_> = WaterProjectType::ALL
        .iter()
        .map(|project_type| (project_type.as_str(), project_type.label()))
        .collect();

    html!(
        section class="w-full max-w-md mx-auto pt-8"
        {
            h2 class="text-lg font-bold mb-4" { "Record a water project" }

            form
                hx-post=(endpoints::WATER_PROJECTS_API)
                hx-target-error="#alert-container"
                class="space-y-4"
            {
                div
                {
                    label for="donor_name" class=(FORM_LABEL_STYLE) { "Donor name" }
                    input id="donor_name" type="text" name="donor_name" required class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="project_type" class=(FORM_LABEL_STYLE) { "Project" }
                    (select_input("project_type", &type_options, None, None))
                }

                div
                {
                    label for="location" class=(FORM_LABEL_STYLE) { "Location" }
                    input id="location" type="text" name="location" required class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }
                    div class="input-wrapper w-full"
                    {
                        input
                            id="amount"
                            type="number"
                            name="amount"
                            step="0.01"
                            min="0"
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }

                div
                {
                    label for="notes" class=(FORM_LABEL_STYLE) { "Notes" }
                    textarea id="notes" name="notes" rows="2" class=(FORM_TEXT_INPUT_STYLE) {}
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Record Project" }
            }
        }
    )
}
