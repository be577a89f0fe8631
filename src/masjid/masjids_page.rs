//! The page listing masjids with their collection totals.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, currency_rounded_with_tooltip,
        pound_input_styles, select_input,
    },
    navigation::NavBar,
    timezone::local_today,
};

use super::core::{CollectionType, Masjid, MasjidTotal, get_all_masjids, get_masjid_totals};

#[derive(Debug, Clone)]
pub struct MasjidsViewState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for MasjidsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

pub async fn get_masjids_page(State(state): State<MasjidsViewState>) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let totals = get_masjid_totals(&connection)
        .inspect_err(|error| tracing::error!("could not get masjid totals: {error}"))?;
    let masjids = get_all_masjids(&connection)
        .inspect_err(|error| tracing::error!("could not get masjids: {error}"))?;

    Ok(masjids_view(&totals, &masjids, today).into_response())
}

fn masjids_view(totals: &[MasjidTotal], masjids: &[Masjid], today: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::MASJIDS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Masjids" }
                }

                div class="w-full overflow-x-auto dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Masjid" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "City" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Contact" }
                                th scope="col" class="px-6 py-4 text-right" { "Collected" }
                                th scope="col" class="px-6 py-4 text-right" { "Collections" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Last collection" }
                            }
                        }

                        tbody
                        {
                            @for total in totals {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    th
                                        scope="row"
                                        class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                                    {
                                        (total.masjid.name)
                                    }
                                    td class=(TABLE_CELL_STYLE) { (total.masjid.city) }
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        (total.masjid.contact_name.as_deref().unwrap_or("-"))
                                    }
                                    td class="px-6 py-4 text-right"
                                    {
                                        (currency_rounded_with_tooltip(total.total_pence))
                                    }
                                    td class="px-6 py-4 text-right" { (total.collection_count) }
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        @if let Some(date) = total.last_collected_on {
                                            time datetime=(date) { (date) }
                                        } @else {
                                            "Never"
                                        }
                                    }
                                }
                            }

                            @if totals.is_empty() {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td colspan="6" class="px-6 py-4 text-center"
                                    {
                                        "No masjids yet, add one below."
                                    }
                                }
                            }
                        }
                    }
                }

                div class="grid grid-cols-1 gap-8 lg:grid-cols-2 pt-8"
                {
                    (new_masjid_form())

                    @if !masjids.is_empty() {
                        (new_collection_form(masjids, today))
                    }
                }
            }
        }
    );

    base("Masjids", &[pound_input_styles()], &content)
}

fn new_masjid_form() -> Markup {
    html!(
        section
        {
            h2 class="text-lg font-bold mb-4" { "Add a masjid" }

            form
                hx-post=(endpoints::MASJIDS_API)
                hx-target-error="#alert-container"
                class="space-y-4"
            {
                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Name" }
                    input id="name" type="text" name="name" required class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="city" class=(FORM_LABEL_STYLE) { "City" }
                    input id="city" type="text" name="city" required class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="contact_name" class=(FORM_LABEL_STYLE) { "Contact" }
                    input id="contact_name" type="text" name="contact_name" class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Masjid" }
            }
        }
    )
}

/// The masjid select lists masjids by name rather than by total.
fn new_collection_form(masjids: &[Masjid], today: Date) -> Markup {
    let masjid_ids: Vec<String> = masjids.iter().map(|masjid| masjid.id.to_string()).collect();
    let masjid_options: Vec<_> = masjid_ids
        .iter()
        .zip(masjids)
        .map(|(id, masjid)| (id.as_str(), masjid.name.as_str()))
        .collect();
    let type_options: Vec<_> = CollectionType::ALL
        .iter()
        .map(|collection_type| (collection_type.as_str(), collection_type.label()))
        .collect();

    html!(
        section
        {
            h2 class="text-lg font-bold mb-4" { "Record a collection" }

            form
                hx-post=(endpoints::COLLECTIONS_API)
                hx-target-error="#alert-container"
                class="space-y-4"
            {
                div
                {
                    label for="masjid_id" class=(FORM_LABEL_STYLE) { "Masjid" }
                    (select_input("masjid_id", &masjid_options, None, None))
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
                    label for="collected_on" class=(FORM_LABEL_STYLE) { "Date" }
                    input
                        id="collected_on"
                        type="date"
                        name="collected_on"
                        value=(today)
                        max=(today)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="collection_type" class=(FORM_LABEL_STYLE) { "Occasion" }
                    (select_input("collection_type", &type_options, Some(CollectionType::Jummah.as_str()), None))
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Record Collection" }
            }
        }
    )
}
