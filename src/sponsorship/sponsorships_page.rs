//! The page listing sponsorship donations and their progress.

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
    basket::Frequency,
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

use super::core::{Sponsorship, SponsorshipType, list_sponsorships};

#[derive(Debug, Clone)]
pub struct SponsorshipsViewState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SponsorshipsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

pub async fn get_sponsorships_page(
    State(state): State<SponsorshipsViewState>,
    Query(query): Query<FulfillmentQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let sponsorships = list_sponsorships(query.status, &connection)
        .inspect_err(|error| tracing::error!("could not get sponsorships: {error}"))?;

    Ok(sponsorships_view(&sponsorships, query.status).into_response())
}

fn sponsorships_view(sponsorships: &[Sponsorship], status: Option<FulfillmentStatus>) -> Markup {
    let nav_bar = NavBar::new(endpoints::SPONSORSHIPS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-6xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Sponsorships" }
                }

                (status_filter_links(endpoints::SPONSORSHIPS_VIEW, status))

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
                                th scope="col" class=(TABLE_CELL_STYLE) { "Sponsorship" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Beneficiary" }
                                th scope="col" class="px-6 py-4 text-right" { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for sponsorship in sponsorships {
                                (sponsorship_row(sponsorship))
                            }

                            @if sponsorships.is_empty() {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td colspan="7" class="px-6 py-4 text-center"
                                    {
                                        "No sponsorships yet."
                                    }
                                }
                            }
                        }
                    }
                }

                (new_sponsorship_form())
            }
        }
    );

    base("Sponsorships", &[pound_input_styles()], &content)
}

pub(crate) fn sponsorship_row(sponsorship: &Sponsorship) -> Markup {
    let status_url = format_endpoint(endpoints::SPONSORSHIP_STATUS, sponsorship.id);

    html!(
        tr class=(TABLE_ROW_STYLE) id={ "sponsorship-" (sponsorship.id) }
        {
            td class=(TABLE_CELL_STYLE)
            {
                time datetime=(sponsorship.created_at) { (sponsorship.created_at) }
            }
            td class=(TABLE_CELL_STYLE) { (sponsorship.donor_name) }
            td class=(TABLE_CELL_STYLE) { (sponsorship.sponsorship_type.label()) }
            td class=(TABLE_CELL_STYLE)
            {
                @match &sponsorship.beneficiary {
                    Some(beneficiary) => {
                        (beneficiary)
                    }
                    None => {
                        span class="italic" { "Not assigned" }
                    }
                }
            }
            td class="px-6 py-4 text-right"
            {
                (format_pence(sponsorship.amount_pence))
                br;
                span class="text-xs" { (sponsorship.frequency.label()) }
            }
            td class=(TABLE_CELL_STYLE)
            {
                (status_badge(sponsorship.status.label()))

                @if let Some(completed_at) = sponsorship.completed_at {
                    br;
                    span class="text-xs" { "on " (completed_at) }
                }
            }
            td class=(TABLE_CELL_STYLE) { (status_actions(sponsorship.status, &status_url)) }
        }
    )
}

fn new_sponsorship_form() -> Markup {
    let type_options: Vec<_> = SponsorshipType::ALL
        .iter()
        .map(|sponsorship_type| (sponsorship_type.as_str(), sponsorship_type.label()))
        .collect();
    let frequency_options: Vec<_> = Frequency::ALL
        .iter()
        .map(|frequency| (frequency.as_str(), frequency.label()))
        .collect();

    html!(
        section class="w-full max-w-md mx-auto pt-8"
        {
            h2 class="text-lg font-bold mb-4" { "Record a sponsorship" }

            form
                hx-post=(endpoints::SPONSORSHIPS_API)
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
                    label for="sponsorship_type" class=(FORM_LABEL_STYLE) { "Sponsorship" }
                    (select_input("sponsorship_type", &type_options, None, None))
                }

                div
                {
                    label for="beneficiary" class=(FORM_LABEL_STYLE) { "Beneficiary" }
                    input id="beneficiary" type="text" name="beneficiary" class=(FORM_TEXT_INPUT_STYLE);
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
                    label for="frequency" class=(FORM_LABEL_STYLE) { "Frequency" }
                    (select_input("frequency", &frequency_options, Some(Frequency::Monthly.as_str()), None))
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Record Sponsorship" }
            }
        }
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::Query;
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        basket::Frequency,
        db::initialize,
        fulfillment::FulfillmentQuery,
        sponsorship::core::{NewSponsorship, SponsorshipType, create_sponsorship},
        test_utils::{assert_valid_html, parse_html_document},
    };

    use super::{SponsorshipsViewState, get_sponsorships_page};

    #[tokio::test]
    async fn lists_sponsorships() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        create_sponsorship(
            NewSponsorship {
                donor_name: "Khadija Noor".to_owned(),
                sponsorship_type: SponsorshipType::Hafiz,
                beneficiary: None,
                amount_pence: 4_500,
                frequency: Frequency::Monthly,
                created_at: date!(2025 - 03 - 03),
            },
            &conn,
        )
        .unwrap();
        let state = SponsorshipsViewState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response = get_sponsorships_page(State(state), Query(FulfillmentQuery::default()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let row = html
            .select(&Selector::parse("tr#sponsorship-1").unwrap())
            .next()
            .expect("sponsorship row missing");
        let text: String = row.text().collect();
        assert!(text.contains("Hafiz sponsorship"));
        assert!(text.contains("Not assigned"));
        assert!(text.contains("Monthly"));
    }
}
