//! The page listing donations with filters, paging and a form for offline donations.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        pound_input_styles, select_input, status_badge,
    },
    money::format_pence,
    navigation::NavBar,
    pagination::{
        Page, PageQuery, PaginationConfig, create_pagination_indicators, pagination_view,
    },
    timezone::local_today,
};

use super::{
    core::{CollectedVia, Donation, DonationStatus, DonationType, PaymentMethod},
    filter::{DonationFilter, count_donations, query_donations},
};

/// The state needed for the donations page.
#[derive(Debug, Clone)]
pub struct DonationsViewState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Europe/London".
    pub local_timezone: String,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for DonationsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// Render the donations table for the donations matching the query string filters.
pub async fn get_donations_page(
    State(state): State<DonationsViewState>,
    Query(filter): Query<DonationFilter>,
    Query(page_query): Query<PageQuery>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let page = Page::resolve(page_query, &state.pagination_config);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let donation_count = count_donations(&filter, &connection)
        .inspect_err(|error| tracing::error!("could not count donations: {error}"))?;
    let donations = query_donations(&filter, Some(page), &connection)
        .inspect_err(|error| tracing::error!("could not get donations: {error}"))?;

    let indicators = create_pagination_indicators(
        page.number,
        page.page_count(donation_count),
        state.pagination_config.max_pages,
    );
    let query_string = filter.to_query_string();
    let pagination = pagination_view(&indicators, |page_number| {
        if query_string.is_empty() {
            format!("{}?page={page_number}&per_page={}", endpoints::DONATIONS_VIEW, page.size)
        } else {
            format!(
                "{}?{query_string}&page={page_number}&per_page={}",
                endpoints::DONATIONS_VIEW,
                page.size
            )
        }
    });

    Ok(donations_view(&donations, &filter, pagination, today).into_response())
}

fn donations_view(
    donations: &[Donation],
    filter: &DonationFilter,
    pagination: Markup,
    today: Date,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DONATIONS_VIEW).into_html();
    let query_string = filter.to_query_string();
    let export_url = if query_string.is_empty() {
        endpoints::DONATIONS_EXPORT.to_owned()
    } else {
        format!("{}?{query_string}", endpoints::DONATIONS_EXPORT)
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-6xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Donations" }

                    a href=(export_url) class=(LINK_STYLE) { "Export CSV" }
                }

                (filter_form(filter))

                div class="w-full overflow-x-auto dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Donor" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Appeal" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                th scope="col" class="px-6 py-4 text-right" { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for donation in donations {
                                (donation_row(donation))
                            }

                            @if donations.is_empty() {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td colspan="7" class="px-6 py-4 text-center"
                                    {
                                        "No donations match these filters."
                                    }
                                }
                            }
                        }
                    }
                }

                (pagination)

                (new_donation_form(today))
            }
        }
    );

    base("Donations", &[pound_input_styles()], &content)
}

fn filter_form(filter: &DonationFilter) -> Markup {
    let status_options: Vec<_> = DonationStatus::ALL
        .iter()
        .map(|status| (status.as_str(), status.label()))
        .collect();
    let type_options: Vec<_> = DonationType::ALL
        .iter()
        .map(|donation_type| (donation_type.as_str(), donation_type.label()))
        .collect();

    html!(
        form
            method="get"
            action=(endpoints::DONATIONS_VIEW)
            class="grid grid-cols-1 gap-4 md:grid-cols-6 items-end"
        {
            div class="md:col-span-2"
            {
                label for="search" class=(FORM_LABEL_STYLE) { "Search" }
                input
                    id="search"
                    type="search"
                    name="search"
                    placeholder="Donor, email or appeal"
                    value=[filter.search.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="status" class=(FORM_LABEL_STYLE) { "Status" }
                (select_input("status", &status_options, filter.status.map(DonationStatus::as_str), Some("Any")))
            }

            div
            {
                label for="donation_type" class=(FORM_LABEL_STYLE) { "Type" }
                (select_input(
                    "donation_type",
                    &type_options,
                    filter.donation_type.map(DonationType::as_str),
                    Some("Any"),
                ))
            }

            div
            {
                label for="from" class=(FORM_LABEL_STYLE) { "From" }
                input
                    id="from"
                    type="date"
                    name="from"
                    value=[filter.from]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="to" class=(FORM_LABEL_STYLE) { "To" }
                input
                    id="to"
                    type="date"
                    name="to"
                    value=[filter.to]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Filter" }
        }
    )
}

/// A row of the donations table with buttons for the allowed status changes.
pub(crate) fn donation_row(donation: &Donation) -> Markup {
    let status_url = format_endpoint(endpoints::DONATION_STATUS, donation.id);
    let next_statuses = DonationStatus::ALL
        .into_iter()
        .filter(|status| donation.status.can_transition_to(*status));

    html!(
        tr class=(TABLE_ROW_STYLE) id={ "donation-" (donation.id) }
        {
            td class=(TABLE_CELL_STYLE)
            {
                time datetime=(donation.date) { (donation.date) }
            }
            td class=(TABLE_CELL_STYLE)
            {
                (donation.donor_name)

                @if let Some(email) = &donation.donor_email {
                    br;
                    span class="text-xs" { (email) }
                }
            }
            td class=(TABLE_CELL_STYLE) { (donation.appeal_title) }
            td class=(TABLE_CELL_STYLE) { (donation.donation_type.label()) }
            td class="px-6 py-4 text-right" { (format_pence(donation.amount_pence)) }
            td class=(TABLE_CELL_STYLE) { (status_badge(donation.status.label())) }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    @for status in next_statuses {
                        button
                            type="button"
                            class=(LINK_STYLE)
                            hx-put=(status_url)
                            hx-vals={ r#"{"status": ""# (status.as_str()) r#""}"# }
                            hx-target="closest tr"
                            hx-swap="outerHTML"
                            hx-target-error="#alert-container"
                        {
                            "Mark " (status.label().to_lowercase())
                        }
                    }
                }
            }
        }
    )
}

fn new_donation_form(today: Date) -> Markup {
    let type_options: Vec<_> = DonationType::ALL
        .iter()
        .map(|donation_type| (donation_type.as_str(), donation_type.label()))
        .collect();
    let method_options: Vec<_> = PaymentMethod::ALL
        .iter()
        .map(|method| (method.as_str(), method.label()))
        .collect();
    let channel_options: Vec<_> = CollectedVia::ALL
        .iter()
        .map(|channel| (channel.as_str(), channel.label()))
        .collect();

    html!(
        section class="w-full max-w-md mx-auto pt-8"
        {
            h2 class="text-lg font-bold mb-4" { "Record an offline donation" }

            form
                hx-post=(endpoints::DONATIONS_API)
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
                    label for="donor_email" class=(FORM_LABEL_STYLE) { "Donor email" }
                    input id="donor_email" type="email" name="donor_email" class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="appeal_title" class=(FORM_LABEL_STYLE) { "Appeal" }
                    input id="appeal_title" type="text" name="appeal_title" required class=(FORM_TEXT_INPUT_STYLE);
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
                    label for="donation_type" class=(FORM_LABEL_STYLE) { "Type" }
                    (select_input("donation_type", &type_options, Some(DonationType::General.as_str()), None))
                }

                div
                {
                    label for="payment_method" class=(FORM_LABEL_STYLE) { "Payment method" }
                    (select_input("payment_method", &method_options, Some(PaymentMethod::Cash.as_str()), None))
                }

                div
                {
                    label for="collected_via" class=(FORM_LABEL_STYLE) { "Channel" }
                    (select_input("collected_via", &channel_options, Some(CollectedVia::Office.as_str()), None))
                }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }
                    input
                        id="date"
                        type="date"
                        name="date"
                        value=(today)
                        max=(today)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div class="flex items-center gap-2"
                {
                    input id="gift_aid" type="checkbox" name="gift_aid" value="true";
                    label for="gift_aid" class="text-sm" { "Gift Aid declared" }
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Record Donation" }
            }
        }
    )
}
