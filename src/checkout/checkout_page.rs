//! The public checkout page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use maud::{Markup, PreEscaped, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    basket::{Frequency, get_or_start_session, load_basket},
    donation::DonationType,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement,
        PAGE_CONTAINER_STYLE, base, pound_input_styles, select_input,
    },
};

use super::basket_view::basket_view;

/// The state needed by the checkout page and its endpoints.
#[derive(Debug, Clone)]
pub struct CheckoutState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Europe/London".
    pub local_timezone: String,
    /// Whether the session cookie is only sent over HTTPS.
    pub secure_cookies: bool,
}

impl FromRef<AppState> for CheckoutState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            secure_cookies: state.secure_cookies,
        }
    }
}

pub async fn get_checkout_page(
    State(state): State<CheckoutState>,
    jar: CookieJar,
) -> Result<Response, Error> {
    let (jar, session_id) = get_or_start_session(jar, state.secure_cookies);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let basket = load_basket(session_id, &connection)
        .inspect_err(|error| tracing::error!("could not load basket for {session_id}: {error}"))?;

    let content = html!(
        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-8 w-full lg:max-w-3xl"
            {
                h1 class="text-xl font-bold" { "Donate" }

                (add_item_form())

                section
                {
                    h2 class="text-lg font-bold mb-4" { "Your basket" }
                    (basket_view(&basket))
                }

                (donor_form())

                div id="wallet-button" {}
            }
        }
    );

    let head_elements = [
        pound_input_styles(),
        HeadElement::ScriptSource(PreEscaped(checkout_script())),
    ];

    Ok((jar, base("Checkout", &head_elements, &content)).into_response())
}

fn add_item_form() -> Markup {
    let type_options: Vec<_> = DonationType::ALL
        .iter()
        .map(|donation_type| (donation_type.as_str(), donation_type.label()))
        .collect();
    let frequency_options: Vec<_> = Frequency::ALL
        .iter()
        .map(|frequency| (frequency.as_str(), frequency.label()))
        .collect();

    html!(
        form
            hx-post=(endpoints::CHECKOUT_ITEMS)
            hx-target="#basket"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="grid grid-cols-1 gap-4 sm:grid-cols-2"
        {
            div
            {
                label for="appeal_title" class=(FORM_LABEL_STYLE) { "Appeal" }
                input id="appeal_title" type="text" name="appeal_title" required class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="product_name" class=(FORM_LABEL_STYLE) { "Project" }
                input id="product_name" type="text" name="product_name" class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="donation_type" class=(FORM_LABEL_STYLE) { "Type" }
                (select_input("donation_type", &type_options, Some(DonationType::General.as_str()), None))
            }

            div
            {
                label for="frequency" class=(FORM_LABEL_STYLE) { "How often" }
                (select_input("frequency", &frequency_options, Some(Frequency::OneOff.as_str()), None))
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }
                div class="input-wrapper w-full"
                {
                    input id="amount" type="number" name="amount" step="0.01" min="0" required class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div class="flex items-end"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add to basket" }
            }
        }
    )
}

fn text_input(name: &str, label: &str, input_type: &str, required: bool) -> Markup {
    html!(
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }
            input id=(name) type=(input_type) name=(name) required[required] class=(FORM_TEXT_INPUT_STYLE);
            p id={ (name) "-error" } class="mt-1 text-sm text-red-600 dark:text-red-500" {}
        }
    )
}

fn donor_form() -> Markup {
    html!(
        form id="donor-form" class="grid grid-cols-1 gap-4 sm:grid-cols-2"
        {
            h2 class="text-lg font-bold sm:col-span-2" { "Your details" }

            (text_input("first_name", "First name", "text", true))
            (text_input("last_name", "Last name", "text", true))
            (text_input("email", "Email", "email", true))
            (text_input("phone", "Phone", "tel", false))

            div
            {
                label for="country" class=(FORM_LABEL_STYLE) { "Country" }
                (select_input(
                    "country",
                    &[("GB", "United Kingdom"), ("IE", "Ireland"), ("US", "United States"), ("CA", "Canada")],
                    Some("GB"),
                    None,
                ))
            }

            (text_input("address_line1", "Address", "text", false))
            (text_input("city", "Town or city", "text", false))
            (text_input("postcode", "Postcode", "text", false))

            label class="flex items-center gap-2 sm:col-span-2"
            {
                input type="checkbox" name="gift_aid" value="true";
                "I am a UK taxpayer and want Gift Aid added to my donation"
            }
            p id="gift_aid-error" class="text-sm text-red-600 dark:text-red-500 sm:col-span-2" {}
            p id="basket-error" class="text-sm text-red-600 dark:text-red-500 sm:col-span-2" {}

            div class="sm:col-span-2"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Donate now" }
            }
        }
    )
}

/// Submits the donor form as JSON and asks the server which wallet button to show.
fn checkout_script() -> String {
    format!(
        r##"
        document.addEventListener("DOMContentLoaded", () => {{
            const form = document.getElementById("donor-form");
            form.addEventListener("submit", async (event) => {{
                event.preventDefault();
                form.querySelectorAll("[id$='-error']").forEach((p) => p.textContent = "");
                const data = new FormData(form);
                const donor = Object.fromEntries(
                    [...data.entries()].filter(([name, value]) => name !== "gift_aid" && value !== "")
                );
                donor.gift_aid = data.has("gift_aid");
                const coverFees = document.querySelector("input[name='cover_fees']").checked;
                const response = await fetch("{orders}", {{
                    method: "POST",
                    headers: {{ "Content-Type": "application/json" }},
                    body: JSON.stringify({{ donor, cover_fees: coverFees }}),
                }});
                const body = await response.json();
                if (response.ok) {{
                    document.dispatchEvent(new CustomEvent("order-placed", {{ detail: body }}));
                }} else {{
                    for (const error of body.errors ?? []) {{
                        const target = document.getElementById(`${{error.field}}-error`);
                        if (target) target.textContent = error.message;
                    }}
                }}
            }});

            const provider = window.paymentProvider;
            const capabilities = provider ? provider.canMakePayment() : Promise.resolve(null);
            capabilities.then((result) => htmx.ajax("POST", "{wallet}", {{
                target: "#wallet-button",
                values: {{ capabilities: JSON.stringify(result ?? null) }},
            }}));
        }});
        "##,
        orders = endpoints::ORDERS,
        wallet = endpoints::CHECKOUT_WALLET,
    )
}
