//! Endpoints that change the basket and respond with the updated basket partial.

use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    Error,
    alert::Alert,
    basket::{Basket, Frequency, NewBasketItem, get_or_start_session, load_basket, save_basket},
    donation::DonationType,
    money::parse_pounds,
};

use super::{basket_view::basket_view, checkout_page::CheckoutState};

#[derive(Debug, Deserialize)]
pub struct AddItemForm {
    pub appeal_title: String,
    #[serde(default)]
    pub product_name: Option<String>,
    pub donation_type: DonationType,
    /// The amount in pounds.
    pub amount: String,
    pub frequency: Frequency,
}

#[derive(Debug, Deserialize)]
pub struct CoverFeesForm {
    /// Absent when the checkbox is unticked.
    #[serde(default)]
    pub cover_fees: bool,
}

/// Load the session's basket, apply `change`, save it and render the basket partial.
fn update_basket(
    state: &CheckoutState,
    jar: CookieJar,
    change: impl FnOnce(&mut Basket) -> Result<(), Error>,
) -> Response {
    let (jar, session_id) = get_or_start_session(jar, state.secure_cookies);

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let mut basket = match load_basket(session_id, &connection) {
        Ok(basket) => basket,
        Err(error) => {
            tracing::error!("could not load basket for {session_id}: {error}");
            return error.into_alert_response();
        }
    };

    if let Err(error) = change(&mut basket) {
        return error.into_alert_response();
    }

    if let Err(error) = save_basket(session_id, &basket, &connection) {
        tracing::error!("could not save basket for {session_id}: {error}");
        return error.into_alert_response();
    }

    (jar, basket_view(&basket)).into_response()
}

pub async fn add_basket_item_endpoint(
    State(state): State<CheckoutState>,
    jar: CookieJar,
    Form(form): Form<AddItemForm>,
) -> Response {
    if form.appeal_title.trim().is_empty() {
        return Alert::Error {
            message: "Missing appeal".to_owned(),
            details: "Choose an appeal to donate to.".to_owned(),
        }
        .into_response_with_status(StatusCode::BAD_REQUEST);
    }

    update_basket(&state, jar, |basket| {
        let item = NewBasketItem {
            appeal_title: form.appeal_title,
            product_name: form.product_name,
            donation_type: form.donation_type,
            amount_pence: parse_pounds(&form.amount)?,
            frequency: form.frequency,
        };

        let item = basket.add_item(item)?;
        tracing::debug!("Added {} to basket", item.appeal_title);

        Ok(())
    })
}

/// Removing an item that is not in the basket leaves the basket unchanged.
pub async fn remove_basket_item_endpoint(
    State(state): State<CheckoutState>,
    jar: CookieJar,
    Path(item_id): Path<Uuid>,
) -> Response {
    update_basket(&state, jar, |basket| {
        if !basket.remove_item(item_id) {
            tracing::debug!("Basket item {item_id} was already removed");
        }

        Ok(())
    })
}

pub async fn cover_fees_endpoint(
    State(state): State<CheckoutState>,
    jar: CookieJar,
    Form(form): Form<CoverFeesForm>,
) -> Response {
    update_basket(&state, jar, |basket| {
        basket.cover_fees = form.cover_fees;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        body::Body,
        extract::{Path, State},
        http::StatusCode,
        response::Response,
    };
    use axum_extra::extract::{CookieJar, cookie::Cookie};
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        basket::{Frequency, SESSION_COOKIE, SessionId, load_basket},
        db::initialize,
        donation::DonationType,
        test_utils::parse_html_fragment,
    };

    use super::{
        AddItemForm, CoverFeesForm, CheckoutState, add_basket_item_endpoint, cover_fees_endpoint,
        remove_basket_item_endpoint,
    };

    fn get_test_state() -> CheckoutState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        CheckoutState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Europe/London".to_owned(),
            secure_cookies: false,
        }
    }

    fn session_jar(session_id: SessionId) -> CookieJar {
        CookieJar::new().add(Cookie::new(SESSION_COOKIE, session_id.to_string()))
    }

    fn add_form(amount: &str, frequency: Frequency) -> AddItemForm {
        AddItemForm {
            appeal_title: "Ramadan Appeal".to_owned(),
            product_name: Some("Food pack".to_owned()),
            donation_type: DonationType::Zakat,
            amount: amount.to_owned(),
            frequency,
        }
    }

    async fn text_of(response: Response<Body>, selector: &str) -> String {
        let html = parse_html_fragment(response).await;
        html.select(&Selector::parse(selector).unwrap())
            .next()
            .unwrap_or_else(|| panic!("{selector} missing"))
            .text()
            .collect()
    }

    #[tokio::test]
    async fn adding_item_saves_basket_and_renders_totals() {
        let state = get_test_state();
        let session_id = SessionId::new();

        let response = add_basket_item_endpoint(
            State(state.clone()),
            session_jar(session_id),
            Form(add_form("25", Frequency::OneOff)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(text_of(response, "#total").await, "£25.00");
        let connection = state.db_connection.lock().unwrap();
        let basket = load_basket(session_id, &connection).unwrap();
        assert_eq!(basket.items.len(), 1);
        assert_eq!(basket.items[0].amount_pence, 2_500);
    }

    #[tokio::test]
    async fn invalid_amount_is_bad_request() {
        let response = add_basket_item_endpoint(
            State(get_test_state()),
            session_jar(SessionId::new()),
            Form(add_form("-5", Frequency::OneOff)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_amount_is_rejected_before_fees_are_worked_out() {
        let state = get_test_state();
        let session_id = SessionId::new();

        let response = add_basket_item_endpoint(
            State(state.clone()),
            session_jar(session_id),
            Form(add_form("10000000000000000", Frequency::OneOff)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = cover_fees_endpoint(
            State(state.clone()),
            session_jar(session_id),
            Form(CoverFeesForm { cover_fees: true }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let connection = state.db_connection.lock().unwrap();
        assert!(load_basket(session_id, &connection).unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_appeal_is_bad_request() {
        let mut form = add_form("10", Frequency::OneOff);
        form.appeal_title = "  ".to_owned();

        let response =
            add_basket_item_endpoint(State(get_test_state()), session_jar(SessionId::new()), Form(form))
                .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn covering_fees_updates_summary() {
        let state = get_test_state();
        let session_id = SessionId::new();
        add_basket_item_endpoint(
            State(state.clone()),
            session_jar(session_id),
            Form(add_form("10", Frequency::OneOff)),
        )
        .await;
        add_basket_item_endpoint(
            State(state.clone()),
            session_jar(session_id),
            Form(add_form("10", Frequency::Monthly)),
        )
        .await;

        let response = cover_fees_endpoint(
            State(state),
            session_jar(session_id),
            Form(CoverFeesForm { cover_fees: true }),
        )
        .await;

        let html = parse_html_fragment(response).await;
        let text = |selector: &str| -> String {
            html.select(&Selector::parse(selector).unwrap())
                .next()
                .unwrap()
                .text()
                .collect()
        };
        assert_eq!(text("#fees"), "£0.44");
        assert_eq!(text("#one-off-total"), "£10.22");
        assert_eq!(text("#recurring-total"), "£10.22");
        assert_eq!(text("#total"), "£20.44");
    }

    #[tokio::test]
    async fn removing_item_empties_basket() {
        let state = get_test_state();
        let session_id = SessionId::new();
        add_basket_item_endpoint(
            State(state.clone()),
            session_jar(session_id),
            Form(add_form("10", Frequency::OneOff)),
        )
        .await;
        let item_id = {
            let connection = state.db_connection.lock().unwrap();
            load_basket(session_id, &connection).unwrap().items[0].id
        };

        let response =
            remove_basket_item_endpoint(State(state.clone()), session_jar(session_id), Path(item_id))
                .await;

        assert_eq!(response.status(), StatusCode::OK);
        let connection = state.db_connection.lock().unwrap();
        assert!(load_basket(session_id, &connection).unwrap().is_empty());
    }
}
