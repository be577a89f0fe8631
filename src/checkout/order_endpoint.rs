//! Placing an order for everything in the basket.
//!
//! The card is charged by the payment provider after the order is recorded.
//! This endpoint only records each basket item as a pending donation and
//! reports the amounts the provider should charge.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::{
    Error,
    basket::{Basket, BasketItem, Frequency, clear_basket, get_or_start_session, load_basket, scale_rounded},
    donation::{
        CollectedVia, DonationId, DonationStatus, NewDonation, PaymentMethod, create_donation,
    },
    money::Pence,
    timezone::local_today,
};

use super::{
    checkout_page::CheckoutState,
    validation::{DonorDetails, FieldError, validate_checkout},
};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrderRequest {
    pub donor: DonorDetails,
    #[serde(default)]
    pub cover_fees: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub donation_id: DonationId,
    pub appeal_title: String,
    pub frequency: Frequency,
    pub amount_pence: Pence,
    /// This item's share of the processing fee.
    pub fees_pence: Pence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderResponse {
    pub order_id: String,
    pub items: Vec<OrderItem>,
    pub subtotal_pence: Pence,
    pub fees_pence: Pence,
    pub total_pence: Pence,
    /// The amount to charge now.
    pub one_off_total_pence: Pence,
    /// The amount to set up as a subscription.
    pub recurring_total_pence: Pence,
}

#[derive(Debug, Serialize)]
struct ValidationErrors {
    errors: Vec<FieldError>,
}

/// Validate the donor's details and record the session's basket as pending donations.
///
/// Responds with 422 and the failed rules as JSON when validation fails, in
/// which case the basket is left as it was.
pub async fn place_order_endpoint(
    State(state): State<CheckoutState>,
    jar: CookieJar,
    Json(request): Json<OrderRequest>,
) -> Response {
    let (jar, session_id) = get_or_start_session(jar, state.secure_cookies);

    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let mut basket = match load_basket(session_id, &connection) {
        Ok(basket) => basket,
        Err(error) => {
            tracing::error!("could not load basket for {session_id}: {error}");
            return error.into_response();
        }
    };
    basket.cover_fees = request.cover_fees;

    let errors = validate_checkout(&request.donor, &basket);
    if !errors.is_empty() {
        tracing::debug!("Rejected order for {session_id} with {} errors", errors.len());
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            jar,
            Json(ValidationErrors { errors }),
        )
            .into_response();
    }

    let order = match record_order(&basket, &request.donor, today, &connection) {
        Ok(order) => order,
        Err(error) => {
            tracing::error!("could not record order for {session_id}: {error}");
            return error.into_response();
        }
    };

    if let Err(error) = clear_basket(session_id, &connection) {
        // The order is already recorded, so only log this.
        tracing::error!("could not clear basket for {session_id}: {error}");
    }

    tracing::info!(
        "Placed order {} with {} items for {}",
        order.order_id,
        order.items.len(),
        order.total_pence
    );

    (StatusCode::CREATED, jar, Json(order)).into_response()
}

fn record_order(
    basket: &Basket,
    donor: &DonorDetails,
    today: Date,
    connection: &Connection,
) -> Result<OrderResponse, Error> {
    if basket.is_empty() {
        return Err(Error::EmptyBasket);
    }

    let summary = basket.summary();
    let order_id = Uuid::new_v4().to_string();

    let (one_off_items, recurring_items): (Vec<&BasketItem>, Vec<&BasketItem>) = basket
        .items
        .iter()
        .partition(|item| !item.frequency.is_recurring());
    let one_off_shares = apportion(summary.one_off_fees, &amounts(&one_off_items));
    let recurring_shares = apportion(summary.recurring_fees, &amounts(&recurring_items));

    let transaction = connection.unchecked_transaction()?;
    let mut items = Vec::with_capacity(basket.items.len());

    for (item, fees_pence) in one_off_items
        .into_iter()
        .zip(one_off_shares)
        .chain(recurring_items.into_iter().zip(recurring_shares))
    {
        let appeal_title = match &item.product_name {
            Some(product_name) => format!("{} ({product_name})", item.appeal_title),
            None => item.appeal_title.clone(),
        };

        let donation = create_donation(
            NewDonation {
                order_id: Some(order_id.clone()),
                donor_name: donor.full_name(),
                donor_email: Some(donor.email.trim().to_owned()),
                appeal_title: appeal_title.clone(),
                amount_pence: item.amount_pence,
                fees_pence,
                frequency: item.frequency,
                donation_type: item.donation_type,
                payment_method: PaymentMethod::Card,
                status: DonationStatus::Pending,
                collected_via: Some(CollectedVia::Website),
                gift_aid: donor.gift_aid,
                date: today,
            },
            &transaction,
        )?;

        items.push(OrderItem {
            donation_id: donation.id,
            appeal_title,
            frequency: item.frequency,
            amount_pence: item.amount_pence,
            fees_pence,
        });
    }

    transaction.commit()?;

    Ok(OrderResponse {
        order_id,
        items,
        subtotal_pence: summary.subtotal(),
        fees_pence: summary.fees,
        total_pence: summary.total,
        one_off_total_pence: summary.one_off_total,
        recurring_total_pence: summary.recurring_total,
    })
}

fn amounts(items: &[&BasketItem]) -> Vec<Pence> {
    items.iter().map(|item| item.amount_pence).collect()
}

/// Split `fees` between `amounts` in proportion to each amount.
///
/// Shares are rounded and never more than what is left, and the last amount
/// takes the remainder so the shares always add up to `fees`.
fn apportion(fees: Pence, amounts: &[Pence]) -> Vec<Pence> {
    let subtotal: Pence = amounts.iter().fold(0, |sum, amount| sum.saturating_add(*amount));
    let mut remaining = fees;

    amounts
        .iter()
        .enumerate()
        .map(|(index, amount)| {
            let share = if index + 1 == amounts.len() {
                remaining
            } else if subtotal == 0 {
                0
            } else {
                scale_rounded(fees, *amount, subtotal).min(remaining)
            };
            remaining -= share;
            share
        })
        .collect()
}
