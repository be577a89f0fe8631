//! Picks the express payment button for the donor's browser.

use axum::{
    Form,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::html;
use serde::Deserialize;

use crate::{alert::Alert, html::BUTTON_PRIMARY_STYLE};

use super::payment::{PreferredWallet, WalletAvailability};

#[derive(Debug, Deserialize)]
pub struct WalletForm {
    /// The provider's `canMakePayment` result as JSON, `null` when no wallet is available.
    pub capabilities: String,
}

pub async fn wallet_button_endpoint(Form(form): Form<WalletForm>) -> Response {
    let availability = match WalletAvailability::from_json(&form.capabilities) {
        Ok(availability) => availability,
        Err(error) => {
            tracing::warn!("could not parse wallet capabilities: {error}");
            return Alert::Error {
                message: "Could not check payment options".to_owned(),
                details: "Pay by card instead.".to_owned(),
            }
            .into_response_with_status(StatusCode::BAD_REQUEST);
        }
    };

    let wallet = availability.preferred_wallet();
    let label = match wallet {
        PreferredWallet::ApplePay => "Pay with Apple Pay",
        PreferredWallet::GooglePay => "Pay with Google Pay",
        PreferredWallet::Link => "Pay with Link",
        PreferredWallet::CardOnly => "Pay by card",
    };

    html!(
        button type="submit" form="donor-form" data-wallet=(wallet.as_str()) class=(BUTTON_PRIMARY_STYLE)
        {
            (label)
        }
    )
    .into_response()
}

#[cfg(test)]
mod tests {
    use axum::{Form, http::StatusCode};
    use scraper::Selector;

    use crate::test_utils::parse_html_fragment;

    use super::{WalletForm, wallet_button_endpoint};

    async fn wallet_for(capabilities: &str) -> Option<String> {
        let response = wallet_button_endpoint(Form(WalletForm {
            capabilities: capabilities.to_owned(),
        }))
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_fragment(response).await;
        html.select(&Selector::parse("button").unwrap())
            .next()
            .and_then(|button| button.value().attr("data-wallet").map(str::to_owned))
    }

    #[tokio::test]
    async fn picks_preferred_wallet() {
        assert_eq!(wallet_for(r#"{"googlePay": true}"#).await.as_deref(), Some("GOOGLE_PAY"));
        assert_eq!(wallet_for("null").await.as_deref(), Some("CARD_ONLY"));
    }

    #[tokio::test]
    async fn malformed_capabilities_are_bad_request() {
        let response = wallet_button_endpoint(Form(WalletForm {
            capabilities: "not json".to_owned(),
        }))
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
