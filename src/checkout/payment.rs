//! Which express wallets the donor's browser can pay with.
//!
//! The card provider's browser library reports the available wallets as a
//! JSON object, or `null` when none are available. The checkout page posts
//! that result back so the server can decide which payment button to show.

use serde::Deserialize;

/// The wallet flags reported by the provider. Missing flags are false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCapabilities {
    #[serde(default)]
    pub apple_pay: bool,
    #[serde(default)]
    pub google_pay: bool,
    #[serde(default)]
    pub link: bool,
}

/// Whether the provider could offer any wallet at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletAvailability {
    Unavailable,
    Available(PaymentCapabilities),
}

impl From<Option<PaymentCapabilities>> for WalletAvailability {
    fn from(capabilities: Option<PaymentCapabilities>) -> Self {
        match capabilities {
            Some(capabilities) => WalletAvailability::Available(capabilities),
            None => WalletAvailability::Unavailable,
        }
    }
}

/// The payment button to lead with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredWallet {
    ApplePay,
    GooglePay,
    Link,
    CardOnly,
}

impl PreferredWallet {
    pub fn as_str(self) -> &'static str {
        match self {
            PreferredWallet::ApplePay => "APPLE_PAY",
            PreferredWallet::GooglePay => "GOOGLE_PAY",
            PreferredWallet::Link => "LINK",
            PreferredWallet::CardOnly => "CARD_ONLY",
        }
    }
}

impl WalletAvailability {
    /// Parse the provider's result, where `null` means no wallets.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Option<PaymentCapabilities>>(json).map(Self::from)
    }

    /// Apple Pay is preferred over Google Pay, which is preferred over Link.
    pub fn preferred_wallet(self) -> PreferredWallet {
        match self {
            WalletAvailability::Available(PaymentCapabilities {
                apple_pay: true, ..
            }) => PreferredWallet::ApplePay,
            WalletAvailability::Available(PaymentCapabilities {
                google_pay: true,
                ..
            }) => PreferredWallet::GooglePay,
            WalletAvailability::Available(PaymentCapabilities { link: true, .. }) => {
                PreferredWallet::Link
            }
            _ => PreferredWallet::CardOnly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PaymentCapabilities, PreferredWallet, WalletAvailability};

    #[test]
    fn null_means_unavailable() {
        let got = WalletAvailability::from_json("null").unwrap();

        assert_eq!(got, WalletAvailability::Unavailable);
        assert_eq!(got.preferred_wallet(), PreferredWallet::CardOnly);
    }

    #[test]
    fn missing_flags_are_false() {
        let got = WalletAvailability::from_json(r#"{"googlePay": true}"#).unwrap();

        assert_eq!(
            got,
            WalletAvailability::Available(PaymentCapabilities {
                apple_pay: false,
                google_pay: true,
                link: false,
            })
        );
    }

    #[test]
    fn prefers_apple_then_google_then_link() {
        let cases = [
            (r#"{"applePay": true, "googlePay": true, "link": true}"#, PreferredWallet::ApplePay),
            (r#"{"googlePay": true, "link": true}"#, PreferredWallet::GooglePay),
            (r#"{"link": true}"#, PreferredWallet::Link),
            (r#"{}"#, PreferredWallet::CardOnly),
        ];

        for (json, want) in cases {
            let got = WalletAvailability::from_json(json).unwrap().preferred_wallet();
            assert_eq!(got, want, "for {json}");
        }
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(WalletAvailability::from_json(r#"{"applePay": "yes"}"#).is_err());
    }
}
