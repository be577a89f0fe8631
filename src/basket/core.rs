//! The donor's basket: what they have chosen to give and how often.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Error,
    basket::fees::{FeeSplit, split_fees},
    db::sql_text_enum,
    donation::DonationType,
    money::{MAX_AMOUNT_PENCE, Pence},
};

/// How often a basket item is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    OneOff,
    Monthly,
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 3] = [Frequency::OneOff, Frequency::Monthly, Frequency::Yearly];

    /// Whether the item is set up as a subscription rather than a single charge.
    pub fn is_recurring(self) -> bool {
        !matches!(self, Frequency::OneOff)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::OneOff => "ONE_OFF",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Frequency::OneOff => "One-off",
            Frequency::Monthly => "Monthly",
            Frequency::Yearly => "Yearly",
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ONE_OFF" => Ok(Frequency::OneOff),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            other => Err(Error::InvalidVariant(other.to_owned())),
        }
    }
}

sql_text_enum!(Frequency);

/// A donation the donor has added to their basket.
///
/// Items are never edited once added, only removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketItem {
    pub id: Uuid,
    /// The appeal the donation goes towards, e.g. "Ramadan Appeal".
    pub appeal_title: String,
    /// The specific product within the appeal, e.g. "Water Well".
    pub product_name: Option<String>,
    pub donation_type: DonationType,
    pub amount_pence: Pence,
    pub frequency: Frequency,
}

/// The fields needed to add an item to a [Basket].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBasketItem {
    pub appeal_title: String,
    pub product_name: Option<String>,
    pub donation_type: DonationType,
    pub amount_pence: Pence,
    pub frequency: Frequency,
}

/// The checkout basket.
///
/// The basket is plain data so that it can be serialized into the checkout
/// session between requests, see [load_basket](crate::basket::load_basket).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Basket {
    pub items: Vec<BasketItem>,
    /// Whether the donor has chosen to pay the processing fees.
    #[serde(default)]
    pub cover_fees: bool,
}

impl Basket {
    /// Add an item to the basket and return it.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if the amount is negative or more than
    /// [MAX_AMOUNT_PENCE].
    pub fn add_item(&mut self, item: NewBasketItem) -> Result<&BasketItem, Error> {
        if !(0..=MAX_AMOUNT_PENCE).contains(&item.amount_pence) {
            return Err(Error::InvalidAmount(item.amount_pence.to_string()));
        }

        let product_name = item
            .product_name
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty());

        self.items.push(BasketItem {
            id: Uuid::new_v4(),
            appeal_title: item.appeal_title.trim().to_owned(),
            product_name,
            donation_type: item.donation_type,
            amount_pence: item.amount_pence,
            frequency: item.frequency,
        });

        Ok(&self.items[self.items.len() - 1])
    }

    /// Remove the item with `id`, returning whether an item was removed.
    pub fn remove_item(&mut self, id: Uuid) -> bool {
        let count_before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != count_before
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn one_off_subtotal(&self) -> Pence {
        self.items
            .iter()
            .filter(|item| !item.frequency.is_recurring())
            .fold(0, |sum: Pence, item| sum.saturating_add(item.amount_pence))
    }

    pub fn recurring_subtotal(&self) -> Pence {
        self.items
            .iter()
            .filter(|item| item.frequency.is_recurring())
            .fold(0, |sum: Pence, item| sum.saturating_add(item.amount_pence))
    }

    /// The fee summary shown to the donor before they pay.
    ///
    /// An empty basket has nothing to pay, so it summarises to all zeros even
    /// when the donor has opted to cover fees.
    pub fn summary(&self) -> FeeSplit {
        if self.is_empty() {
            return FeeSplit::default();
        }

        split_fees(
            self.one_off_subtotal(),
            self.recurring_subtotal(),
            self.cover_fees,
        )
    }
}
