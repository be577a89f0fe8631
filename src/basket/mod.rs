//! The checkout basket, its fee calculation and its persistence.

mod core;
mod fees;
mod session;

pub use core::{Basket, BasketItem, Frequency, NewBasketItem};
pub use fees::{FeeSplit, split_fees};
pub(crate) use fees::scale_rounded;
pub use session::{
    clear_basket, create_checkout_session_table, get_or_start_session, load_basket, save_basket,
};
#[cfg(test)]
pub use session::{SESSION_COOKIE, SessionId};
