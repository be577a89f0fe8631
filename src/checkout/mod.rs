//! The public checkout: the basket page, its endpoints and placing an order.

mod basket_endpoints;
mod basket_view;
mod checkout_page;
mod order_endpoint;
mod payment;
mod validation;
mod wallet_endpoint;

pub use basket_endpoints::{add_basket_item_endpoint, cover_fees_endpoint, remove_basket_item_endpoint};
pub use checkout_page::get_checkout_page;
pub use order_endpoint::place_order_endpoint;
pub use wallet_endpoint::wallet_button_endpoint;
