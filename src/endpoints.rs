//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/donations/{donation_id}/status', use [format_endpoint].

use std::fmt::Display;

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The landing page for charity staff.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The public checkout page with the donor's basket.
pub const CHECKOUT_VIEW: &str = "/checkout";
/// The page listing donations.
pub const DONATIONS_VIEW: &str = "/donations";
/// The page with the donation reports.
pub const REPORTS_VIEW: &str = "/reports";
/// The page listing masjids and their collections.
pub const MASJIDS_VIEW: &str = "/masjids";
/// The page listing water-project donations.
pub const WATER_PROJECTS_VIEW: &str = "/water-projects";
/// The page listing sponsorship donations.
pub const SPONSORSHIPS_VIEW: &str = "/sponsorships";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route to add an item to the checkout basket.
pub const CHECKOUT_ITEMS: &str = "/api/checkout/items";
/// The route to remove an item from the checkout basket.
pub const CHECKOUT_ITEM: &str = "/api/checkout/items/{item_id}";
/// The route to set whether the donor covers the processing fees.
pub const CHECKOUT_COVER_FEES: &str = "/api/checkout/cover-fees";
/// The route to choose the payment button from the browser's wallet support.
pub const CHECKOUT_WALLET: &str = "/api/checkout/wallet";
/// The route to place an order for the basket.
pub const ORDERS: &str = "/api/orders";
/// The route to record a donation taken offline.
pub const DONATIONS_API: &str = "/api/donations";
/// The route to change a donation's payment status.
pub const DONATION_STATUS: &str = "/api/donations/{donation_id}/status";
/// The route to download donations as CSV.
pub const DONATIONS_EXPORT: &str = "/api/donations/export";
/// The route to record a water-project donation.
pub const WATER_PROJECTS_API: &str = "/api/water-projects";
/// The route to move a water-project donation through its workflow.
pub const WATER_PROJECT_STATUS: &str = "/api/water-projects/{water_project_id}/status";
/// The route to record a sponsorship donation.
pub const SPONSORSHIPS_API: &str = "/api/sponsorships";
/// The route to move a sponsorship donation through its workflow.
pub const SPONSORSHIP_STATUS: &str = "/api/sponsorships/{sponsorship_id}/status";
/// The route to create a masjid.
pub const MASJIDS_API: &str = "/api/masjids";
/// The route to record a collection for a masjid.
pub const COLLECTIONS_API: &str = "/api/collections";
/// The route to get a report as JSON.
pub const REPORTS_API: &str = "/api/reports";
/// The route to download a report section as CSV.
pub const REPORTS_EXPORT: &str = "/api/reports/export";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/donations/{donation_id}/status',
/// '{donation_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: impl Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::DASHBOARD_VIEW);
        assert_endpoint_is_valid_uri(endpoints::CHECKOUT_VIEW);
        assert_endpoint_is_valid_uri(endpoints::DONATIONS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::REPORTS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::MASJIDS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::WATER_PROJECTS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::SPONSORSHIPS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::INTERNAL_ERROR_VIEW);
        assert_endpoint_is_valid_uri(endpoints::STATIC);

        assert_endpoint_is_valid_uri(endpoints::COFFEE);
        assert_endpoint_is_valid_uri(endpoints::CHECKOUT_ITEMS);
        assert_endpoint_is_valid_uri(endpoints::CHECKOUT_ITEM);
        assert_endpoint_is_valid_uri(endpoints::CHECKOUT_COVER_FEES);
        assert_endpoint_is_valid_uri(endpoints::CHECKOUT_WALLET);
        assert_endpoint_is_valid_uri(endpoints::ORDERS);
        assert_endpoint_is_valid_uri(endpoints::DONATIONS_API);
        assert_endpoint_is_valid_uri(endpoints::DONATION_STATUS);
        assert_endpoint_is_valid_uri(endpoints::DONATIONS_EXPORT);
        assert_endpoint_is_valid_uri(endpoints::WATER_PROJECTS_API);
        assert_endpoint_is_valid_uri(endpoints::WATER_PROJECT_STATUS);
        assert_endpoint_is_valid_uri(endpoints::SPONSORSHIPS_API);
        assert_endpoint_is_valid_uri(endpoints::SPONSORSHIP_STATUS);
        assert_endpoint_is_valid_uri(endpoints::MASJIDS_API);
        assert_endpoint_is_valid_uri(endpoints::COLLECTIONS_API);
        assert_endpoint_is_valid_uri(endpoints::REPORTS_API);
        assert_endpoint_is_valid_uri(endpoints::REPORTS_EXPORT);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint(endpoints::DONATION_STATUS, 42);

        assert_eq!(formatted_path, "/api/donations/42/status");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn accepts_string_ids() {
        let formatted_path = format_endpoint(endpoints::CHECKOUT_ITEM, "abc-123");

        assert_eq!(formatted_path, "/api/checkout/items/abc-123");
    }
}
