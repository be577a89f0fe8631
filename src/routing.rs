//! Application router configuration for the public checkout and the admin pages.

use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    checkout::{
        add_basket_item_endpoint, cover_fees_endpoint, get_checkout_page, place_order_endpoint,
        remove_basket_item_endpoint, wallet_button_endpoint,
    },
    dashboard::get_dashboard_page,
    donation::{
        create_donation_endpoint, export_donations_endpoint, get_donations_page,
        update_donation_status_endpoint,
    },
    endpoints,
    internal_server_error::get_internal_server_error_page,
    masjid::{create_masjid_endpoint, get_masjids_page, record_collection_endpoint},
    not_found::get_404_not_found,
    report::{export_report_endpoint, get_report_json, get_reports_page},
    sponsorship::{
        create_sponsorship_endpoint, get_sponsorships_page, update_sponsorship_status_endpoint,
    },
    water_project::{
        create_water_project_endpoint, get_water_projects_page,
        update_water_project_status_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::CHECKOUT_VIEW, get(get_checkout_page))
        .route(endpoints::DONATIONS_VIEW, get(get_donations_page))
        .route(endpoints::REPORTS_VIEW, get(get_reports_page))
        .route(endpoints::MASJIDS_VIEW, get(get_masjids_page))
        .route(endpoints::WATER_PROJECTS_VIEW, get(get_water_projects_page))
        .route(endpoints::SPONSORSHIPS_VIEW, get(get_sponsorships_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let checkout_routes = Router::new()
        .route(endpoints::CHECKOUT_ITEMS, post(add_basket_item_endpoint))
        .route(endpoints::CHECKOUT_ITEM, delete(remove_basket_item_endpoint))
        .route(endpoints::CHECKOUT_COVER_FEES, post(cover_fees_endpoint))
        .route(endpoints::CHECKOUT_WALLET, post(wallet_button_endpoint))
        .route(endpoints::ORDERS, post(place_order_endpoint));

    let admin_routes = Router::new()
        .route(endpoints::DONATIONS_API, post(create_donation_endpoint))
        .route(
            endpoints::DONATION_STATUS,
            put(update_donation_status_endpoint),
        )
        .route(endpoints::DONATIONS_EXPORT, get(export_donations_endpoint))
        .route(
            endpoints::WATER_PROJECTS_API,
            post(create_water_project_endpoint),
        )
        .route(
            endpoints::WATER_PROJECT_STATUS,
            put(update_water_project_status_endpoint),
        )
        .route(endpoints::SPONSORSHIPS_API, post(create_sponsorship_endpoint))
        .route(
            endpoints::SPONSORSHIP_STATUS,
            put(update_sponsorship_status_endpoint),
        )
        .route(endpoints::MASJIDS_API, post(create_masjid_endpoint))
        .route(endpoints::COLLECTIONS_API, post(record_collection_endpoint))
        .route(endpoints::REPORTS_API, get(get_report_json))
        .route(endpoints::REPORTS_EXPORT, get(export_report_endpoint));

    page_routes
        .merge(checkout_routes)
        .merge(admin_routes)
        .route(endpoints::COFFEE, get(get_coffee))
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, Html("I'm a teapot")).into_response()
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}


#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{AppState, build_router, endpoints, pagination::PaginationConfig};

    fn get_test_server() -> TestServer {
        let state = AppState::new(
            Connection::open_in_memory().expect("Could not open database in memory."),
            "Europe/London",
            PaginationConfig::default(),
        )
        .expect("Could not create app state.");

        TestServer::new(build_router(state))
    }

    #[tokio::test]
    async fn coffee_is_a_teapot() {
        let server = get_test_server();

        server
            .get(endpoints::COFFEE)
            .await
            .assert_status(StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        server
            .get("/definitely/not/a/page")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn admin_pages_render() {
        let server = get_test_server();

        for page in [
            endpoints::DASHBOARD_VIEW,
            endpoints::CHECKOUT_VIEW,
            endpoints::DONATIONS_VIEW,
            endpoints::REPORTS_VIEW,
            endpoints::MASJIDS_VIEW,
            endpoints::WATER_PROJECTS_VIEW,
            endpoints::SPONSORSHIPS_VIEW,
        ] {
            let response = server.get(page).await;
            assert_eq!(response.status_code(), StatusCode::OK, "GET {page}");
        }
    }

    #[tokio::test]
    async fn order_with_empty_basket_is_rejected() {
        let server = get_test_server();

        let response = server
            .post(endpoints::ORDERS)
            .json(&json!({
                "donor": {
                    "first_name": "Aisha",
                    "last_name": "Khan",
                    "email": "aisha@example.com"
                },
                "cover_fees": true
            }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|error| error["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["basket"]);
    }

    #[tokio::test]
    async fn report_json_is_served_for_range() {
        let server = get_test_server();

        let response = server
            .get(&format!(
                "{}?from=2025-03-01&to=2025-03-31",
                endpoints::REPORTS_API
            ))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["from"], "2025-03-01");
        assert_eq!(body["to"], "2025-03-31");
        assert_eq!(body["totals"]["total_pence"], 0);
    }

    #[tokio::test]
    async fn report_with_reversed_range_is_bad_request() {
        let server = get_test_server();

        server
            .get(&format!(
                "{}?from=2025-03-31&to=2025-03-01",
                endpoints::REPORTS_API
            ))
            .await
            .assert_status_bad_request();
    }
}
