use std::sync::Arc;

use axum::routing::{get, patch};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{bookings, catalog, hair_styles, health, invoices, reports, users};
use crate::state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route(
            "/api/bookings/:id",
            get(bookings::get_booking)
                .patch(bookings::update_booking)
                .delete(bookings::delete_booking),
        )
        .route(
            "/api/bookings/:id/status",
            patch(bookings::update_booking_status),
        )
        .route(
            "/api/invoices",
            get(invoices::list_invoices).post(invoices::create_invoice),
        )
        .route(
            "/api/invoices/:id",
            get(invoices::get_invoice).delete(invoices::delete_invoice),
        )
        .route(
            "/api/invoices/:id/status",
            patch(invoices::update_invoice_status),
        )
        .route(
            "/api/invoices/:id/receipt",
            get(invoices::download_receipt),
        )
        .route(
            "/api/services",
            get(catalog::list_services).post(catalog::create_service),
        )
        .route(
            "/api/services/:id",
            get(catalog::get_service)
                .put(catalog::update_service)
                .delete(catalog::delete_service),
        )
        .route(
            "/api/hair-styles",
            get(hair_styles::list_hair_styles).post(hair_styles::create_hair_style),
        )
        .route(
            "/api/hair-styles/:id",
            get(hair_styles::get_hair_style)
                .put(hair_styles::update_hair_style)
                .delete(hair_styles::delete_hair_style),
        )
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route(
            "/api/users/:id",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/api/reports/monthly-revenue",
            get(reports::monthly_revenue),
        )
        .route(
            "/api/reports/service-revenue",
            get(reports::service_revenue),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
