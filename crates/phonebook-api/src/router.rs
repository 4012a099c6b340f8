//! Axum router construction.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::{contacts, health};
use crate::middleware::request_id;
use crate::state::SharedState;

/// Build the complete router with every API route
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        // Health / metrics
        .route("/api/health", get(health::health_handler))
        .route("/api/metrics", get(health::metrics_handler))
        // Contacts API
        .route(
            "/api/contacts",
            get(contacts::list_contacts_handler).post(contacts::create_contact_handler),
        )
        .route(
            "/api/contacts/batch",
            delete(contacts::delete_contacts_batch_handler),
        )
        .route(
            "/api/contacts/search",
            get(contacts::search_contacts_handler),
        )
        .route(
            "/api/contacts/statistics",
            get(contacts::statistics_handler),
        )
        .route("/api/contacts/recent", get(contacts::recent_contacts_handler))
        .route(
            "/api/contacts/check-phone",
            get(contacts::check_phone_handler),
        )
        .route(
            "/api/contacts/check-email",
            get(contacts::check_email_handler),
        )
        .route(
            "/api/contacts/category/:category",
            get(contacts::list_by_category_handler),
        )
        .route(
            "/api/contacts/phone/:phone_number",
            get(contacts::get_by_phone_handler),
        )
        .route(
            "/api/contacts/:id",
            get(contacts::get_contact_handler)
                .put(contacts::update_contact_handler)
                .delete(contacts::delete_contact_handler),
        )
        .layer(axum::middleware::from_fn(request_id))
        .with_state(state)
}
