//! HTTP routes definition

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Parking lot routes
///
/// - POST  /parking_lot                   - Create (reset) the lot
/// - PATCH /parking_lot                   - Add slots
/// - POST  /park                          - Park one car
/// - POST  /park/multiple                 - Park several cars
/// - POST  /clear                         - Free a slot
/// - GET   /status                        - Occupied slots
/// - GET   /registration_numbers/:color   - Registrations by colour
/// - GET   /slot_number/:reg_no           - Slot by registration
/// - GET   /slot_numbers/:color           - Slots by colour
/// - GET   /summary                       - Occupancy counts
pub fn parking_routes() -> Router {
    Router::new()
        .route(
            "/parking_lot",
            post(handlers::initialize).patch(handlers::expand),
        )
        .route("/park", post(handlers::park))
        .route("/park/multiple", post(handlers::park_multiple))
        .route("/clear", post(handlers::clear))
        .route("/status", get(handlers::status))
        .route(
            "/registration_numbers/:color",
            get(handlers::registration_numbers_by_color),
        )
        .route(
            "/slot_number/:reg_no",
            get(handlers::slot_number_by_registration),
        )
        .route("/slot_numbers/:color", get(handlers::slot_numbers_by_color))
        .route("/summary", get(handlers::summary))
}

/// Health check and metrics routes
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
}
