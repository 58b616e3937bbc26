//! HTTP route handlers
//!
//! Request and response field names follow the public parking API
//! (`no_of_slot`, `car_reg_no`, `allocated_slot_number`, ...).

use axum::{
    extract::{rejection::JsonRejection, Extension, Json, Path},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

use super::error::ApiError;
use crate::pool::{BatchPlacement, ClearSelector, OccupiedSlot, SlotNumber, Summary, Vehicle};
use crate::server::AppState;

// ===== Request/Response Types =====

#[derive(Debug, Deserialize)]
pub struct InitializeRequest {
    pub no_of_slot: i64,
}

#[derive(Debug, Deserialize)]
pub struct ExpandRequest {
    pub increment_slot: i64,
}

#[derive(Debug, Serialize)]
pub struct PoolSizeResponse {
    pub total_slot: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParkRequest {
    pub car_reg_no: String,
    pub car_color: String,
}

impl From<ParkRequest> for Vehicle {
    fn from(request: ParkRequest) -> Self {
        Vehicle::new(request.car_reg_no, request.car_color)
    }
}

#[derive(Debug, Serialize)]
pub struct ParkResponse {
    pub allocated_slot_number: SlotNumber,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClearRequest {
    #[serde(default)]
    pub slot_number: Option<SlotNumber>,
    #[serde(default)]
    pub car_registration_no: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub freed_slot_number: SlotNumber,
}

#[derive(Debug, Serialize)]
pub struct StatusEntry {
    pub slot_no: SlotNumber,
    pub registration_no: String,
    pub color: String,
}

impl From<OccupiedSlot> for StatusEntry {
    fn from(entry: OccupiedSlot) -> Self {
        Self {
            slot_no: entry.slot,
            registration_no: entry.registration_number,
            color: entry.color,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SlotNumberResponse {
    pub slot_number: SlotNumber,
}

#[derive(Debug, Serialize)]
pub struct BatchParkEntry {
    #[serde(rename = "registrationNumber")]
    pub registration_number: String,
    pub allocated_slot_number: i64,
}

impl From<BatchPlacement> for BatchParkEntry {
    fn from(placement: BatchPlacement) -> Self {
        Self {
            registration_number: placement.registration_number,
            allocated_slot_number: placement.allocated_slot,
        }
    }
}

/// Unwrap a JSON body, turning a rejection into a 400
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(value)| value).map_err(ApiError::from)
}

// ===== Pool Handlers =====

/// Create (or reset) the parking lot
///
/// POST /parking_lot
#[instrument(skip(state, payload))]
pub async fn initialize(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<InitializeRequest>, JsonRejection>,
) -> Result<Json<PoolSizeResponse>, ApiError> {
    let request = body(payload)?;
    info!(no_of_slot = request.no_of_slot, "Initializing parking lot");

    let size = state.run("initialize", |lot| lot.initialize(request.no_of_slot))?;
    Ok(Json(PoolSizeResponse {
        total_slot: size.total_slots,
    }))
}

/// Add slots to the parking lot
///
/// PATCH /parking_lot
#[instrument(skip(state, payload))]
pub async fn expand(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<ExpandRequest>, JsonRejection>,
) -> Result<Json<PoolSizeResponse>, ApiError> {
    let request = body(payload)?;
    info!(increment_slot = request.increment_slot, "Expanding parking lot");

    let size = state.run("expand", |lot| lot.expand(request.increment_slot))?;
    Ok(Json(PoolSizeResponse {
        total_slot: size.total_slots,
    }))
}

/// Park one car
///
/// POST /park
#[instrument(skip(state, payload))]
pub async fn park(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<ParkRequest>, JsonRejection>,
) -> Result<Json<ParkResponse>, ApiError> {
    let vehicle = Vehicle::from(body(payload)?);
    info!(registration = %vehicle.registration_number, "Parking car");

    let allocation = state.run("park", |lot| lot.park(vehicle))?;
    Ok(Json(ParkResponse {
        allocated_slot_number: allocation.slot,
    }))
}

/// Free a slot by slot number or registration number
///
/// POST /clear
#[instrument(skip(state, payload))]
pub async fn clear(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<ClearRequest>, JsonRejection>,
) -> Result<Json<ClearResponse>, ApiError> {
    let request = body(payload)?;
    info!(
        slot_number = ?request.slot_number,
        registration = ?request.car_registration_no,
        "Clearing slot"
    );

    let release = state.run("clear", |lot| {
        lot.ensure_initialized()?;
        let selector =
            ClearSelector::from_parts(request.slot_number, request.car_registration_no)?;
        lot.clear(selector)
    })?;
    Ok(Json(ClearResponse {
        freed_slot_number: release.slot,
    }))
}

/// Park several cars, one result per car
///
/// POST /park/multiple
#[instrument(skip(state, payload))]
pub async fn park_multiple(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<Vec<ParkRequest>>, JsonRejection>,
) -> Result<Json<Vec<BatchParkEntry>>, ApiError> {
    let vehicles: Vec<Vehicle> = body(payload)?.into_iter().map(Vehicle::from).collect();
    info!(count = vehicles.len(), "Parking multiple cars");

    let placements = state.run("park_multiple", |lot| lot.park_many(vehicles))?;
    Ok(Json(placements.into_iter().map(BatchParkEntry::from).collect()))
}

// ===== Query Handlers =====

/// Occupied slots, ascending
///
/// GET /status
#[instrument(skip(state))]
pub async fn status(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<StatusEntry>>, ApiError> {
    let slots = state.run("status", |lot| lot.occupied_slots())?;
    Ok(Json(slots.into_iter().map(StatusEntry::from).collect()))
}

/// GET /registration_numbers/:color
#[instrument(skip(state))]
pub async fn registration_numbers_by_color(
    Extension(state): Extension<Arc<AppState>>,
    Path(color): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let registrations = state.run("registration_numbers", |lot| {
        lot.registrations_by_color(&color)
    })?;
    Ok(Json(registrations))
}

/// GET /slot_number/:reg_no
#[instrument(skip(state))]
pub async fn slot_number_by_registration(
    Extension(state): Extension<Arc<AppState>>,
    Path(reg_no): Path<String>,
) -> Result<Json<SlotNumberResponse>, ApiError> {
    let slot_number = state.run("slot_number", |lot| lot.slot_by_registration(&reg_no))?;
    Ok(Json(SlotNumberResponse { slot_number }))
}

/// GET /slot_numbers/:color
#[instrument(skip(state))]
pub async fn slot_numbers_by_color(
    Extension(state): Extension<Arc<AppState>>,
    Path(color): Path<String>,
) -> Result<Json<Vec<SlotNumber>>, ApiError> {
    let slots = state.run("slot_numbers", |lot| lot.slots_by_color(&color))?;
    Ok(Json(slots))
}

/// GET /summary
#[instrument(skip(state))]
pub async fn summary(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Summary>, ApiError> {
    let summary = state.run("summary", |lot| lot.summary())?;
    Ok(Json(summary))
}

// ===== Service Handlers =====

/// Health check
pub async fn health_check(Extension(state): Extension<Arc<AppState>>) -> Response {
    let (total_slots, _) = state.lot.occupancy();
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "initialized": total_slots > 0,
    }))
    .into_response()
}

/// Metrics endpoint (Prometheus format)
pub async fn metrics() -> String {
    crate::metrics::export_metrics()
}
