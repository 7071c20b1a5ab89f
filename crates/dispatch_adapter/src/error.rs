//! Maps `DispatchError` (and a couple of adapter-only conditions) onto HTTP
//! status codes, keeping the §6 status-code table centralized here instead
//! of scattered across handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dispatch_core::error::DispatchError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Core(#[from] DispatchError),

    #[error("system is not initialized")]
    NotInitialized,

    #[error("system is already initialized")]
    AlreadyInitialized,

    #[error("solver task panicked: {0}")]
    SolverTaskFailed(String),
}

impl From<DispatchError> for StatusCode {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::SystemAlreadyInitialized => StatusCode::CONFLICT,
            DispatchError::DuplicateVehicleId(_) => StatusCode::CONFLICT,
            DispatchError::SystemNotInitialized => StatusCode::BAD_REQUEST,
            DispatchError::NoVehiclesRegistered => StatusCode::BAD_REQUEST,
            DispatchError::InvalidAlgorithmConfig(_) => StatusCode::BAD_REQUEST,
            DispatchError::UnknownVehicle(_) => StatusCode::BAD_REQUEST,
            DispatchError::UnknownDelivery(_) => StatusCode::BAD_REQUEST,
            DispatchError::CapacityExceeded { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AdapterError {
    fn into_response(self) -> Response {
        let status = match &self {
            AdapterError::Core(err) => StatusCode::from(clone_for_status(err)),
            AdapterError::NotInitialized => StatusCode::BAD_REQUEST,
            AdapterError::AlreadyInitialized => StatusCode::CONFLICT,
            AdapterError::SolverTaskFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// `DispatchError` is not `Clone`; re-derive just enough of it to classify
/// the status code without consuming the original error used in the message.
fn clone_for_status(err: &DispatchError) -> DispatchError {
    match err {
        DispatchError::UnknownVehicle(id) => DispatchError::UnknownVehicle(*id),
        DispatchError::UnknownDelivery(id) => DispatchError::UnknownDelivery(id.clone()),
        DispatchError::DuplicateVehicleId(id) => DispatchError::DuplicateVehicleId(*id),
        DispatchError::SystemAlreadyInitialized => DispatchError::SystemAlreadyInitialized,
        DispatchError::SystemNotInitialized => DispatchError::SystemNotInitialized,
        DispatchError::NoVehiclesRegistered => DispatchError::NoVehiclesRegistered,
        DispatchError::InvalidAlgorithmConfig(msg) => DispatchError::InvalidAlgorithmConfig(msg.clone()),
        DispatchError::CapacityExceeded { vehicle_id, requested, capacity } => {
            DispatchError::CapacityExceeded {
                vehicle_id: *vehicle_id,
                requested: *requested,
                capacity: *capacity,
            }
        }
    }
}
