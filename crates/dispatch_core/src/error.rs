//! Core error taxonomy. Nothing in the core panics on caller-reachable input;
//! invariant violations that reach here are logged and skipped, not escalated.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown vehicle: {0}")]
    UnknownVehicle(u64),

    #[error("unknown delivery: {0}")]
    UnknownDelivery(String),

    #[error("vehicle id already registered: {0}")]
    DuplicateVehicleId(u64),

    #[error("system has already been initialized")]
    SystemAlreadyInitialized,

    #[error("system has not been initialized")]
    SystemNotInitialized,

    #[error("cannot start system without any registered vehicles")]
    NoVehiclesRegistered,

    #[error("invalid algorithm configuration: {0}")]
    InvalidAlgorithmConfig(String),

    #[error("vehicle {vehicle_id} capacity {capacity} exceeded by requested {requested}")]
    CapacityExceeded {
        vehicle_id: u64,
        requested: u32,
        capacity: u32,
    },
}
