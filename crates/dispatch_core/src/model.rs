//! Entity Component System: components and state enums for deliveries and vehicles.
//!
//! - **Components**: `Delivery`, `Vehicle`
//! - **State Enums**: `DeliveryStatus`, `VehicleStatus`
//!
//! Components are attached to entities in the ECS world and mutated by systems
//! gated on scheduled events (see `clock` and `systems`).

use bevy_ecs::prelude::{Component, Resource};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A point on the map in decimal degrees. Immutable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub lng: f64,
    pub lat: f64,
}

impl Point {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Pending,
    Ready,
    Dispatched,
    Delivered,
    Cancelled,
}

/// A delivery request. `ready_at` and `deadline` are derived once at
/// construction from `preparation`/`time` and never recomputed.
#[derive(Debug, Clone, Component)]
pub struct Delivery {
    pub id: String,
    pub point: Point,
    pub size: u32,
    pub preparation_minutes: i64,
    pub time_minutes: i64,
    pub created_at: DateTime<Utc>,
    pub ready_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,

    pub status: DeliveryStatus,
    pub assigned_vehicle_id: Option<u64>,
    /// Monotone latch: once true, never reset. Mirrors `Monitor::late`.
    pub marked_late: bool,
}

impl Delivery {
    pub fn new(
        id: impl Into<String>,
        point: Point,
        size: u32,
        preparation_minutes: i64,
        time_minutes: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        let ready_at = created_at + chrono::Duration::minutes(preparation_minutes);
        let deadline = ready_at + chrono::Duration::minutes(time_minutes);
        debug_assert!(ready_at < deadline, "ready_at must precede deadline");
        Self {
            id: id.into(),
            point,
            size,
            preparation_minutes,
            time_minutes,
            created_at,
            ready_at,
            deadline,
            status: DeliveryStatus::Pending,
            assigned_vehicle_id: None,
            marked_late: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleStatus {
    Idle,
    OnRoute,
}

/// A capacity-constrained vehicle based at the depot.
#[derive(Debug, Clone, Component)]
pub struct Vehicle {
    pub id: u64,
    pub capacity: u32,
    pub status: VehicleStatus,
    /// Ordered delivery ids on the committed route. Empty iff `Idle`.
    pub current_route: Vec<String>,
    /// Set iff `OnRoute`.
    pub route_end_time: Option<DateTime<Utc>>,
}

impl Vehicle {
    pub fn new(id: u64, capacity: u32) -> Self {
        Self {
            id,
            capacity,
            status: VehicleStatus::Idle,
            current_route: Vec::new(),
            route_end_time: None,
        }
    }
}

/// Index from delivery id to its world entity, maintained alongside the
/// delivery table so event handlers can resolve `EventSubject::Delivery`
/// without scanning every entity.
#[derive(Debug, Default, Resource)]
pub struct DeliveryIndex(pub HashMap<String, bevy_ecs::prelude::Entity>);

/// Index from vehicle id to its world entity.
#[derive(Debug, Default, Resource)]
pub struct VehicleIndex(pub HashMap<u64, bevy_ecs::prelude::Entity>);

/// The depot: single origin/return point for every vehicle.
#[derive(Debug, Clone, Copy, Resource)]
pub struct DepotOrigin(pub Point);
