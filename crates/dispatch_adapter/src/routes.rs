//! HTTP handlers for the §6 surface. Each handler acquires exactly one of
//! the two [`AdapterState`] locks, never both at once.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use dispatch_core::config::{ClusteringAlgorithm, HybridAlgorithm, RoutingAlgorithm, SimulationConfig, SolverChoice};
use dispatch_core::error::DispatchError;
use dispatch_core::model::{Delivery, DeliveryStatus, Point, Vehicle, VehicleStatus};
use dispatch_core::runner::run_next_event_with_hook;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AdapterError;
use crate::state::{AdapterState, SystemHandle};
use crate::ws::{broadcast_event, Envelope};

#[derive(Debug, Deserialize)]
pub struct RegisterDriverRequest {
    pub id: u64,
    pub capacity: u32,
}

#[derive(Debug, Serialize)]
pub struct DriverView {
    pub id: u64,
    pub capacity: u32,
    pub status: &'static str,
}

pub async fn root() -> &'static str {
    "ok"
}

pub async fn register_driver(
    State(state): State<Arc<AdapterState>>,
    Json(req): Json<RegisterDriverRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AdapterError> {
    let mut init = state.init.lock().await;
    if init.initialized {
        return Err(AdapterError::Core(DispatchError::SystemAlreadyInitialized));
    }
    if init.pending_drivers.contains_key(&req.id) {
        return Err(AdapterError::Core(DispatchError::DuplicateVehicleId(req.id)));
    }
    init.pending_drivers.insert(req.id, Vehicle::new(req.id, req.capacity));
    Ok((StatusCode::CREATED, Json(json!({ "id": req.id, "capacity": req.capacity }))))
}

pub async fn list_drivers(
    State(state): State<Arc<AdapterState>>,
) -> Result<Json<Vec<DriverView>>, AdapterError> {
    let mut routing = state.routing.lock().await;
    if let Some(handle) = routing.as_mut() {
        let mut query = handle.world.query::<&Vehicle>();
        let out: Vec<DriverView> = query
            .iter(&handle.world)
            .map(|vehicle| DriverView {
                id: vehicle.id,
                capacity: vehicle.capacity,
                status: match vehicle.status {
                    VehicleStatus::Idle => "idle",
                    VehicleStatus::OnRoute => "on_route",
                },
            })
            .collect();
        return Ok(Json(out));
    }
    drop(routing);

    let init = state.init.lock().await;
    let out = init
        .pending_drivers
        .values()
        .map(|v| DriverView { id: v.id, capacity: v.capacity, status: "idle" })
        .collect();
    Ok(Json(out))
}

#[derive(Debug, Deserialize)]
pub struct StartSystemRequest {
    pub clustering_algo: Option<ClusteringAlgorithm>,
    pub routing_algo: Option<RoutingAlgorithm>,
    pub hybrid_algo: Option<HybridAlgorithm>,
    pub depot_origin: PointDto,
    pub start_time: DateTime<Utc>,
    #[allow(dead_code)]
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct PointDto {
    pub lng: f64,
    pub lat: f64,
}

impl From<PointDto> for Point {
    fn from(p: PointDto) -> Self {
        Point::new(p.lng, p.lat)
    }
}

fn solver_choice_from(
    clustering: Option<ClusteringAlgorithm>,
    routing: Option<RoutingAlgorithm>,
    hybrid: Option<HybridAlgorithm>,
) -> Result<SolverChoice, DispatchError> {
    match (clustering, routing, hybrid) {
        (Some(clustering), Some(routing), None) => Ok(SolverChoice::TwoStage { clustering, routing }),
        (None, None, Some(hybrid)) => Ok(SolverChoice::Hybrid(hybrid)),
        _ => Err(DispatchError::InvalidAlgorithmConfig(
            "provide either hybrid_algo alone or both clustering_algo and routing_algo".to_string(),
        )),
    }
}

pub async fn start_system(
    State(state): State<Arc<AdapterState>>,
    Json(req): Json<StartSystemRequest>,
) -> Result<Json<serde_json::Value>, AdapterError> {
    let solver = solver_choice_from(req.clustering_algo, req.routing_algo, req.hybrid_algo)?;

    let mut init = state.init.lock().await;
    if init.initialized {
        return Err(AdapterError::Core(DispatchError::SystemAlreadyInitialized));
    }
    if init.pending_drivers.is_empty() {
        return Err(AdapterError::Core(DispatchError::NoVehiclesRegistered));
    }

    let config = SimulationConfig {
        solver,
        ..SimulationConfig::default()
    };
    let drivers = std::mem::take(&mut init.pending_drivers);
    init.initialized = true;
    drop(init);

    let depot: Point = req.depot_origin.into();
    let world = state.build_world(config, depot, req.start_time, drivers);
    let schedule = state.new_schedule();

    let mut routing = state.routing.lock().await;
    *routing = Some(SystemHandle { world, schedule });
    drop(routing);

    Ok(Json(json!({ "started": true, "start_time": req.start_time })))
}

#[derive(Debug, Deserialize)]
pub struct AdmitOrderRequest {
    pub id: String,
    pub point: PointDto,
    pub size: u32,
    pub preparation: i64,
    pub time: i64,
}

pub async fn admit_order(
    State(state): State<Arc<AdapterState>>,
    Json(req): Json<AdmitOrderRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AdapterError> {
    let mut routing = state.routing.lock().await;
    let mut handle = routing.take().ok_or(AdapterError::Core(DispatchError::SystemNotInitialized))?;

    let now = handle.world.resource::<dispatch_core::clock::SimulationClock>().now();
    let delivery = Delivery::new(req.id.clone(), req.point.into(), req.size, req.preparation, req.time, now);
    if let Err(err) = dispatch_core::systems::admit_delivery(&mut handle.world, delivery) {
        *routing = Some(handle);
        return Err(AdapterError::Core(err));
    }

    // The solver the schedule invokes is CPU-intensive; run it off the async
    // executor so one expensive routing pass doesn't stall other requests.
    let handle = tokio::task::spawn_blocking(move || {
        handle.schedule.run(&mut handle.world);
        handle
    })
    .await
    .map_err(|err| AdapterError::SolverTaskFailed(err.to_string()))?;

    broadcast_event(&state.events, Envelope::new("new_delivery", now, json!({ "id": req.id })));
    if let Some(status) = delivery_status(&handle.world, &req.id) {
        if status == DeliveryStatus::Dispatched {
            broadcast_event(&state.events, Envelope::new("driver_dispatched", now, json!({ "delivery_id": req.id })));
        }
    }

    *routing = Some(handle);

    Ok((StatusCode::ACCEPTED, Json(json!({ "admitted": req.id }))))
}

fn delivery_status(world: &bevy_ecs::prelude::World, id: &str) -> Option<DeliveryStatus> {
    let entity = *world.resource::<dispatch_core::model::DeliveryIndex>().0.get(id)?;
    world.get::<Delivery>(entity).map(|d| d.status)
}

pub async fn update_routes(
    State(state): State<Arc<AdapterState>>,
) -> Result<Json<serde_json::Value>, AdapterError> {
    let mut routing = state.routing.lock().await;
    let handle = routing.take().ok_or(AdapterError::Core(DispatchError::SystemNotInitialized))?;

    let mut handle = tokio::task::spawn_blocking(move || {
        handle.schedule.run(&mut handle.world);
        handle
    })
    .await
    .map_err(|err| AdapterError::SolverTaskFailed(err.to_string()))?;

    let now = handle.world.resource::<dispatch_core::clock::SimulationClock>().now();
    let routes = snapshot_routes(&mut handle.world);
    broadcast_event(
        &state.events,
        Envelope::new("full_routes_update", now, json!({ "routes": routes })),
    );

    *routing = Some(handle);

    Ok(Json(json!({ "routes": routes })))
}

fn snapshot_routes(world: &mut bevy_ecs::prelude::World) -> HashMap<u64, Vec<String>> {
    let mut query = world.query::<&Vehicle>();
    query.iter(world).map(|vehicle| (vehicle.id, vehicle.current_route.clone())).collect()
}

#[derive(Debug, Deserialize)]
pub struct AdvanceTimeQuery {
    pub minutes: i64,
}

pub async fn advance_time(
    State(state): State<Arc<AdapterState>>,
    Query(params): Query<AdvanceTimeQuery>,
) -> Result<Json<serde_json::Value>, AdapterError> {
    let mut routing = state.routing.lock().await;
    let mut handle = routing.take().ok_or(AdapterError::Core(DispatchError::SystemNotInitialized))?;

    let target = handle.world.resource::<dispatch_core::clock::SimulationClock>().now()
        + chrono::Duration::minutes(params.minutes);
    handle.world.resource_mut::<dispatch_core::clock::SimulationClock>().set_now(target);

    let events_sender = state.events.clone();
    let (handle, processed) = tokio::task::spawn_blocking(move || {
        let mut processed = 0usize;
        loop {
            let hooked = run_next_event_with_hook(&mut handle.world, &mut handle.schedule, |world, event| {
                emit_for_event(world, event, &events_sender);
            });
            if !hooked {
                break;
            }
            processed += 1;
        }
        (handle, processed)
    })
    .await
    .map_err(|err| AdapterError::SolverTaskFailed(err.to_string()))?;

    let new_time = handle.world.resource::<dispatch_core::clock::SimulationClock>().now();
    *routing = Some(handle);
    Ok(Json(json!({ "new_time": new_time, "events_processed": processed })))
}

fn emit_for_event(
    world: &bevy_ecs::prelude::World,
    event: &dispatch_core::clock::Event,
    events: &tokio::sync::broadcast::Sender<String>,
) {
    use dispatch_core::clock::{EventSubject, EventType};
    match (&event.event_type, &event.subject) {
        (EventType::VehicleReturn, EventSubject::Vehicle(id)) => {
            broadcast_event(events, Envelope::new("driver_returned", event.timestamp, json!({ "vehicle_id": id })));
        }
        (EventType::ExpectedDelivery, EventSubject::Delivery(id)) => {
            if delivery_status(world, id) == Some(DeliveryStatus::Delivered) {
                broadcast_event(
                    events,
                    Envelope::new("delivery_completed", event.timestamp, json!({ "delivery_id": id })),
                );
            }
        }
        _ => {}
    }
}
