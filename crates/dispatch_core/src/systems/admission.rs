//! External entry points into the world: registering a vehicle and admitting
//! a delivery. Neither is gated on `CurrentEvent` — both are called directly
//! by the adapter or the CLI driver, outside the event-draining flow.

use bevy_ecs::prelude::World;

use crate::clock::{EventSubject, EventType, SimulationClock};
use crate::error::DispatchError;
use crate::model::{Delivery, DeliveryIndex, Vehicle, VehicleIndex};
use crate::monitor::Monitor;

/// Registers a vehicle pre-start. Fails if the id is already registered.
pub fn register_vehicle(world: &mut World, vehicle: Vehicle) -> Result<(), DispatchError> {
    let id = vehicle.id;
    if world.resource::<VehicleIndex>().0.contains_key(&id) {
        return Err(DispatchError::DuplicateVehicleId(id));
    }
    let entity = world.spawn(vehicle).id();
    world.resource_mut::<VehicleIndex>().0.insert(id, entity);
    tracing::info!(vehicle_id = id, "vehicle registered");
    Ok(())
}

/// Admits a delivery: records it in the world, schedules `ORDER_CREATED`,
/// `ORDER_READY`, and `PICKUP_DEADLINE`, and increments `monitor.created`.
pub fn admit_delivery(world: &mut World, delivery: Delivery) -> Result<(), DispatchError> {
    let id = delivery.id.clone();
    if world.resource::<DeliveryIndex>().0.contains_key(&id) {
        return Err(DispatchError::InvalidAlgorithmConfig(format!(
            "duplicate delivery id: {id}"
        )));
    }

    let created_at = delivery.created_at;
    let ready_at = delivery.ready_at;
    let deadline = delivery.deadline;

    let entity = world.spawn(delivery).id();
    world.resource_mut::<DeliveryIndex>().0.insert(id.clone(), entity);

    {
        let mut clock = world.resource_mut::<SimulationClock>();
        clock.schedule(EventType::OrderCreated, created_at, EventSubject::Delivery(id.clone()));
        clock.schedule(EventType::OrderReady, ready_at, EventSubject::Delivery(id.clone()));
        clock.schedule(EventType::PickupDeadline, deadline, EventSubject::Delivery(id.clone()));
    }
    world.resource_mut::<Monitor>().created += 1;
    tracing::info!(delivery_id = %id, "delivery admitted");
    Ok(())
}
