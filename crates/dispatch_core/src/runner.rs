//! Simulation runner: advances the clock and routes events into the ECS.
//!
//! Clock progression and event routing happen here, outside systems. Each step
//! pops the next due event from [SimulationClock], inserts it as [CurrentEvent],
//! then runs the schedule.

use bevy_ecs::prelude::Res;
use bevy_ecs::prelude::{Schedule, World};
use bevy_ecs::schedule::{apply_deferred, IntoSystemConfigs};

use crate::clock::{CurrentEvent, Event, EventType, SimulationClock};
use crate::systems::{
    expected_delivery_system, order_created_system, order_ready_system, pickup_deadline_system,
    routing_decision_system, vehicle_return_system,
};

fn is_order_created(event: Option<Res<CurrentEvent>>) -> bool {
    event.map(|e| e.0.event_type == EventType::OrderCreated).unwrap_or(false)
}

fn is_order_ready(event: Option<Res<CurrentEvent>>) -> bool {
    event.map(|e| e.0.event_type == EventType::OrderReady).unwrap_or(false)
}

fn is_pickup_deadline(event: Option<Res<CurrentEvent>>) -> bool {
    event.map(|e| e.0.event_type == EventType::PickupDeadline).unwrap_or(false)
}

fn is_expected_delivery(event: Option<Res<CurrentEvent>>) -> bool {
    event.map(|e| e.0.event_type == EventType::ExpectedDelivery).unwrap_or(false)
}

fn is_vehicle_return(event: Option<Res<CurrentEvent>>) -> bool {
    event.map(|e| e.0.event_type == EventType::VehicleReturn).unwrap_or(false)
}

/// Runs one simulation step: pops the next due event, inserts it as
/// [CurrentEvent], then runs the schedule. Returns `true` if an event was
/// processed, `false` if the clock had nothing due.
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> bool {
    let event = match world.resource_mut::<SimulationClock>().pop_if_due() {
        Some(e) => e,
        None => return false,
    };
    world.insert_resource(CurrentEvent(event));
    schedule.run(world);
    true
}

/// Runs one simulation step and invokes `hook` after the schedule completes.
pub fn run_next_event_with_hook<F>(world: &mut World, schedule: &mut Schedule, mut hook: F) -> bool
where
    F: FnMut(&World, &Event),
{
    let event = match world.resource_mut::<SimulationClock>().pop_if_due() {
        Some(e) => e,
        None => return false,
    };
    world.insert_resource(CurrentEvent(event.clone()));
    schedule.run(world);
    hook(world, &event);
    true
}

/// Runs simulation steps until the event queue has nothing due or `max_steps`
/// is reached, advancing the clock to the next event's timestamp between
/// steps so due events keep draining. Returns the number of steps executed.
pub fn run_until_empty(world: &mut World, schedule: &mut Schedule, max_steps: usize) -> usize {
    let mut steps = 0;
    loop {
        if steps >= max_steps {
            break;
        }
        if !run_next_event(world, schedule) {
            let next = world.resource::<SimulationClock>().next_event_time();
            match next {
                Some(at) => world.resource_mut::<SimulationClock>().set_now(at),
                None => break,
            }
            if !run_next_event(world, schedule) {
                break;
            }
        }
        steps += 1;
    }
    steps
}

/// Builds the default dispatch schedule: the five event handlers gated on
/// their event type, then the routing-decision orchestrator (which runs
/// unconditionally, since a routing opportunity can open up regardless of
/// which event type just drained), then [apply_deferred] so spawned entities
/// are available to the next step.
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();

    schedule.add_systems((
        order_created_system.run_if(is_order_created),
        order_ready_system.run_if(is_order_ready),
        pickup_deadline_system.run_if(is_pickup_deadline),
        expected_delivery_system.run_if(is_expected_delivery),
        vehicle_return_system.run_if(is_vehicle_return),
        apply_deferred,
    ));

    schedule.add_systems(routing_decision_system);

    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::model::{Delivery, DeliveryIndex, DeliveryStatus, DepotOrigin, Point, Vehicle, VehicleIndex, VehicleStatus};
    use crate::monitor::Monitor;
    use crate::systems::{admit_delivery, register_vehicle};
    use chrono::Utc;

    fn fresh_world(now: chrono::DateTime<Utc>) -> World {
        let mut world = World::new();
        world.insert_resource(SimulationClock::new(now));
        world.insert_resource(SimulationConfig::default());
        world.insert_resource(DepotOrigin(Point::new(0.0, 0.0)));
        world.insert_resource(DeliveryIndex::default());
        world.insert_resource(VehicleIndex::default());
        world.insert_resource(Monitor::default());
        world
    }

    #[test]
    fn single_delivery_happy_path() {
        let now = Utc::now();
        let mut world = fresh_world(now);
        register_vehicle(&mut world, Vehicle::new(1, 10)).unwrap();
        let delivery = Delivery::new("d1", Point::new(0.0, 0.01), 1, 5, 30, now);
        admit_delivery(&mut world, delivery).unwrap();

        let mut schedule = simulation_schedule();
        let steps = run_until_empty(&mut world, &mut schedule, 1000);
        assert!(steps > 0);

        assert_eq!(world.resource::<Monitor>().created, 1);
        assert_eq!(world.resource::<Monitor>().completed, 1);
        assert_eq!(world.resource::<Monitor>().late, 0);

        let delivery_entity = *world.resource::<DeliveryIndex>().0.get("d1").unwrap();
        let delivery = world.entity(delivery_entity).get::<Delivery>().unwrap();
        assert_eq!(delivery.status, DeliveryStatus::Delivered);

        let vehicle_entity = *world.resource::<VehicleIndex>().0.get(&1).unwrap();
        let vehicle = world.entity(vehicle_entity).get::<Vehicle>().unwrap();
        assert_eq!(vehicle.status, VehicleStatus::Idle);
    }
}
