use bevy_ecs::prelude::{Query, Res};

use crate::clock::{CurrentEvent, EventSubject, EventType};
use crate::model::{Vehicle, VehicleIndex, VehicleStatus};

/// `VEHICLE_RETURN`: the vehicle arrives back at the depot and goes idle.
pub fn vehicle_return_system(
    event: Res<CurrentEvent>,
    index: Res<VehicleIndex>,
    mut vehicles: Query<&mut Vehicle>,
) {
    if event.0.event_type != EventType::VehicleReturn {
        return;
    }
    let EventSubject::Vehicle(id) = event.0.subject else {
        return;
    };
    let Some(&entity) = index.0.get(&id) else {
        tracing::warn!(vehicle_id = id, "vehicle_return for unknown vehicle, skipping");
        return;
    };
    let Ok(mut vehicle) = vehicles.get_mut(entity) else {
        return;
    };
    vehicle.status = VehicleStatus::Idle;
    vehicle.current_route.clear();
    vehicle.route_end_time = None;
    tracing::debug!(vehicle_id = id, "vehicle returned to depot");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Event;
    use bevy_ecs::prelude::{Schedule, World};
    use chrono::Utc;

    #[test]
    fn vehicle_goes_idle_and_clears_route() {
        let mut world = World::new();
        let now = Utc::now();
        let mut vehicle = Vehicle::new(1, 5);
        vehicle.status = VehicleStatus::OnRoute;
        vehicle.current_route = vec!["a".to_string(), "b".to_string()];
        vehicle.route_end_time = Some(now);
        let entity = world.spawn(vehicle).id();
        let mut index = VehicleIndex::default();
        index.0.insert(1, entity);
        world.insert_resource(index);
        world.insert_resource(crate::clock::CurrentEvent(Event {
            id: 0,
            event_type: EventType::VehicleReturn,
            timestamp: now,
            subject: EventSubject::Vehicle(1),
        }));

        let mut schedule = Schedule::default();
        schedule.add_systems(vehicle_return_system);
        schedule.run(&mut world);

        let vehicle = world.entity(entity).get::<Vehicle>().unwrap();
        assert_eq!(vehicle.status, VehicleStatus::Idle);
        assert!(vehicle.current_route.is_empty());
        assert!(vehicle.route_end_time.is_none());
    }
}
