use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventSubject, EventType};
use crate::model::{Delivery, DeliveryIndex, DeliveryStatus};
use crate::monitor::Monitor;

/// `PICKUP_DEADLINE`: if the delivery has not yet been dispatched or
/// delivered and has not already been marked late, latch `marked_late` and
/// increment the monitor's `late` counter. This is an alert, not a
/// cancellation: the delivery remains eligible for a later routing pass.
pub fn pickup_deadline_system(
    event: Res<CurrentEvent>,
    index: Res<DeliveryIndex>,
    mut deliveries: Query<&mut Delivery>,
    mut monitor: ResMut<Monitor>,
) {
    if event.0.event_type != EventType::PickupDeadline {
        return;
    }
    let EventSubject::Delivery(id) = &event.0.subject else {
        return;
    };
    let Some(&entity) = index.0.get(id) else {
        tracing::debug!(delivery_id = %id, "pickup_deadline for unknown delivery, skipping");
        return;
    };
    let Ok(mut delivery) = deliveries.get_mut(entity) else {
        return;
    };
    if matches!(delivery.status, DeliveryStatus::Dispatched | DeliveryStatus::Delivered) {
        return;
    }
    if delivery.marked_late {
        return;
    }
    delivery.marked_late = true;
    monitor.late += 1;
    tracing::warn!(delivery_id = %id, "delivery missed its pickup deadline");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Event;
    use crate::model::Point;
    use bevy_ecs::prelude::{Schedule, World};
    use chrono::Utc;

    #[test]
    fn marks_late_exactly_once() {
        let mut world = World::new();
        let now = Utc::now();
        let delivery = Delivery::new("d1", Point::new(0.0, 0.0), 1, 5, 30, now);
        let entity = world.spawn(delivery).id();
        let mut index = DeliveryIndex::default();
        index.0.insert("d1".to_string(), entity);
        world.insert_resource(index);
        world.insert_resource(Monitor::default());
        world.insert_resource(crate::clock::CurrentEvent(Event {
            id: 0,
            event_type: EventType::PickupDeadline,
            timestamp: now,
            subject: EventSubject::Delivery("d1".to_string()),
        }));

        let mut schedule = Schedule::default();
        schedule.add_systems(pickup_deadline_system);
        schedule.run(&mut world);
        schedule.run(&mut world);

        let delivery = world.entity(entity).get::<Delivery>().unwrap();
        assert!(delivery.marked_late);
        assert_eq!(world.resource::<Monitor>().late, 1);
    }
}
