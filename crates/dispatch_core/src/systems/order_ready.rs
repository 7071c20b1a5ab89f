use bevy_ecs::prelude::{Query, Res};

use crate::clock::{CurrentEvent, EventSubject, EventType};
use crate::model::{Delivery, DeliveryIndex, DeliveryStatus};

/// `ORDER_READY`: if the delivery is still `PENDING`, transition it to `READY`.
pub fn order_ready_system(
    event: Res<CurrentEvent>,
    index: Res<DeliveryIndex>,
    mut deliveries: Query<&mut Delivery>,
) {
    if event.0.event_type != EventType::OrderReady {
        return;
    }
    let EventSubject::Delivery(id) = &event.0.subject else {
        return;
    };
    let Some(&entity) = index.0.get(id) else {
        tracing::debug!(delivery_id = %id, "order_ready for unknown delivery, skipping");
        return;
    };
    let Ok(mut delivery) = deliveries.get_mut(entity) else {
        return;
    };
    if delivery.status == DeliveryStatus::Pending {
        delivery.status = DeliveryStatus::Ready;
        tracing::debug!(delivery_id = %id, "delivery ready");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Event;
    use crate::model::Point;
    use bevy_ecs::prelude::{Schedule, World};
    use chrono::Utc;

    #[test]
    fn pending_delivery_transitions_to_ready() {
        let mut world = World::new();
        let now = Utc::now();
        let delivery = Delivery::new("d1", Point::new(0.0, 0.0), 1, 5, 30, now);
        let entity = world.spawn(delivery).id();
        let mut index = DeliveryIndex::default();
        index.0.insert("d1".to_string(), entity);
        world.insert_resource(index);
        world.insert_resource(crate::clock::CurrentEvent(Event {
            id: 0,
            event_type: EventType::OrderReady,
            timestamp: now,
            subject: EventSubject::Delivery("d1".to_string()),
        }));

        let mut schedule = Schedule::default();
        schedule.add_systems(order_ready_system);
        schedule.run(&mut world);

        let status = world.entity(entity).get::<Delivery>().unwrap().status;
        assert_eq!(status, DeliveryStatus::Ready);
    }
}
