use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventSubject, EventType};
use crate::model::{Delivery, DeliveryIndex, DeliveryStatus};
use crate::monitor::Monitor;

/// `EXPECTED_DELIVERY`: if the delivery is `DISPATCHED`, transition it to
/// `DELIVERED` and increment `completed`.
pub fn expected_delivery_system(
    event: Res<CurrentEvent>,
    index: Res<DeliveryIndex>,
    mut deliveries: Query<&mut Delivery>,
    mut monitor: ResMut<Monitor>,
) {
    if event.0.event_type != EventType::ExpectedDelivery {
        return;
    }
    let EventSubject::Delivery(id) = &event.0.subject else {
        return;
    };
    let Some(&entity) = index.0.get(id) else {
        tracing::debug!(delivery_id = %id, "expected_delivery for unknown delivery, skipping");
        return;
    };
    let Ok(mut delivery) = deliveries.get_mut(entity) else {
        return;
    };
    if delivery.status != DeliveryStatus::Dispatched {
        return;
    }
    delivery.status = DeliveryStatus::Delivered;
    monitor.completed += 1;
    tracing::debug!(delivery_id = %id, "delivery completed");
}
