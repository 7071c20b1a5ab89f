use bevy_ecs::prelude::Res;

use crate::clock::{CurrentEvent, EventType};

/// Purely informational: the delivery was admitted. Logged at debug level,
/// no state transition happens here (the delivery is already `PENDING` from
/// `admission::admit_delivery`).
pub fn order_created_system(event: Res<CurrentEvent>) {
    if event.0.event_type != EventType::OrderCreated {
        return;
    }
    tracing::debug!(subject = ?event.0.subject, "order created");
}
