//! Greedy sequential clustering (§4.2): order by decreasing depot distance,
//! assign each delivery to the first vehicle with enough remaining capacity.

use std::collections::HashMap;

use super::ClusteringSolver;
use crate::geo::haversine_km;
use crate::model::{Delivery, Point, Vehicle};

pub struct GreedyClustering;

impl ClusteringSolver for GreedyClustering {
    fn plan_two_stage(
        &self,
        deliveries: &[Delivery],
        vehicles: &[Vehicle],
        depot: Point,
    ) -> HashMap<u64, Vec<Delivery>> {
        let mut out = HashMap::new();
        if deliveries.is_empty() || vehicles.is_empty() {
            return out;
        }

        let mut ordered: Vec<&Delivery> = deliveries.iter().collect();
        ordered.sort_by(|a, b| {
            let da = haversine_km(depot, a.point);
            let db = haversine_km(depot, b.point);
            db.partial_cmp(&da).unwrap()
        });

        let mut remaining: HashMap<u64, u32> =
            vehicles.iter().map(|v| (v.id, v.capacity)).collect();

        for delivery in ordered {
            if let Some(vehicle) = vehicles
                .iter()
                .find(|v| remaining[&v.id] >= delivery.size)
            {
                *remaining.get_mut(&vehicle.id).unwrap() -= delivery.size;
                out.entry(vehicle.id)
                    .or_insert_with(Vec::new)
                    .push(delivery.clone());
            }
            // No vehicle has room: the delivery is left unassigned this pass.
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeliveryStatus;
    use chrono::Utc;

    fn delivery(id: &str, size: u32, lng: f64) -> Delivery {
        Delivery {
            id: id.to_string(),
            point: Point::new(lng, 0.0),
            size,
            preparation_minutes: 5,
            time_minutes: 30,
            created_at: Utc::now(),
            ready_at: Utc::now(),
            deadline: Utc::now() + chrono::Duration::minutes(30),
            status: DeliveryStatus::Ready,
            assigned_vehicle_id: None,
            marked_late: false,
        }
    }

    #[test]
    fn leaves_overflow_unassigned() {
        let deliveries = vec![
            delivery("a", 4, 0.01),
            delivery("b", 4, 0.02),
            delivery("c", 4, 0.03),
        ];
        let vehicles = vec![Vehicle::new(1, 5), Vehicle::new(2, 5)];
        let groups = GreedyClustering.plan_two_stage(&deliveries, &vehicles, Point::new(0.0, 0.0));
        let assigned: usize = groups.values().map(|g| g.len()).sum();
        assert_eq!(assigned, 2);
        for (vid, group) in &groups {
            let capacity = vehicles.iter().find(|v| v.id == *vid).unwrap().capacity;
            let load: u32 = group.iter().map(|d| d.size).sum();
            assert!(load <= capacity);
        }
    }
}
