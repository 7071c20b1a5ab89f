//! Greedy fleet-wide insertion hybrid (§4.4): repeatedly insert the
//! (delivery, vehicle, position) triple that least increases that vehicle's
//! total penalty, route time as tie-break, until nothing more fits.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::{build_plan, evaluate_group, HybridSolver, Plan};
use crate::model::{Delivery, Point, Vehicle};

pub struct GreedyInsertionHybrid;

impl HybridSolver for GreedyInsertionHybrid {
    fn plan_hybrid(
        &self,
        deliveries: &[Delivery],
        vehicles: &[Vehicle],
        depot: Point,
        avg_speed_kmh: f64,
        reference_time: DateTime<Utc>,
    ) -> HashMap<u64, Plan> {
        let mut routes: HashMap<u64, Vec<Delivery>> =
            vehicles.iter().map(|v| (v.id, Vec::new())).collect();
        let mut loads: HashMap<u64, u32> = vehicles.iter().map(|v| (v.id, 0)).collect();
        let mut remaining: Vec<Delivery> = deliveries.to_vec();

        loop {
            let mut best: Option<(usize, u64, usize, u64, f64)> = None;

            for (delivery_index, delivery) in remaining.iter().enumerate() {
                for vehicle in vehicles {
                    if loads[&vehicle.id] + delivery.size > vehicle.capacity {
                        continue;
                    }
                    let route = &routes[&vehicle.id];
                    for position in 0..=route.len() {
                        let mut candidate = route.clone();
                        candidate.insert(position, delivery.clone());
                        let Some((penalty, route_time)) =
                            evaluate_group(&candidate, depot, avg_speed_kmh, reference_time)
                        else {
                            continue;
                        };
                        let improves = match &best {
                            None => true,
                            Some((_, _, _, best_penalty, best_route_time)) => {
                                penalty
                                    .cmp(best_penalty)
                                    .then(route_time.partial_cmp(best_route_time).unwrap())
                                    == Ordering::Less
                            }
                        };
                        if improves {
                            best = Some((delivery_index, vehicle.id, position, penalty, route_time));
                        }
                    }
                }
            }

            match best {
                None => break,
                Some((delivery_index, vehicle_id, position, ..)) => {
                    let delivery = remaining.remove(delivery_index);
                    *loads.get_mut(&vehicle_id).unwrap() += delivery.size;
                    routes.get_mut(&vehicle_id).unwrap().insert(position, delivery);
                }
            }
        }

        routes
            .into_iter()
            .filter_map(|(vehicle_id, route)| {
                if route.is_empty() {
                    return None;
                }
                let order: Vec<usize> = (0..route.len()).collect();
                build_plan(vehicle_id, &route, depot, avg_speed_kmh, reference_time, &order)
                    .map(|plan| (vehicle_id, plan))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeliveryStatus;
    use chrono::Utc;

    fn delivery(id: &str, size: u32, lng: f64) -> Delivery {
        let now = Utc::now();
        Delivery {
            id: id.to_string(),
            point: Point::new(lng, 0.01),
            size,
            preparation_minutes: 5,
            time_minutes: 60,
            created_at: now,
            ready_at: now,
            deadline: now + chrono::Duration::minutes(60),
            status: DeliveryStatus::Ready,
            assigned_vehicle_id: None,
            marked_late: false,
        }
    }

    #[test]
    fn leaves_capacity_overflow_unassigned() {
        let deliveries = vec![
            delivery("a", 4, 0.01),
            delivery("b", 4, 0.02),
            delivery("c", 4, 0.03),
        ];
        let vehicles = vec![Vehicle::new(1, 5), Vehicle::new(2, 5)];
        let plans = GreedyInsertionHybrid.plan_hybrid(
            &deliveries,
            &vehicles,
            Point::new(0.0, 0.0),
            50.0,
            Utc::now(),
        );
        let assigned: usize = plans.values().map(|p| p.stops.len()).sum();
        assert_eq!(assigned, 2);
        for plan in plans.values() {
            let capacity = vehicles.iter().find(|v| v.id == plan.vehicle_id).unwrap().capacity;
            let load: u32 = plan.stops.iter().map(|d| d.size).sum();
            assert!(load <= capacity);
        }
    }
}
