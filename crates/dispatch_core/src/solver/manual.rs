//! Manual assignment hybrid (§4.4): order deliveries by slack (deadline
//! minus depot travel time), hand them to the largest-capacity vehicles
//! first, and pack in further deliveries within a travel-time radius of the
//! depot until the vehicle is full.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::{build_plan, HybridSolver, Plan};
use crate::geo::{haversine_km, travel_minutes};
use crate::model::{Delivery, Point, Vehicle};

pub struct ManualAssignment {
    /// Maximum depot travel time (minutes) for a delivery to be grouped
    /// into an already-seeded route.
    pub max_travel_time_minutes: f64,
}

impl Default for ManualAssignment {
    fn default() -> Self {
        Self {
            max_travel_time_minutes: 8.0,
        }
    }
}

impl HybridSolver for ManualAssignment {
    fn plan_hybrid(
        &self,
        deliveries: &[Delivery],
        vehicles: &[Vehicle],
        depot: Point,
        avg_speed_kmh: f64,
        reference_time: DateTime<Utc>,
    ) -> HashMap<u64, Plan> {
        if deliveries.is_empty() || vehicles.is_empty() {
            return HashMap::new();
        }

        let deadline_minutes = |d: &Delivery| {
            (d.deadline - reference_time).num_seconds() as f64 / 60.0
        };
        let travel_time = |d: &Delivery| {
            travel_minutes(haversine_km(depot, d.point), avg_speed_kmh)
        };

        let mut enriched: Vec<(&Delivery, f64, f64)> = deliveries
            .iter()
            .map(|d| (d, travel_time(d), deadline_minutes(d) - travel_time(d)))
            .collect();
        // Ascending slack: the most urgent delivery (least slack) first.
        enriched.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap());

        let mut vehicles_sorted: Vec<&Vehicle> = vehicles.iter().collect();
        vehicles_sorted.sort_by(|a, b| b.capacity.cmp(&a.capacity));

        let mut assignments: HashMap<u64, Vec<Delivery>> =
            vehicles.iter().map(|v| (v.id, Vec::new())).collect();
        let mut loads: HashMap<u64, u32> = vehicles.iter().map(|v| (v.id, 0)).collect();
        let mut assigned: std::collections::HashSet<&str> = std::collections::HashSet::new();

        for vehicle in &vehicles_sorted {
            for (seed, seed_travel_time, _) in &enriched {
                if assigned.contains(seed.id.as_str()) {
                    continue;
                }
                if seed.size > vehicle.capacity {
                    continue;
                }
                let mut route = vec![(*seed).clone()];
                let mut load = seed.size;
                assigned.insert(seed.id.as_str());
                let _ = seed_travel_time;

                for (candidate, candidate_travel_time, _) in &enriched {
                    if load >= vehicle.capacity {
                        break;
                    }
                    if assigned.contains(candidate.id.as_str()) {
                        continue;
                    }
                    if load + candidate.size > vehicle.capacity {
                        continue;
                    }
                    if *candidate_travel_time <= self.max_travel_time_minutes {
                        route.push((*candidate).clone());
                        load += candidate.size;
                        assigned.insert(candidate.id.as_str());
                    }
                }

                *loads.get_mut(&vehicle.id).unwrap() += load;
                assignments.get_mut(&vehicle.id).unwrap().extend(route);
                if loads[&vehicle.id] >= vehicle.capacity {
                    break;
                }
            }
        }

        assignments
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

    fn delivery(id: &str, lng: f64, time_minutes: i64) -> Delivery {
        sized_delivery(id, lng, time_minutes, 1)
    }

    fn sized_delivery(id: &str, lng: f64, time_minutes: i64, size: u32) -> Delivery {
        let now = Utc::now();
        Delivery {
            id: id.to_string(),
            point: Point::new(lng, 0.01),
            size,
            preparation_minutes: 5,
            time_minutes,
            created_at: now,
            ready_at: now,
            deadline: now + chrono::Duration::minutes(time_minutes),
            status: DeliveryStatus::Ready,
            assigned_vehicle_id: None,
            marked_late: false,
        }
    }

    #[test]
    fn assigns_every_delivery_when_capacity_allows() {
        let deliveries = vec![
            delivery("a", 0.001, 60),
            delivery("b", 0.002, 30),
            delivery("c", 0.003, 90),
        ];
        let vehicles = vec![Vehicle::new(1, 5)];
        let plans = ManualAssignment::default().plan_hybrid(
            &deliveries,
            &vehicles,
            Point::new(0.0, 0.0),
            50.0,
            Utc::now(),
        );
        let assigned: usize = plans.values().map(|p| p.stops.len()).sum();
        assert_eq!(assigned, 3);
    }

    #[test]
    fn never_exceeds_vehicle_capacity() {
        let deliveries: Vec<Delivery> = (0..5)
            .map(|i| delivery(&format!("d{i}"), 0.001 * i as f64, 60))
            .collect();
        let vehicles = vec![Vehicle::new(1, 2), Vehicle::new(2, 2), Vehicle::new(3, 2)];
        let plans = ManualAssignment::default().plan_hybrid(
            &deliveries,
            &vehicles,
            Point::new(0.0, 0.0),
            50.0,
            Utc::now(),
        );
        for plan in plans.values() {
            let capacity = vehicles.iter().find(|v| v.id == plan.vehicle_id).unwrap().capacity;
            assert!(plan.stops.len() as u32 <= capacity);
        }
    }

    #[test]
    fn never_exceeds_capacity_with_heterogeneous_sizes() {
        let deliveries = vec![
            sized_delivery("a", 0.001, 60, 1),
            sized_delivery("b", 0.002, 60, 1),
            sized_delivery("c", 0.003, 60, 1),
            sized_delivery("oversized", 0.004, 60, 100),
        ];
        let vehicles = vec![Vehicle::new(1, 1), Vehicle::new(2, 3)];
        let plans = ManualAssignment::default().plan_hybrid(
            &deliveries,
            &vehicles,
            Point::new(0.0, 0.0),
            50.0,
            Utc::now(),
        );
        for plan in plans.values() {
            let capacity = vehicles.iter().find(|v| v.id == plan.vehicle_id).unwrap().capacity;
            let load: u32 = plan.stops.iter().map(|d| d.size).sum();
            assert!(load <= capacity, "vehicle {} load {} exceeds capacity {}", plan.vehicle_id, load, capacity);
        }
        // the size-100 delivery can never fit on either vehicle (capacity 1 or 3)
        assert!(plans.values().all(|p| p.stops.iter().all(|d| d.id != "oversized")));
    }
}
