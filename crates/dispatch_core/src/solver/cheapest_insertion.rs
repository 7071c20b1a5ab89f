//! Cheapest-insertion routing (§4.3): seed with the stop nearest the depot,
//! then repeatedly insert the unvisited stop/position pair that adds the
//! least travel time.

use chrono::{DateTime, Utc};

use super::{build_plan, Plan, RoutingSolver};
use crate::geo::TravelTimeMatrix;
use crate::model::{Delivery, Point};

pub struct CheapestInsertion;

/// Builds a visit order (matrix indices, depot excluded) via cheapest
/// insertion. Shared with the hybrid solvers that also need this primitive
/// per-vehicle.
pub(crate) fn cheapest_insertion_order(matrix: &TravelTimeMatrix, candidates: &[usize]) -> Vec<usize> {
    if candidates.is_empty() {
        return Vec::new();
    }
    let depot = matrix.depot_index();
    let mut remaining: Vec<usize> = candidates.to_vec();

    let seed_pos = remaining
        .iter()
        .enumerate()
        .min_by(|(_, &a), (_, &b)| matrix.time(depot, a).partial_cmp(&matrix.time(depot, b)).unwrap())
        .map(|(pos, _)| pos)
        .unwrap();
    let mut route = vec![remaining.remove(seed_pos)];

    while !remaining.is_empty() {
        let mut best: Option<(usize, usize, f64)> = None; // (candidate idx in `remaining`, insert position, cost)
        for (ci, &candidate) in remaining.iter().enumerate() {
            for pos in 0..=route.len() {
                let u = if pos == 0 { depot } else { route[pos - 1] };
                let v = if pos == route.len() { depot } else { route[pos] };
                let cost = matrix.time(u, candidate) + matrix.time(candidate, v) - matrix.time(u, v);
                if best.map(|(_, _, bc)| cost < bc).unwrap_or(true) {
                    best = Some((ci, pos, cost));
                }
            }
        }
        let (ci, pos, _) = best.unwrap();
        let candidate = remaining.remove(ci);
        route.insert(pos, candidate);
    }
    route
}

impl RoutingSolver for CheapestInsertion {
    fn plan_route(
        &self,
        group: &[Delivery],
        vehicle_id: u64,
        depot: Point,
        avg_speed_kmh: f64,
        reference_time: DateTime<Utc>,
    ) -> Option<Plan> {
        if group.is_empty() {
            return None;
        }
        let points: Vec<Point> = group.iter().map(|d| d.point).collect();
        let matrix = TravelTimeMatrix::with_depot(depot, &points, avg_speed_kmh);
        let candidates: Vec<usize> = (1..matrix.len()).collect();
        let matrix_order = cheapest_insertion_order(&matrix, &candidates);
        let order: Vec<usize> = matrix_order.iter().map(|&i| i - 1).collect();
        build_plan(vehicle_id, group, depot, avg_speed_kmh, reference_time, &order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeliveryStatus;
    use chrono::Utc;

    fn delivery(id: &str, lng: f64, lat: f64) -> Delivery {
        let now = Utc::now();
        Delivery {
            id: id.to_string(),
            point: Point::new(lng, lat),
            size: 1,
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
    fn visits_every_stop_exactly_once() {
        let group = vec![
            delivery("a", 0.0, 0.03),
            delivery("b", 0.0, 0.01),
            delivery("c", 0.0, 0.02),
        ];
        let plan = CheapestInsertion
            .plan_route(&group, 1, Point::new(0.0, 0.0), 50.0, Utc::now())
            .expect("plan");
        let mut ids: Vec<&str> = plan.stops.iter().map(|d| d.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
