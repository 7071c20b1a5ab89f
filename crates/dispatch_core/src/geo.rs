//! Haversine distance and the travel-time matrices solvers are evaluated against.

use crate::model::Point;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers.
pub fn haversine_km(a: Point, b: Point) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Minutes to cover `km` at `avg_speed_kmh`.
pub fn travel_minutes(km: f64, avg_speed_kmh: f64) -> f64 {
    if avg_speed_kmh <= 0.0 {
        return 0.0;
    }
    km / avg_speed_kmh * 60.0
}

/// A symmetric travel-time matrix over a fixed set of points, indexed by
/// position. Index 0 is always reserved for the depot by convention of every
/// caller in this crate (solvers pass `depot_index = 0`).
#[derive(Debug, Clone)]
pub struct TravelTimeMatrix {
    points: Vec<Point>,
    avg_speed_kmh: f64,
}

impl TravelTimeMatrix {
    /// Builds a matrix with the depot at index 0 followed by `stops` in order.
    pub fn with_depot(depot: Point, stops: &[Point], avg_speed_kmh: f64) -> Self {
        let mut points = Vec::with_capacity(stops.len() + 1);
        points.push(depot);
        points.extend_from_slice(stops);
        Self {
            points,
            avg_speed_kmh,
        }
    }

    pub fn depot_index(&self) -> usize {
        0
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, index: usize) -> Point {
        self.points[index]
    }

    /// Travel time in minutes between two indices (0 for `i == j`).
    pub fn time(&self, i: usize, j: usize) -> f64 {
        if i == j {
            return 0.0;
        }
        travel_minutes(haversine_km(self.points[i], self.points[j]), self.avg_speed_kmh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_zero_for_identical_points() {
        let p = Point::new(-46.6, -23.5);
        assert!(haversine_km(p, p) < 1e-9);
    }

    #[test]
    fn travel_minutes_scales_inversely_with_speed() {
        let km = 50.0;
        assert!((travel_minutes(km, 50.0) - 60.0).abs() < 1e-9);
        assert!((travel_minutes(km, 100.0) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn matrix_depot_is_index_zero_and_diagonal_is_zero() {
        let depot = Point::new(0.0, 0.0);
        let stops = vec![Point::new(0.0, 0.01), Point::new(0.01, 0.0)];
        let matrix = TravelTimeMatrix::with_depot(depot, &stops, 50.0);
        assert_eq!(matrix.depot_index(), 0);
        assert_eq!(matrix.len(), 3);
        assert_eq!(matrix.time(1, 1), 0.0);
        assert!(matrix.time(0, 1) > 0.0);
        assert!((matrix.time(0, 1) - matrix.time(1, 0)).abs() < 1e-9);
    }
}
