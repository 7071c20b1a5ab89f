//! Loads the JSON fixture a `run` invocation drives: a fleet of vehicles and
//! a delivery arrival schedule (§4.10).

use std::path::Path;

use chrono::{DateTime, Utc};
use dispatch_core::model::{Delivery, Point, Vehicle};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct FixtureVehicle {
    pub id: u64,
    pub capacity: u32,
}

#[derive(Debug, Deserialize)]
pub struct FixtureDelivery {
    pub id: String,
    pub point: FixturePoint,
    pub size: u32,
    pub preparation: i64,
    pub time: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct FixturePoint {
    pub lng: f64,
    pub lat: f64,
}

#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub vehicles: Vec<FixtureVehicle>,
    pub deliveries: Vec<FixtureDelivery>,
}

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("failed to read fixture {0}: {1}")]
    Read(String, String),
    #[error("failed to parse fixture {0}: {1}")]
    Parse(String, String),
}

pub fn load_fixture(path: &Path) -> Result<(Vec<Vehicle>, Vec<Delivery>), FixtureError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| FixtureError::Read(path.display().to_string(), err.to_string()))?;
    let fixture: Fixture =
        serde_json::from_str(&raw).map_err(|err| FixtureError::Parse(path.display().to_string(), err.to_string()))?;

    let vehicles = fixture.vehicles.into_iter().map(|v| Vehicle::new(v.id, v.capacity)).collect();
    let deliveries = fixture
        .deliveries
        .into_iter()
        .map(|d| {
            Delivery::new(
                d.id,
                Point::new(d.point.lng, d.point.lat),
                d.size,
                d.preparation,
                d.time,
                d.created_at,
            )
        })
        .collect();

    Ok((vehicles, deliveries))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_vehicles_and_deliveries_from_json() {
        let path = std::env::temp_dir().join(format!("dispatch_cli_fixture_test_{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{
                "vehicles": [{"id": 1, "capacity": 10}],
                "deliveries": [{
                    "id": "d1",
                    "point": {"lng": 0.0, "lat": 0.01},
                    "size": 1,
                    "preparation": 5,
                    "time": 30,
                    "created_at": "2024-01-01T00:00:00Z"
                }]
            }"#,
        )
        .unwrap();

        let (vehicles, deliveries) = load_fixture(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(vehicles.len(), 1);
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].id, "d1");
    }
}
