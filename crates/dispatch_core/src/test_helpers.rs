//! Test helpers for common test setup and utilities.
//!
//! This module provides shared test utilities to reduce duplication across
//! test files and the `tests/` integration suite.

use bevy_ecs::prelude::World;
use chrono::{DateTime, Utc};

use crate::clock::SimulationClock;
use crate::config::SimulationConfig;
use crate::model::{DeliveryIndex, DepotOrigin, Point, VehicleIndex};
use crate::monitor::Monitor;

/// Depot used across tests that don't care about its exact coordinates.
pub const TEST_DEPOT: Point = Point { lng: 0.0, lat: 0.0 };

/// Builds a world with every resource the orchestrator and event handlers
/// expect, all at their defaults, anchored at `now`.
pub fn create_test_world(now: DateTime<Utc>) -> World {
    let mut world = World::new();
    world.insert_resource(SimulationClock::new(now));
    world.insert_resource(SimulationConfig::default());
    world.insert_resource(DepotOrigin(TEST_DEPOT));
    world.insert_resource(DeliveryIndex::default());
    world.insert_resource(VehicleIndex::default());
    world.insert_resource(Monitor::default());
    world
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_world_with_every_resource_present() {
        let world = create_test_world(Utc::now());
        assert!(world.get_resource::<SimulationClock>().is_some());
        assert!(world.get_resource::<SimulationConfig>().is_some());
        assert!(world.get_resource::<DepotOrigin>().is_some());
        assert!(world.get_resource::<DeliveryIndex>().is_some());
        assert!(world.get_resource::<VehicleIndex>().is_some());
        assert!(world.get_resource::<Monitor>().is_some());
    }
}
