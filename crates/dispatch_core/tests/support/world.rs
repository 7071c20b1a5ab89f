use bevy_ecs::prelude::World;
use chrono::{DateTime, Utc};
use dispatch_core::clock::SimulationClock;
use dispatch_core::config::SimulationConfig;
use dispatch_core::model::{DeliveryIndex, DepotOrigin, Point, VehicleIndex};
use dispatch_core::monitor::Monitor;

pub const DEPOT: Point = Point { lng: 0.0, lat: 0.0 };

/// Builds a world with every resource the runner and systems expect.
pub fn fresh_world(now: DateTime<Utc>) -> World {
    let mut world = World::new();
    world.insert_resource(SimulationClock::new(now));
    world.insert_resource(SimulationConfig::default());
    world.insert_resource(DepotOrigin(DEPOT));
    world.insert_resource(DeliveryIndex::default());
    world.insert_resource(VehicleIndex::default());
    world.insert_resource(Monitor::default());
    world
}

/// Same as `fresh_world` but with a caller-supplied config.
pub fn world_with_config(now: DateTime<Utc>, config: SimulationConfig) -> World {
    let mut world = fresh_world(now);
    world.insert_resource(config);
    world
}
