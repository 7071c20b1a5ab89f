//! Shared server state: the ECS world plus the two locks that separate
//! "accepting drivers before start" from "routing after start" (§5).

use std::collections::HashMap;
use std::sync::Arc;

use bevy_ecs::prelude::{Schedule, World};
use dispatch_core::config::SimulationConfig;
use dispatch_core::model::{DeliveryIndex, DepotOrigin, Point, Vehicle, VehicleIndex};
use dispatch_core::monitor::Monitor;
use dispatch_core::runner::simulation_schedule;
use tokio::sync::{broadcast, Mutex};

/// Vehicles registered before `POST /start_system`, held here until the
/// world exists to spawn them into.
#[derive(Debug, Default)]
pub struct InitState {
    pub pending_drivers: HashMap<u64, Vehicle>,
    pub initialized: bool,
}

/// The live simulation once started: the world plus the schedule that
/// drives it.
pub struct SystemHandle {
    pub world: World,
    pub schedule: Schedule,
}

/// Server-wide state shared across handlers. `init` guards registration
/// before start; `routing` guards the live world after start. A handler
/// never holds both locks at once.
pub struct AdapterState {
    pub init: Mutex<InitState>,
    pub routing: Mutex<Option<SystemHandle>>,
    pub events: broadcast::Sender<String>,
}

impl AdapterState {
    pub fn new() -> Arc<Self> {
        let (events, _rx) = broadcast::channel(1024);
        Arc::new(Self {
            init: Mutex::new(InitState::default()),
            routing: Mutex::new(None),
            events,
        })
    }

    /// Builds the world used by `start_system`, seeded with `config` and
    /// every vehicle registered through `POST /drivers` so far.
    pub fn build_world(
        &self,
        config: SimulationConfig,
        depot: Point,
        now: chrono::DateTime<chrono::Utc>,
        drivers: HashMap<u64, Vehicle>,
    ) -> World {
        let mut world = World::new();
        world.insert_resource(dispatch_core::clock::SimulationClock::new(now));
        world.insert_resource(config);
        world.insert_resource(DepotOrigin(depot));
        world.insert_resource(DeliveryIndex::default());
        world.insert_resource(VehicleIndex::default());
        world.insert_resource(Monitor::default());
        for vehicle in drivers.into_values() {
            let _ = dispatch_core::systems::register_vehicle(&mut world, vehicle);
        }
        world
    }

    pub fn new_schedule(&self) -> Schedule {
        simulation_schedule()
    }
}
