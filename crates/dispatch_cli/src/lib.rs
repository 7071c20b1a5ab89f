//! Library half of `dispatcher-sim`: the fixture-run and server-boot logic
//! the binary's `main.rs` calls into, kept separate so it can be exercised by
//! integration tests without spawning the compiled binary.

pub mod cli;
pub mod config;
pub mod fixture;

use bevy_ecs::prelude::World;
use dispatch_core::clock::SimulationClock;
use dispatch_core::config::SimulationConfig;
use dispatch_core::model::{DeliveryIndex, DepotOrigin, VehicleIndex};
use dispatch_core::monitor::Monitor;
use dispatch_core::runner::{run_until_empty, simulation_schedule};
use dispatch_core::systems::{admit_delivery, register_vehicle};

use config::RuntimeConfig;

const MAX_STEPS: usize = 2_000_000;

/// Runs a fixture file to completion and returns the run summary plus the
/// number of simulation steps executed. `main.rs` prints these; tests assert
/// on them directly.
pub fn run_fixture_to_summary(config: &RuntimeConfig) -> Result<(usize, Monitor), String> {
    let path = config
        .fixture_path
        .as_ref()
        .ok_or_else(|| "`run` requires --fixture <path> (or DISPATCH_FIXTURE / config file fixture_path)".to_string())?;

    let (vehicles, deliveries) = fixture::load_fixture(path).map_err(|err| err.to_string())?;

    let now = deliveries
        .iter()
        .map(|d| d.created_at)
        .min()
        .unwrap_or_else(chrono::Utc::now);

    let mut world = World::new();
    world.insert_resource(SimulationClock::new(now));
    world.insert_resource(SimulationConfig::default());
    world.insert_resource(DepotOrigin(config.depot));
    world.insert_resource(DeliveryIndex::default());
    world.insert_resource(VehicleIndex::default());
    world.insert_resource(Monitor::default());

    for vehicle in vehicles {
        if let Err(err) = register_vehicle(&mut world, vehicle) {
            tracing::warn!(error = %err, "skipping vehicle from fixture");
        }
    }
    for delivery in deliveries {
        if let Err(err) = admit_delivery(&mut world, delivery) {
            tracing::warn!(error = %err, "skipping delivery from fixture");
        }
    }

    let mut schedule = simulation_schedule();
    let steps = run_until_empty(&mut world, &mut schedule, MAX_STEPS);

    Ok((steps, *world.resource::<Monitor>()))
}

/// Boots the HTTP/WebSocket adapter and serves it until the process is
/// terminated.
pub async fn serve(config: &RuntimeConfig) {
    let state = dispatch_adapter::AdapterState::new();
    let app = dispatch_adapter::router(state);

    let addr = format!("{}:{}", config.bind_addr, config.port);
    tracing::info!(addr = %addr, "starting dispatch adapter server");
    let listener = tokio::net::TcpListener::bind(&addr).await.expect("failed to bind adapter address");
    axum::serve(listener, app).await.expect("adapter server failed");
}
