//! # Dispatch Core
//!
//! A discrete-event simulation engine for a dynamic last-mile dispatcher.
//!
//! ## Overview
//!
//! This crate provides the core dispatch engine, including:
//!
//! - **Event Scheduling**: minute-precision discrete event system with FIFO tie-break
//! - **ECS Framework**: Entity Component System for delivery/vehicle state management
//! - **Route Evaluation**: arrival times, lateness penalties, total route time
//! - **Solvers**: pluggable clustering, routing, and hybrid assignment algorithms
//! - **Monitor**: aggregate dispatch metrics
//!
//! ## Key Concepts
//!
//! - **Discrete Events**: all simulation progress happens through scheduled events
//! - **Targeted Events**: events target specific entities (deliveries, vehicles)
//! - **Single writer**: the core owns the event queue and both entity tables exclusively
//!
//! ## Example
//!
//! ```rust,no_run
//! use bevy_ecs::prelude::World;
//! use chrono::Utc;
//! use dispatch_core::clock::SimulationClock;
//! use dispatch_core::config::SimulationConfig;
//! use dispatch_core::model::{Delivery, DeliveryIndex, DepotOrigin, Point, Vehicle, VehicleIndex};
//! use dispatch_core::monitor::Monitor;
//! use dispatch_core::runner::{run_until_empty, simulation_schedule};
//! use dispatch_core::systems::{admit_delivery, register_vehicle};
//!
//! let now = Utc::now();
//! let mut world = World::new();
//! world.insert_resource(SimulationClock::new(now));
//! world.insert_resource(SimulationConfig::default());
//! world.insert_resource(DepotOrigin(Point::new(0.0, 0.0)));
//! world.insert_resource(DeliveryIndex::default());
//! world.insert_resource(VehicleIndex::default());
//! world.insert_resource(Monitor::default());
//!
//! register_vehicle(&mut world, Vehicle::new(1, 10)).unwrap();
//! admit_delivery(&mut world, Delivery::new("d1", Point::new(0.0, 0.01), 1, 5, 30, now)).unwrap();
//!
//! let mut schedule = simulation_schedule();
//! let steps = run_until_empty(&mut world, &mut schedule, 1_000_000);
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod eval;
pub mod geo;
pub mod model;
pub mod monitor;
pub mod runner;
pub mod solver;
pub mod systems;

#[cfg(test)]
pub mod test_helpers;
