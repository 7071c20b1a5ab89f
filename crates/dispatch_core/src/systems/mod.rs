//! ECS systems: event-driven logic that reacts to the dispatch core's scheduled events.
//!
//! Each system reacts to the `CurrentEvent` resource the runner inserts before
//! running the schedule, handling one event type:
//!
//! - **order_created / order_ready / pickup_deadline / expected_delivery**:
//!   delivery lifecycle transitions
//! - **vehicle_return**: vehicle returns to depot and goes idle
//! - **routing_decision**: the orchestrator — gathers eligible deliveries and
//!   idle vehicles, invokes the configured solver, applies the JIT policy,
//!   and commits routes
//!
//! `admission` holds the two entry points external callers (the adapter, the
//! CLI driver) use to mutate the world outside the event-driven flow:
//! registering a vehicle and admitting a new delivery.

pub mod admission;
pub mod expected_delivery;
pub mod order_created;
pub mod order_ready;
pub mod pickup_deadline;
pub mod routing_decision;
pub mod vehicle_return;

pub use admission::{admit_delivery, register_vehicle};
pub use expected_delivery::expected_delivery_system;
pub use order_created::order_created_system;
pub use order_ready::order_ready_system;
pub use pickup_deadline::pickup_deadline_system;
pub use routing_decision::routing_decision_system;
pub use vehicle_return::vehicle_return_system;
