use bevy_ecs::prelude::{Entity, Query, Res, ResMut};
use chrono::Duration;

use crate::clock::{EventSubject, EventType, SimulationClock};
use crate::config::SimulationConfig;
use crate::model::{Delivery, DeliveryIndex, DeliveryStatus, DepotOrigin, Vehicle, VehicleIndex, VehicleStatus};
use crate::monitor::Monitor;
use crate::solver::{Plan, Solver};

/// The orchestrator: gathers `READY` deliveries and `IDLE` vehicles,
/// classifies urgency, invokes the configured solver, applies the
/// Just-In-Time delay policy, and commits the resulting plans. Runs every
/// tick (unconditionally, unlike the event handlers above), since a routing
/// opportunity can open up independent of which event type just drained.
#[allow(clippy::too_many_arguments)]
pub fn routing_decision_system(
    mut clock: ResMut<SimulationClock>,
    config: Res<SimulationConfig>,
    depot: Res<DepotOrigin>,
    delivery_index: Res<DeliveryIndex>,
    vehicle_index: Res<VehicleIndex>,
    mut deliveries: Query<(Entity, &mut Delivery)>,
    mut vehicles: Query<(Entity, &mut Vehicle)>,
    mut monitor: ResMut<Monitor>,
) {
    let now = clock.now();

    let ready: Vec<Delivery> = deliveries
        .iter_mut()
        .filter(|(_, d)| d.status == DeliveryStatus::Ready)
        .map(|(_, d)| d.clone())
        .collect();
    let idle: Vec<Vehicle> = vehicles
        .iter_mut()
        .filter(|(_, v)| v.status == VehicleStatus::Idle)
        .map(|(_, v)| v.clone())
        .collect();

    if ready.is_empty() || idle.is_empty() {
        return;
    }

    let urgency_window = Duration::minutes(config.urgency_window_minutes);
    let urgent = ready.iter().filter(|d| d.deadline - now < urgency_window).count();
    let use_jit = !(ready.len() > config.urgent_ready_count_threshold || urgent > 0);

    let solver = Solver::from_choice(config.solver);
    let span = tracing::info_span!(
        "routing_decision",
        algorithm = %config.solver.describe(),
        eligible = ready.len(),
        idle_vehicles = idle.len(),
        use_jit,
    );
    let _enter = span.enter();

    let mut plans: std::collections::HashMap<u64, Plan> =
        solver.plan(&ready, &idle, depot.0, config.avg_speed_kmh, now);

    for plan in plans.values_mut() {
        if plan.stops.is_empty() {
            continue;
        }
        let min_slack = plan
            .stops
            .iter()
            .zip(plan.arrivals_minutes.iter())
            .map(|(stop, arrival)| {
                let deadline_minutes = (stop.deadline - now).num_seconds() as f64 / 60.0;
                deadline_minutes - arrival
            })
            .fold(f64::INFINITY, f64::min);
        let usable_delay = ((min_slack - config.dispatch_delay_buffer_minutes)
            * config.slack_usage_ratio)
            .max(0.0);
        if use_jit && usable_delay > 0.0 {
            plan.shift_by(usable_delay);
            tracing::debug!(vehicle_id = plan.vehicle_id, usable_delay, "JIT delay applied");
        }
    }

    for (vehicle_id, plan) in &plans {
        if plan.stops.is_empty() {
            continue;
        }
        let Some(&vehicle_entity) = vehicle_index.0.get(vehicle_id) else {
            tracing::warn!(vehicle_id, "routing decision referenced unknown vehicle, skipping");
            continue;
        };
        if let Ok((_, mut vehicle)) = vehicles.get_mut(vehicle_entity) {
            vehicle.status = VehicleStatus::OnRoute;
            vehicle.route_end_time = Some(plan.return_datetime());
            vehicle.current_route = plan.stops.iter().map(|d| d.id.clone()).collect();
        }
        clock.schedule(EventType::VehicleReturn, plan.return_datetime(), EventSubject::Vehicle(*vehicle_id));

        for (position, stop) in plan.stops.iter().enumerate() {
            let Some(&delivery_entity) = delivery_index.0.get(&stop.id) else {
                tracing::warn!(delivery_id = %stop.id, "routing decision referenced unknown delivery, skipping");
                continue;
            };
            if let Ok((_, mut delivery)) = deliveries.get_mut(delivery_entity) {
                delivery.status = DeliveryStatus::Dispatched;
                delivery.assigned_vehicle_id = Some(*vehicle_id);
            }
            clock.schedule(
                EventType::ExpectedDelivery,
                plan.arrival_datetime(position),
                EventSubject::Delivery(stop.id.clone()),
            );
        }

        monitor.penalty += plan.total_penalty;
        monitor.route_time_minutes += plan.total_route_time_minutes;
        tracing::info!(
            vehicle_id,
            stops = plan.stops.len(),
            total_penalty = plan.total_penalty,
            total_route_time_minutes = plan.total_route_time_minutes,
            "route committed"
        );
    }
}
