//! Pluggable solver interface: a tagged variant over the two-stage
//! (clustering → routing) family and the hybrid family, dispatched through a
//! uniform `plan` entry point the orchestrator calls without caring which
//! concrete algorithms are behind it.

mod brkga;
mod brkga_hybrid;
mod cheapest_insertion;
mod ckmeans;
mod greedy_clustering;
mod greedy_insertion_hybrid;
mod local_search;
mod manual;

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::config::{ClusteringAlgorithm, HybridAlgorithm, RoutingAlgorithm, SolverChoice};
use crate::model::{Delivery, Point, Vehicle};

/// The artifact returned by any routing or hybrid solver for one vehicle:
/// a visit order plus the §4.1 evaluation of that order.
#[derive(Debug, Clone)]
pub struct Plan {
    pub vehicle_id: u64,
    /// Deliveries on this route, indexed identically to `sequence`'s entries.
    pub stops: Vec<Delivery>,
    /// Visit order as indices into `stops`.
    pub sequence: Vec<usize>,
    /// The zero instant every *_minutes field below is relative to.
    pub reference_time: DateTime<Utc>,
    pub start_time_minutes: f64,
    pub arrivals_minutes: Vec<f64>,
    pub penalties: Vec<u64>,
    pub return_depot_minutes: f64,
    pub total_penalty: u64,
    pub total_route_time_minutes: f64,
}

impl Plan {
    pub fn start_datetime(&self) -> DateTime<Utc> {
        self.reference_time + chrono::Duration::seconds((self.start_time_minutes * 60.0) as i64)
    }

    pub fn return_datetime(&self) -> DateTime<Utc> {
        self.reference_time + chrono::Duration::seconds((self.return_depot_minutes * 60.0) as i64)
    }

    pub fn arrival_datetime(&self, position: usize) -> DateTime<Utc> {
        self.reference_time
            + chrono::Duration::seconds((self.arrivals_minutes[position] * 60.0) as i64)
    }

    /// Shifts `start_time_minutes`, `return_depot_minutes`, and every arrival
    /// by `delay_minutes`. Penalties are not recomputed here; callers that
    /// shift a plan are expected to have already verified the shift cannot
    /// increase lateness (the JIT policy only ever delays within slack).
    pub fn shift_by(&mut self, delay_minutes: f64) {
        self.start_time_minutes += delay_minutes;
        self.return_depot_minutes += delay_minutes;
        for arrival in &mut self.arrivals_minutes {
            *arrival += delay_minutes;
        }
    }
}

/// Produces `vehicle_id -> [Delivery]` groups under capacity.
pub trait ClusteringSolver: Send + Sync {
    fn plan_two_stage(
        &self,
        deliveries: &[Delivery],
        vehicles: &[Vehicle],
        depot: Point,
    ) -> HashMap<u64, Vec<Delivery>>;
}

/// Orders one vehicle's assigned deliveries into a `Plan`.
pub trait RoutingSolver: Send + Sync {
    fn plan_route(
        &self,
        group: &[Delivery],
        vehicle_id: u64,
        depot: Point,
        avg_speed_kmh: f64,
        reference_time: DateTime<Utc>,
    ) -> Option<Plan>;
}

/// Assigns and orders in one pass across the whole fleet.
pub trait HybridSolver: Send + Sync {
    fn plan_hybrid(
        &self,
        deliveries: &[Delivery],
        vehicles: &[Vehicle],
        depot: Point,
        avg_speed_kmh: f64,
        reference_time: DateTime<Utc>,
    ) -> HashMap<u64, Plan>;
}

pub enum Solver {
    TwoStage {
        clustering: Box<dyn ClusteringSolver>,
        routing: Box<dyn RoutingSolver>,
    },
    Hybrid(Box<dyn HybridSolver>),
}

impl Solver {
    /// Maps a `SolverChoice` configuration to a concrete solver instance.
    pub fn from_choice(choice: SolverChoice) -> Self {
        match choice {
            SolverChoice::TwoStage { clustering, routing } => Solver::TwoStage {
                clustering: clustering_solver(clustering),
                routing: routing_solver(routing),
            },
            SolverChoice::Hybrid(algo) => Solver::Hybrid(hybrid_solver(algo)),
        }
    }

    /// Runs the configured solver family end to end, returning one `Plan`
    /// per vehicle that received at least one delivery.
    pub fn plan(
        &self,
        deliveries: &[Delivery],
        vehicles: &[Vehicle],
        depot: Point,
        avg_speed_kmh: f64,
        reference_time: DateTime<Utc>,
    ) -> HashMap<u64, Plan> {
        match self {
            Solver::TwoStage { clustering, routing } => {
                let groups = clustering.plan_two_stage(deliveries, vehicles, depot);
                groups
                    .into_iter()
                    .filter_map(|(vehicle_id, group)| {
                        if group.is_empty() {
                            return None;
                        }
                        routing
                            .plan_route(&group, vehicle_id, depot, avg_speed_kmh, reference_time)
                            .map(|plan| (vehicle_id, plan))
                    })
                    .collect()
            }
            Solver::Hybrid(hybrid) => {
                hybrid.plan_hybrid(deliveries, vehicles, depot, avg_speed_kmh, reference_time)
            }
        }
    }
}

fn clustering_solver(algo: ClusteringAlgorithm) -> Box<dyn ClusteringSolver> {
    match algo {
        ClusteringAlgorithm::Ckmeans => Box::new(ckmeans::CapacitatedKMeans::default()),
        ClusteringAlgorithm::Greedy => Box::new(greedy_clustering::GreedyClustering),
    }
}

fn routing_solver(algo: RoutingAlgorithm) -> Box<dyn RoutingSolver> {
    match algo {
        RoutingAlgorithm::Brkga => Box::new(brkga::BrkgaRouting::default()),
        RoutingAlgorithm::Greedy => Box::new(cheapest_insertion::CheapestInsertion),
    }
}

fn hybrid_solver(algo: HybridAlgorithm) -> Box<dyn HybridSolver> {
    match algo {
        HybridAlgorithm::GreedyInsertion => {
            Box::new(greedy_insertion_hybrid::GreedyInsertionHybrid)
        }
        HybridAlgorithm::BrkgaHybrid => Box::new(brkga_hybrid::BrkgaHybrid::default()),
        HybridAlgorithm::Manual => Box::new(manual::ManualAssignment::default()),
    }
}

/// Shared helper: builds a `Plan` for `vehicle_id` from an already-decided
/// visit order, calling the §4.1 evaluator for consistency. Returns `None`
/// for an empty group (callers should already have filtered these out).
pub(crate) fn build_plan(
    vehicle_id: u64,
    group: &[Delivery],
    depot: Point,
    avg_speed_kmh: f64,
    reference_time: DateTime<Utc>,
    order: &[usize],
) -> Option<Plan> {
    if order.is_empty() {
        return None;
    }
    let points: Vec<Point> = group.iter().map(|d| d.point).collect();
    let matrix = crate::geo::TravelTimeMatrix::with_depot(depot, &points, avg_speed_kmh);
    // matrix index i+1 corresponds to group[i]; ready/deadline are expressed
    // as minutes relative to `reference_time`.
    let ready_minutes: Vec<f64> = std::iter::once(0.0)
        .chain(group.iter().map(|d| {
            (d.ready_at - reference_time).num_seconds() as f64 / 60.0
        }))
        .collect();
    let deadline_minutes: Vec<f64> = std::iter::once(0.0)
        .chain(group.iter().map(|d| {
            (d.deadline - reference_time).num_seconds() as f64 / 60.0
        }))
        .collect();

    let matrix_order: Vec<usize> = order.iter().map(|&i| i + 1).collect();
    let eval = crate::eval::evaluate_sequence(
        &matrix_order,
        &matrix,
        &ready_minutes,
        &deadline_minutes,
        None,
    );

    let last = *matrix_order.last().unwrap();
    let return_depot_minutes =
        eval.start_time_minutes + eval.total_route_time_minutes;
    debug_assert!((return_depot_minutes
        - (eval.arrivals_minutes.last().unwrap() + matrix.time(last, matrix.depot_index())))
    .abs()
        < 1e-6);

    let stops: Vec<Delivery> = order.iter().map(|&i| group[i].clone()).collect();

    Some(Plan {
        vehicle_id,
        stops,
        sequence: (0..order.len()).collect(),
        reference_time,
        start_time_minutes: eval.start_time_minutes,
        arrivals_minutes: eval.arrivals_minutes,
        penalties: eval.penalties,
        return_depot_minutes,
        total_penalty: eval.total_penalty,
        total_route_time_minutes: eval.total_route_time_minutes,
    })
}

/// Evaluates `group` in its given (already-ordered) sequence, returning just
/// the fitness pair. Used by the fleet-wide hybrid solvers, which care about
/// cost at each candidate insertion far more often than the resulting `Plan`.
pub(crate) fn evaluate_group(
    group: &[Delivery],
    depot: Point,
    avg_speed_kmh: f64,
    reference_time: DateTime<Utc>,
) -> Option<(u64, f64)> {
    let order: Vec<usize> = (0..group.len()).collect();
    build_plan(0, group, depot, avg_speed_kmh, reference_time, &order)
        .map(|plan| (plan.total_penalty, plan.total_route_time_minutes))
}
