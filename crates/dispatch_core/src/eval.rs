//! Route evaluator: the single cost function every solver and the JIT policy
//! must call, so that costs are consistent crate-wide (§8 property 5).

use crate::geo::TravelTimeMatrix;

/// Result of evaluating one visit sequence against a travel-time matrix.
/// All times are minutes relative to the same zero reference the caller used
/// to build `ready_minutes`/`deadline_minutes`.
#[derive(Debug, Clone)]
pub struct RouteEvaluation {
    pub start_time_minutes: f64,
    /// Arrival time at each position of `seq`, same order and length.
    pub arrivals_minutes: Vec<f64>,
    /// Lateness penalty at each position of `seq`.
    pub penalties: Vec<u64>,
    pub total_penalty: u64,
    pub total_route_time_minutes: f64,
}

/// `ceil(max(0, arrival - deadline) / 5) * 100`, the 5-minute-block penalty.
fn late_penalty(arrival: f64, deadline: f64) -> u64 {
    let lateness = (arrival - deadline).max(0.0);
    if lateness <= 0.0 {
        return 0;
    }
    ((lateness / 5.0).ceil() as u64) * 100
}

/// Evaluates `seq` (indices into `matrix`, excluding the depot) given
/// per-index ready/deadline instants (indexed the same way as `matrix`) and
/// optional per-index service time (defaults to 0 for every stop).
///
/// Panics if `seq` is empty — callers are expected to skip empty routes
/// before reaching the evaluator.
pub fn evaluate_sequence(
    seq: &[usize],
    matrix: &TravelTimeMatrix,
    ready_minutes: &[f64],
    deadline_minutes: &[f64],
    service_minutes: Option<&[f64]>,
) -> RouteEvaluation {
    assert!(!seq.is_empty(), "evaluate_sequence requires a non-empty sequence");
    let depot = matrix.depot_index();
    let service = |idx: usize| service_minutes.map(|s| s[idx]).unwrap_or(0.0);

    let start_time_minutes = seq
        .iter()
        .map(|&i| ready_minutes[i])
        .fold(f64::MIN, f64::max);

    let mut arrivals_minutes = Vec::with_capacity(seq.len());
    let mut penalties = Vec::with_capacity(seq.len());
    let mut total_penalty = 0u64;

    let mut prev_arrival = start_time_minutes;
    for (k, &stop) in seq.iter().enumerate() {
        let arrival = if k == 0 {
            start_time_minutes + matrix.time(depot, stop)
        } else {
            let prev = seq[k - 1];
            prev_arrival + service(prev) + matrix.time(prev, stop)
        };
        let penalty = late_penalty(arrival, deadline_minutes[stop]);
        total_penalty += penalty;
        arrivals_minutes.push(arrival);
        penalties.push(penalty);
        prev_arrival = arrival;
    }

    let last = *seq.last().unwrap();
    let last_arrival = *arrivals_minutes.last().unwrap();
    let return_time = last_arrival + service(last) + matrix.time(last, depot);
    let total_route_time_minutes = return_time - start_time_minutes;

    RouteEvaluation {
        start_time_minutes,
        arrivals_minutes,
        penalties,
        total_penalty,
        total_route_time_minutes,
    }
}

/// Lexicographic fitness every solver optimizes against: lower is better,
/// compared by `total_penalty` first, `total_route_time_minutes` as tie-break.
/// Returns `Less` if `a` is strictly better than `b`.
pub fn compare_fitness(a: &RouteEvaluation, b: &RouteEvaluation) -> std::cmp::Ordering {
    a.total_penalty
        .cmp(&b.total_penalty)
        .then_with(|| {
            a.total_route_time_minutes
                .partial_cmp(&b.total_route_time_minutes)
                .expect("route time is never NaN")
        })
}
