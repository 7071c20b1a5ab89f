//! Post-BRKGA local search (§4.3): 2-opt, Or-opt (block sizes 1..3), and
//! relocate passes, each iterated until a full sweep yields no lexicographic
//! improvement over §4.1's `(total_penalty, total_route_time)` fitness.

use std::cmp::Ordering;

use crate::eval::{compare_fitness, evaluate_sequence, RouteEvaluation};
use crate::geo::TravelTimeMatrix;

fn fitness(
    seq: &[usize],
    matrix: &TravelTimeMatrix,
    ready: &[f64],
    deadline: &[f64],
) -> RouteEvaluation {
    evaluate_sequence(seq, matrix, ready, deadline, None)
}

fn better(a: &RouteEvaluation, b: &RouteEvaluation) -> bool {
    compare_fitness(a, b) == Ordering::Less
}

/// One full 2-opt sweep: try every segment reversal, keep the first
/// improving move found and restart the sweep (first-improvement strategy).
/// Returns `true` if `seq` was modified.
fn two_opt_pass(
    seq: &mut Vec<usize>,
    matrix: &TravelTimeMatrix,
    ready: &[f64],
    deadline: &[f64],
) -> bool {
    let current = fitness(seq, matrix, ready, deadline);
    for i in 0..seq.len() {
        for j in (i + 1)..seq.len() {
            let mut candidate = seq.clone();
            candidate[i..=j].reverse();
            let candidate_fit = fitness(&candidate, matrix, ready, deadline);
            if better(&candidate_fit, &current) {
                *seq = candidate;
                return true;
            }
        }
    }
    false
}

/// One Or-opt sweep for a fixed block size: relocate a contiguous block of
/// `block_size` stops to every other position, keep the first improving move.
fn or_opt_pass(
    seq: &mut Vec<usize>,
    block_size: usize,
    matrix: &TravelTimeMatrix,
    ready: &[f64],
    deadline: &[f64],
) -> bool {
    if seq.len() <= block_size {
        return false;
    }
    let current = fitness(seq, matrix, ready, deadline);
    for start in 0..=(seq.len() - block_size) {
        let block: Vec<usize> = seq[start..start + block_size].to_vec();
        let mut rest = seq.clone();
        rest.drain(start..start + block_size);
        for insert_at in 0..=rest.len() {
            let mut candidate = rest.clone();
            for (offset, &node) in block.iter().enumerate() {
                candidate.insert(insert_at + offset, node);
            }
            if candidate == *seq {
                continue;
            }
            let candidate_fit = fitness(&candidate, matrix, ready, deadline);
            if better(&candidate_fit, &current) {
                *seq = candidate;
                return true;
            }
        }
    }
    false
}

/// Relocate pass: moves a single stop to a different position (distinct from
/// Or-opt's block moves only in that it always considers block size 1 even
/// when `or_opt_pass` for size 1 has already converged, giving the search one
/// more escape route before declaring the sweep dry).
fn relocate_pass(
    seq: &mut Vec<usize>,
    matrix: &TravelTimeMatrix,
    ready: &[f64],
    deadline: &[f64],
) -> bool {
    or_opt_pass(seq, 1, matrix, ready, deadline)
}

/// Runs 2-opt, then Or-opt(1..3), then relocate, repeating the whole cycle
/// until none of them improve the sequence in a full sweep.
pub fn improve(
    seq: &[usize],
    matrix: &TravelTimeMatrix,
    ready: &[f64],
    deadline: &[f64],
) -> Vec<usize> {
    let mut seq = seq.to_vec();
    loop {
        let mut improved = false;
        improved |= two_opt_pass(&mut seq, matrix, ready, deadline);
        for block_size in 1..=3 {
            improved |= or_opt_pass(&mut seq, block_size, matrix, ready, deadline);
        }
        improved |= relocate_pass(&mut seq, matrix, ready, deadline);
        if !improved {
            break;
        }
    }
    seq
}
