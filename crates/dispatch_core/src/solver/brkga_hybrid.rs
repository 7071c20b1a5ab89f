//! BRKGA hybrid (§4.4): a priority chromosome over deliveries, decoded by
//! sorting and then inserting each delivery fleet-wide at its cheapest
//! feasible (vehicle, position); fitness is the resulting fleet-wide
//! `(total_penalty, total_route_time)`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::prelude::*;

use super::{build_plan, evaluate_group, HybridSolver, Plan};
use crate::model::{Delivery, Point, Vehicle};

pub struct BrkgaHybrid {
    pub population_size: usize,
    pub elite_fraction: f64,
    pub mutant_fraction: f64,
    pub elite_bias: f64,
    pub max_generations: usize,
    pub no_improve_limit: usize,
    pub unassigned_penalty: u64,
    pub seed: u64,
}

impl Default for BrkgaHybrid {
    fn default() -> Self {
        Self {
            population_size: 50,
            elite_fraction: 0.3,
            mutant_fraction: 0.15,
            elite_bias: 0.7,
            max_generations: 70,
            no_improve_limit: 15,
            unassigned_penalty: 100_000,
            seed: 0,
        }
    }
}

/// Decodes a chromosome into per-vehicle delivery routes, in insertion
/// order, by repeated fleet-wide cheapest insertion.
fn decode(
    chromosome: &[f64],
    deliveries: &[Delivery],
    vehicles: &[Vehicle],
    depot: Point,
    avg_speed_kmh: f64,
    reference_time: DateTime<Utc>,
    unassigned_penalty: u64,
) -> (HashMap<u64, Vec<Delivery>>, u64, f64) {
    let mut priority: Vec<usize> = (0..deliveries.len()).collect();
    priority.sort_by(|&a, &b| chromosome[a].partial_cmp(&chromosome[b]).unwrap());

    let mut routes: HashMap<u64, Vec<Delivery>> =
        vehicles.iter().map(|v| (v.id, Vec::new())).collect();
    let mut loads: HashMap<u64, u32> = vehicles.iter().map(|v| (v.id, 0)).collect();
    let mut unassigned_count = 0u64;

    for &index in &priority {
        let delivery = &deliveries[index];
        let mut best: Option<(u64, usize, f64)> = None;

        for vehicle in vehicles {
            if loads[&vehicle.id] + delivery.size > vehicle.capacity {
                continue;
            }
            let route = &routes[&vehicle.id];
            for position in 0..=route.len() {
                let mut candidate = route.clone();
                candidate.insert(position, delivery.clone());
                let Some((penalty, route_time)) =
                    evaluate_group(&candidate, depot, avg_speed_kmh, reference_time)
                else {
                    continue;
                };
                let cost = 1000.0 * penalty as f64 + route_time;
                if best.map(|(_, _, bc)| cost < bc).unwrap_or(true) {
                    best = Some((vehicle.id, position, cost));
                }
            }
        }

        match best {
            Some((vehicle_id, position, _)) => {
                *loads.get_mut(&vehicle_id).unwrap() += delivery.size;
                routes.get_mut(&vehicle_id).unwrap().insert(position, delivery.clone());
            }
            None => unassigned_count += 1,
        }
    }

    let mut total_penalty = unassigned_count * unassigned_penalty;
    let mut total_route_time = 0.0;
    for route in routes.values() {
        if route.is_empty() {
            continue;
        }
        if let Some((penalty, route_time)) =
            evaluate_group(route, depot, avg_speed_kmh, reference_time)
        {
            total_penalty += penalty;
            total_route_time += route_time;
        }
    }

    (routes, total_penalty, total_route_time)
}

impl HybridSolver for BrkgaHybrid {
    fn plan_hybrid(
        &self,
        deliveries: &[Delivery],
        vehicles: &[Vehicle],
        depot: Point,
        avg_speed_kmh: f64,
        reference_time: DateTime<Utc>,
    ) -> HashMap<u64, Plan> {
        if deliveries.is_empty() || vehicles.is_empty() {
            return HashMap::new();
        }

        let n = deliveries.len();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let elite_count = ((self.population_size as f64) * self.elite_fraction).ceil() as usize;
        let mutant_count = ((self.population_size as f64) * self.mutant_fraction).ceil() as usize;

        let random_chromosome = |rng: &mut StdRng| -> Vec<f64> { (0..n).map(|_| rng.gen::<f64>()).collect() };
        let mut population: Vec<Vec<f64>> =
            (0..self.population_size).map(|_| random_chromosome(&mut rng)).collect();

        let mut best_routes = HashMap::new();
        let mut best_fit = (u64::MAX, f64::MAX);
        let mut generations_without_improvement = 0usize;

        for _ in 0..self.max_generations {
            let mut scored: Vec<(Vec<f64>, u64, f64, HashMap<u64, Vec<Delivery>>)> = population
                .iter()
                .map(|chromosome| {
                    let (routes, penalty, route_time) = decode(
                        chromosome,
                        deliveries,
                        vehicles,
                        depot,
                        avg_speed_kmh,
                        reference_time,
                        self.unassigned_penalty,
                    );
                    (chromosome.clone(), penalty, route_time, routes)
                })
                .collect();
            scored.sort_by(|a, b| a.1.cmp(&b.1).then(a.2.partial_cmp(&b.2).unwrap()));

            let (_, top_penalty, top_route_time, top_routes) = scored[0].clone();
            if (top_penalty, top_route_time) < best_fit {
                best_fit = (top_penalty, top_route_time);
                best_routes = top_routes;
                generations_without_improvement = 0;
            } else {
                generations_without_improvement += 1;
            }
            if generations_without_improvement >= self.no_improve_limit {
                break;
            }

            let elite: Vec<Vec<f64>> = scored[..elite_count].iter().map(|s| s.0.clone()).collect();
            let non_elite: Vec<Vec<f64>> = scored[elite_count..].iter().map(|s| s.0.clone()).collect();

            let mut next_gen = elite.clone();
            for _ in 0..mutant_count {
                next_gen.push(random_chromosome(&mut rng));
            }
            while next_gen.len() < self.population_size {
                let elite_parent = &elite[rng.gen_range(0..elite.len())];
                let other_parent = if non_elite.is_empty() {
                    elite_parent
                } else {
                    &non_elite[rng.gen_range(0..non_elite.len())]
                };
                let child: Vec<f64> = (0..n)
                    .map(|g| {
                        if rng.gen::<f64>() < self.elite_bias {
                            elite_parent[g]
                        } else {
                            other_parent[g]
                        }
                    })
                    .collect();
                next_gen.push(child);
            }
            population = next_gen;
        }

        best_routes
            .into_iter()
            .filter_map(|(vehicle_id, route)| {
                if route.is_empty() {
                    return None;
                }
                let order: Vec<usize> = (0..route.len()).collect();
                build_plan(vehicle_id, &route, depot, avg_speed_kmh, reference_time, &order)
                    .map(|plan| (vehicle_id, plan))
            })
            .collect()
    }
}
