//! BRKGA routing (§4.3): a real-valued chromosome per delivery, decoded by
//! sorting into a visit order, evaluated by §4.1, improved by local search.

use chrono::{DateTime, Utc};
use rand::prelude::*;

use super::{build_plan, local_search, Plan, RoutingSolver};
use crate::eval::{compare_fitness, evaluate_sequence};
use crate::geo::TravelTimeMatrix;
use crate::model::{Delivery, Point};

pub struct BrkgaRouting {
    pub population_size: usize,
    pub elite_fraction: f64,
    pub mutant_fraction: f64,
    pub elite_bias: f64,
    pub max_generations: usize,
    pub no_improve_limit: usize,
    pub seed: u64,
}

impl Default for BrkgaRouting {
    fn default() -> Self {
        Self {
            population_size: 60,
            elite_fraction: 0.2,
            mutant_fraction: 0.1,
            elite_bias: 0.7,
            max_generations: 200,
            no_improve_limit: 40,
            seed: 0,
        }
    }
}

fn decode(chromosome: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..chromosome.len()).collect();
    order.sort_by(|&a, &b| chromosome[a].partial_cmp(&chromosome[b]).unwrap());
    order
}

impl BrkgaRouting {
    /// Runs the GA over `n` genes, returning the best 0-based order found.
    fn run(
        &self,
        n: usize,
        matrix: &TravelTimeMatrix,
        ready: &[f64],
        deadline: &[f64],
    ) -> Vec<usize> {
        if n <= 1 {
            return (0..n).collect();
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        let elite_count = ((self.population_size as f64) * self.elite_fraction).ceil() as usize;
        let mutant_count = ((self.population_size as f64) * self.mutant_fraction).ceil() as usize;

        let random_chromosome = |rng: &mut StdRng| -> Vec<f64> {
            (0..n).map(|_| rng.gen::<f64>()).collect()
        };

        let mut population: Vec<Vec<f64>> =
            (0..self.population_size).map(|_| random_chromosome(&mut rng)).collect();

        let matrix_order = |chromosome: &[f64]| -> Vec<usize> {
            decode(chromosome).iter().map(|&i| i + 1).collect()
        };

        let mut best_order = matrix_order(&population[0]);
        let mut best_fit = evaluate_sequence(&best_order, matrix, ready, deadline, None);
        let mut generations_without_improvement = 0usize;

        for _ in 0..self.max_generations {
            population.sort_by(|a, b| {
                let fa = evaluate_sequence(&matrix_order(a), matrix, ready, deadline, None);
                let fb = evaluate_sequence(&matrix_order(b), matrix, ready, deadline, None);
                compare_fitness(&fa, &fb)
            });

            let top_fit = evaluate_sequence(&matrix_order(&population[0]), matrix, ready, deadline, None);
            if compare_fitness(&top_fit, &best_fit) == std::cmp::Ordering::Less {
                best_fit = top_fit;
                best_order = matrix_order(&population[0]);
                generations_without_improvement = 0;
            } else {
                generations_without_improvement += 1;
            }
            if generations_without_improvement >= self.no_improve_limit {
                break;
            }

            let elite: Vec<Vec<f64>> = population[..elite_count].to_vec();
            let non_elite: Vec<Vec<f64>> = population[elite_count..].to_vec();

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

        local_search::improve(&best_order, matrix, ready, deadline)
    }
}

impl RoutingSolver for BrkgaRouting {
    fn plan_route(
        &self,
        group: &[Delivery],
        vehicle_id: u64,
        depot: Point,
        avg_speed_kmh: f64,
        reference_time: DateTime<Utc>,
    ) -> Option<Plan> {
        if group.is_empty() {
            return None;
        }
        let points: Vec<Point> = group.iter().map(|d| d.point).collect();
        let matrix = TravelTimeMatrix::with_depot(depot, &points, avg_speed_kmh);
        let ready_minutes: Vec<f64> = std::iter::once(0.0)
            .chain(group.iter().map(|d| (d.ready_at - reference_time).num_seconds() as f64 / 60.0))
            .collect();
        let deadline_minutes: Vec<f64> = std::iter::once(0.0)
            .chain(group.iter().map(|d| (d.deadline - reference_time).num_seconds() as f64 / 60.0))
            .collect();

        let matrix_order = self.run(group.len(), &matrix, &ready_minutes, &deadline_minutes);
        let order: Vec<usize> = matrix_order.iter().map(|&i| i - 1).collect();
        build_plan(vehicle_id, group, depot, avg_speed_kmh, reference_time, &order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeliveryStatus;
    use chrono::Utc;

    fn delivery(id: &str, lng: f64, lat: f64) -> Delivery {
        let now = Utc::now();
        Delivery {
            id: id.to_string(),
            point: Point::new(lng, lat),
            size: 1,
            preparation_minutes: 5,
            time_minutes: 60,
            created_at: now,
            ready_at: now,
            deadline: now + chrono::Duration::minutes(60),
            status: DeliveryStatus::Ready,
            assigned_vehicle_id: None,
            marked_late: false,
        }
    }

    #[test]
    fn produces_a_valid_permutation_plan() {
        let group = vec![
            delivery("a", 0.0, 0.01),
            delivery("b", 0.01, 0.0),
            delivery("c", 0.02, 0.02),
        ];
        let solver = BrkgaRouting {
            population_size: 10,
            max_generations: 5,
            no_improve_limit: 5,
            ..Default::default()
        };
        let plan = solver
            .plan_route(&group, 1, Point::new(0.0, 0.0), 50.0, Utc::now())
            .expect("plan");
        let mut ids: Vec<&str> = plan.stops.iter().map(|d| d.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(plan.sequence.len(), 3);
    }
}
