//! Dispatch tuning parameters and the solver-selection configuration.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusteringAlgorithm {
    #[serde(rename = "ckmeans")]
    Ckmeans,
    #[serde(rename = "greedy_clustering")]
    Greedy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingAlgorithm {
    #[serde(rename = "brkga")]
    Brkga,
    #[serde(rename = "greedy_routing")]
    Greedy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HybridAlgorithm {
    #[serde(rename = "greedy_insertion")]
    GreedyInsertion,
    #[serde(rename = "brkga_hybrid")]
    BrkgaHybrid,
    #[serde(rename = "manual")]
    Manual,
}

impl ClusteringAlgorithm {
    pub fn token(&self) -> &'static str {
        match self {
            Self::Ckmeans => "ckmeans",
            Self::Greedy => "greedy_clustering",
        }
    }
}

impl RoutingAlgorithm {
    pub fn token(&self) -> &'static str {
        match self {
            Self::Brkga => "brkga",
            Self::Greedy => "greedy_routing",
        }
    }
}

impl HybridAlgorithm {
    pub fn token(&self) -> &'static str {
        match self {
            Self::GreedyInsertion => "greedy_insertion",
            Self::BrkgaHybrid => "brkga_hybrid",
            Self::Manual => "manual",
        }
    }
}

/// Either a two-stage `(clustering, routing)` pair or a hybrid algorithm;
/// exactly one branch is populated, enforced by `SolverChoice`.
#[derive(Debug, Clone, Copy)]
pub enum SolverChoice {
    TwoStage {
        clustering: ClusteringAlgorithm,
        routing: RoutingAlgorithm,
    },
    Hybrid(HybridAlgorithm),
}

impl SolverChoice {
    /// Human-readable label for logs, e.g. "CLUSTERING with ckmeans | ROUTING with brkga".
    pub fn describe(&self) -> String {
        match self {
            Self::TwoStage { clustering, routing } => format!(
                "CLUSTERING with {} | ROUTING with {}",
                clustering.token(),
                routing.token()
            ),
            Self::Hybrid(algo) => format!("HYBRID with {}", algo.token()),
        }
    }
}

impl Default for SolverChoice {
    fn default() -> Self {
        Self::TwoStage {
            clustering: ClusteringAlgorithm::Greedy,
            routing: RoutingAlgorithm::Greedy,
        }
    }
}

/// Tunables for the routing-decision orchestrator (§4.6). Inserted as a
/// resource so systems can read it without threading it through call sites.
#[derive(Debug, Clone, Copy, Resource)]
pub struct SimulationConfig {
    pub solver: SolverChoice,
    pub avg_speed_kmh: f64,
    pub dispatch_delay_buffer_minutes: f64,
    pub slack_usage_ratio: f64,
    pub urgency_window_minutes: i64,
    pub urgent_ready_count_threshold: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            solver: SolverChoice::default(),
            avg_speed_kmh: 50.0,
            dispatch_delay_buffer_minutes: 5.0,
            slack_usage_ratio: 0.5,
            urgency_window_minutes: 10,
            urgent_ready_count_threshold: 5,
        }
    }
}
