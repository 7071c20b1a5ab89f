//! Aggregate dispatch metrics, the only observability surface besides logs.

use bevy_ecs::prelude::Resource;

#[derive(Debug, Clone, Copy, Default, Resource)]
pub struct Monitor {
    pub created: u64,
    pub completed: u64,
    pub cancelled: u64,
    pub late: u64,
    pub penalty: u64,
    pub route_time_minutes: f64,
}

impl Monitor {
    pub fn average_penalty_per_delivery(&self) -> f64 {
        if self.completed == 0 {
            0.0
        } else {
            self.penalty as f64 / self.completed as f64
        }
    }

    /// Formatted multi-line summary, printed by the CLI driver at the end of a run.
    pub fn summary(&self) -> String {
        format!(
            "--- dispatch monitor ---\n\
             created:            {}\n\
             completed:          {}\n\
             cancelled:          {}\n\
             late:               {}\n\
             total penalty:      {}\n\
             avg penalty/order:  {:.2}\n\
             total route time:  {:.2} min\n\
             ------------------------",
            self.created,
            self.completed,
            self.cancelled,
            self.late,
            self.penalty,
            self.average_penalty_per_delivery(),
            self.route_time_minutes,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_penalty_is_zero_with_no_completions() {
        let m = Monitor::default();
        assert_eq!(m.average_penalty_per_delivery(), 0.0);
    }

    #[test]
    fn average_penalty_divides_by_completed() {
        let m = Monitor {
            completed: 4,
            penalty: 200,
            ..Default::default()
        };
        assert_eq!(m.average_penalty_per_delivery(), 50.0);
    }
}
