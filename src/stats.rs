//! Workout history analytics

use chrono::{DateTime, Utc};

use crate::exercises::ExerciseKind;
use crate::session::WorkoutSummary;

/// Aggregates over stored workout summaries
pub struct HistoryStats {
    workouts: Vec<WorkoutSummary>,
}

impl HistoryStats {
    pub fn new(workouts: Vec<WorkoutSummary>) -> Self {
        Self { workouts }
    }

    pub fn workouts(&self) -> usize {
        self.workouts.len()
    }

    pub fn total_calories(&self) -> f64 {
        self.workouts.iter().map(|w| w.total_calories).sum()
    }

    /// Total reps of one exercise across all workouts
    pub fn total_reps(&self, exercise: ExerciseKind) -> u32 {
        self.workouts.iter().map(|w| w.count(exercise)).sum()
    }

    /// Workouts per week over the span of the history
    pub fn weekly_frequency(&self) -> f64 {
        if self.workouts.len() < 2 {
            return 0.0;
        }

        let dates = self.workouts.iter().map(|w| w.date.date_naive());
        let (Some(first), Some(last)) = (dates.clone().min(), dates.max()) else {
            return 0.0;
        };
        let days = (last - first).num_days() as f64;

        if days == 0.0 {
            return self.workouts.len() as f64;
        }

        (self.workouts.len() as f64 / days) * 7.0
    }

    /// Most calories burned in one workout
    pub fn best_workout(&self) -> Option<&WorkoutSummary> {
        self.workouts
            .iter()
            .max_by(|a, b| a.total_calories.total_cmp(&b.total_calories))
    }

    pub fn average_duration_secs(&self) -> f64 {
        if self.workouts.is_empty() {
            return 0.0;
        }
        let total: u64 = self.workouts.iter().map(|w| w.total_duration_secs).sum();
        total as f64 / self.workouts.len() as f64
    }

    pub fn last_workout_date(&self) -> Option<DateTime<Utc>> {
        self.workouts.iter().map(|w| w.date).max()
    }
}
