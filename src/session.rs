//! Session orchestrator - walks a workout plan exercise by exercise

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::classifier::ClassifierBank;
use crate::counter::{Position, RepCounts, Step};
use crate::exercises::{ExerciseKind, PlanEntry, WorkoutPlan};
use crate::pose::PoseSnapshot;

/// Where the session is in its plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "index", rename_all = "snake_case")]
pub enum Phase {
    Idle,
    InExercise(usize),
    Completed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::InExercise(i) => write!(f, "in exercise {}", i),
            Phase::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot {action} while {phase}")]
    InvalidTransition { action: &'static str, phase: Phase },
    #[error("workout plan is empty")]
    EmptyPlan,
}

/// Reps of one exercise in a finished workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseTally {
    pub exercise: ExerciseKind,
    pub count: u32,
}

/// Record of one completed workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    pub date: DateTime<Utc>,
    pub total_calories: f64,
    pub total_duration_secs: u64,
    pub exercises: Vec<ExerciseTally>,
}

impl WorkoutSummary {
    pub fn count(&self, exercise: ExerciseKind) -> u32 {
        self.exercises
            .iter()
            .filter(|t| t.exercise == exercise)
            .map(|t| t.count)
            .sum()
    }

    pub fn total_reps(&self) -> u32 {
        self.exercises.iter().map(|t| t.count).sum()
    }
}

/// Σ count × calories-per-rep
pub fn total_calories(tallies: &[ExerciseTally]) -> f64 {
    tallies
        .iter()
        .map(|t| t.count as f64 * t.exercise.definition().calories_per_rep)
        .sum()
}

/// Outcome of a successful `advance()`
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// Moved on to the plan entry at this index
    Next(usize),
    Completed(WorkoutSummary),
}

/// A frame that reached the active classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOutcome {
    pub exercise: ExerciseKind,
    pub step: Step,
    /// Total reps of this exercise after the frame
    pub count: u32,
}

/// Read-only view for the UI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub exercise: Option<ExerciseKind>,
    pub position: Option<Position>,
    pub target_reps: Option<u32>,
    pub reps_this_exercise: u32,
    pub rep_counts: Vec<(ExerciseKind, u32)>,
    pub exercise_timer_secs: u64,
    pub exercise_secs: Vec<u64>,
    pub total_timer_secs: u64,
    pub advance_available: bool,
    pub started_at: Option<DateTime<Utc>>,
}

pub struct Session {
    plan: WorkoutPlan,
    phase: Phase,
    classifiers: ClassifierBank,
    counts: RepCounts,
    /// Count of the active exercise when its plan entry was entered
    entry_baseline: u32,
    exercise_secs: Vec<u64>,
    timer_secs: u64,
    total_timer_secs: u64,
    started_at: Option<DateTime<Utc>>,
    last_summary: Option<WorkoutSummary>,
}

impl Session {
    pub fn new(plan: WorkoutPlan) -> Self {
        let len = plan.len();
        Self {
            plan,
            phase: Phase::Idle,
            classifiers: ClassifierBank::default(),
            counts: RepCounts::new(),
            entry_baseline: 0,
            exercise_secs: vec![0; len],
            timer_secs: 0,
            total_timer_secs: 0,
            started_at: None,
            last_summary: None,
        }
    }

    pub fn plan(&self) -> &WorkoutPlan {
        &self.plan
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn counts(&self) -> &RepCounts {
        &self.counts
    }

    pub fn classifiers(&self) -> &ClassifierBank {
        &self.classifiers
    }

    pub fn last_summary(&self) -> Option<&WorkoutSummary> {
        self.last_summary.as_ref()
    }

    pub fn current_entry(&self) -> Option<&PlanEntry> {
        match self.phase {
            Phase::InExercise(i) => self.plan.get(i),
            _ => None,
        }
    }

    pub fn current_exercise(&self) -> Option<ExerciseKind> {
        self.current_entry().map(|e| e.exercise)
    }

    pub fn current_position(&self) -> Option<Position> {
        self.current_exercise().map(|k| self.classifiers.get(k).position())
    }

    pub fn timer_secs(&self) -> u64 {
        self.timer_secs
    }

    /// Reps gained since the active plan entry was entered
    pub fn reps_this_exercise(&self) -> u32 {
        self.current_exercise()
            .map(|k| self.counts.get(k).saturating_sub(self.entry_baseline))
            .unwrap_or(0)
    }

    /// Target for the active entry reached; the caller may `advance()`
    pub fn advance_available(&self) -> bool {
        self.current_entry()
            .is_some_and(|e| self.reps_this_exercise() >= e.target_reps)
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.phase != Phase::Idle {
            return Err(SessionError::InvalidTransition { action: "start", phase: self.phase });
        }
        if self.plan.is_empty() {
            return Err(SessionError::EmptyPlan);
        }

        self.clear();
        self.started_at = Some(Utc::now());
        self.enter(0);
        info!("Workout started: {} exercises", self.plan.len());
        Ok(())
    }

    /// Route one frame to the active classifier
    pub fn on_frame(&mut self, pose: &PoseSnapshot) -> Option<FrameOutcome> {
        let kind = self.current_exercise()?;
        let step = self.classifiers.get_mut(kind).update(pose)?;

        let count = match step {
            Step::Counted(_) => {
                let count = self.counts.record(kind);
                info!("{}: rep {}", kind.name(), count);
                count
            }
            Step::Moved(position) => {
                debug!("{}: {} position", kind.name(), position.as_str());
                self.counts.get(kind)
            }
            Step::Unchanged => self.counts.get(kind),
        };
        Some(FrameOutcome { exercise: kind, step, count })
    }

    /// One second of the per-exercise timer
    pub fn tick(&mut self) {
        if let Phase::InExercise(_) = self.phase {
            self.timer_secs += 1;
            self.total_timer_secs += 1;
        }
    }

    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        let Phase::InExercise(index) = self.phase else {
            return Err(SessionError::InvalidTransition { action: "advance", phase: self.phase });
        };

        self.exercise_secs[index] = self.timer_secs;
        if !self.advance_available() {
            info!("Skipping {} before reaching its target", self.plan.entries()[index].exercise.name());
        }

        let next = index + 1;
        if next < self.plan.len() {
            self.enter(next);
            return Ok(Advance::Next(next));
        }

        let summary = self.summarize();
        info!(
            "Workout completed: {} reps, {:.1} kcal, {}s",
            summary.total_reps(),
            summary.total_calories,
            summary.total_duration_secs
        );
        self.clear();
        self.phase = Phase::Completed;
        self.last_summary = Some(summary.clone());
        Ok(Advance::Completed(summary))
    }

    /// Completed back to Idle, ready for another `start()`
    pub fn reset(&mut self) -> Result<(), SessionError> {
        if self.phase != Phase::Completed {
            return Err(SessionError::InvalidTransition { action: "reset", phase: self.phase });
        }
        self.clear();
        self.phase = Phase::Idle;
        Ok(())
    }

    /// Drop the session from any phase; no summary is produced
    pub fn abandon(&mut self) {
        if let Phase::InExercise(i) = self.phase {
            info!("Workout abandoned at exercise {}", i + 1);
        }
        self.clear();
        self.phase = Phase::Idle;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            exercise: self.current_exercise(),
            position: self.current_position(),
            target_reps: self.current_entry().map(|e| e.target_reps),
            reps_this_exercise: self.reps_this_exercise(),
            rep_counts: self.counts.iter().collect(),
            exercise_timer_secs: self.timer_secs,
            exercise_secs: self.exercise_secs.clone(),
            total_timer_secs: self.total_timer_secs,
            advance_available: self.advance_available(),
            started_at: self.started_at,
        }
    }

    fn enter(&mut self, index: usize) {
        let kind = self.plan.entries()[index].exercise;
        self.classifiers.reset_all();
        self.entry_baseline = self.counts.get(kind);
        self.timer_secs = 0;
        self.phase = Phase::InExercise(index);
        info!("Exercise {}/{}: {}", index + 1, self.plan.len(), kind.name());
    }

    fn clear(&mut self) {
        self.classifiers.reset_all();
        self.counts.clear();
        self.entry_baseline = 0;
        self.exercise_secs = vec![0; self.plan.len()];
        self.timer_secs = 0;
        self.total_timer_secs = 0;
        self.started_at = None;
    }

    fn summarize(&self) -> WorkoutSummary {
        let mut exercises: Vec<ExerciseTally> = Vec::new();
        for entry in self.plan.entries() {
            if !exercises.iter().any(|t| t.exercise == entry.exercise) {
                exercises.push(ExerciseTally {
                    exercise: entry.exercise,
                    count: self.counts.get(entry.exercise),
                });
            }
        }

        WorkoutSummary {
            date: Utc::now(),
            total_calories: total_calories(&exercises),
            total_duration_secs: self.exercise_secs.iter().sum(),
            exercises,
        }
    }
}
