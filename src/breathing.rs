//! Breathing cues keyed by exercise and position

use serde::{Deserialize, Serialize};

use crate::counter::Position;
use crate::exercises::ExerciseKind;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BreathingPhase {
    #[default]
    Inhale,
    Exhale,
}

/// Exhale on the effort, inhale on the return
pub fn phase_for(exercise: ExerciseKind, position: Position) -> BreathingPhase {
    use BreathingPhase::{Exhale, Inhale};

    match (exercise, position) {
        (ExerciseKind::Pushup, Position::Down) => Exhale,
        (ExerciseKind::Pushup, Position::Up) => Inhale,
        (ExerciseKind::Squat, Position::Down) => Inhale,
        (ExerciseKind::Squat, Position::Up) => Exhale,
        (ExerciseKind::OverheadPress, Position::Up) => Exhale,
        (ExerciseKind::OverheadPress, Position::Down) => Inhale,
        (ExerciseKind::DumbbellCurl, Position::Up) => Exhale,
        (ExerciseKind::DumbbellCurl, Position::Down) => Inhale,
        (ExerciseKind::JumpingJack, Position::Up) => Inhale,
        (ExerciseKind::JumpingJack, Position::Down) => Exhale,
    }
}

/// Holds the last cue; refreshed on its own cadence rather than per frame
#[derive(Debug, Clone, Default)]
pub struct BreathingCoach {
    phase: BreathingPhase,
}

impl BreathingCoach {
    pub fn phase(&self) -> BreathingPhase {
        self.phase
    }

    /// Keeps the previous cue while no exercise is active
    pub fn sample(&mut self, active: Option<(ExerciseKind, Position)>) -> BreathingPhase {
        if let Some((exercise, position)) = active {
            self.phase = phase_for(exercise, position);
        }
        self.phase
    }
}
