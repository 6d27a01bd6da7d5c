//! Rep counting - per-exercise counters and the one-rep-per-cycle guard

use serde::{Deserialize, Serialize};

use crate::exercises::ExerciseKind;

/// Two extremes of a movement; meaning depends on the exercise
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Up,
    Down,
}

impl Position {
    pub fn opposite(self) -> Self {
        match self {
            Position::Up => Position::Down,
            Position::Down => Position::Up,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Position::Up => "up",
            Position::Down => "down",
        }
    }
}

/// Where one frame's signal falls relative to the enter thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Up,
    Down,
    /// Between the two thresholds; never changes state
    DeadBand,
}

/// Result of feeding one zone reading into a [`RepCycle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Unchanged,
    Moved(Position),
    /// Moved into the counting position and credited a rep
    Counted(Position),
}

/// Position plus in-progress guard for one exercise kind.
///
/// A rep is credited when the position enters `counts_on` while the guard is
/// clear. The guard is set by that credit and cleared only when the position
/// reaches the opposite extreme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepCycle {
    position: Position,
    counts_on: Position,
    in_progress: bool,
}

impl RepCycle {
    /// Starts resting in the counting position, so a full cycle is needed first
    pub fn new(counts_on: Position) -> Self {
        Self {
            position: counts_on,
            counts_on,
            in_progress: false,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn counts_on(&self) -> Position {
        self.counts_on
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn reset(&mut self) {
        self.position = self.counts_on;
        self.in_progress = false;
    }

    pub fn observe(&mut self, zone: Zone) -> Step {
        let target = match zone {
            Zone::Up => Position::Up,
            Zone::Down => Position::Down,
            Zone::DeadBand => return Step::Unchanged,
        };
        if target == self.position {
            return Step::Unchanged;
        }

        self.position = target;
        if target != self.counts_on {
            self.in_progress = false;
            return Step::Moved(target);
        }
        if self.in_progress {
            return Step::Moved(target);
        }
        self.in_progress = true;
        Step::Counted(target)
    }
}

/// Reps credited per exercise kind during a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepCounts {
    counts: [u32; ExerciseKind::COUNT],
}

impl RepCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit exactly one rep
    pub fn record(&mut self, kind: ExerciseKind) -> u32 {
        let slot = &mut self.counts[kind.index()];
        *slot += 1;
        *slot
    }

    pub fn get(&self, kind: ExerciseKind) -> u32 {
        self.counts[kind.index()]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExerciseKind, u32)> + '_ {
        ExerciseKind::all().iter().map(|k| (*k, self.get(*k)))
    }

    pub fn clear(&mut self) {
        self.counts = [0; ExerciseKind::COUNT];
    }
}
