//! Exercise classifiers - per-exercise state machines over pose snapshots
//!
//! Each classifier maps a frame to a [`Zone`](crate::counter::Zone) using
//! exercise-specific thresholds with a dead-band between them, then feeds
//! its own [`RepCycle`] guard. Frames missing a required keypoint, or with
//! one under the exercise's confidence floor, are skipped without any state
//! change.

pub mod curl;
pub mod jumping_jack;
pub mod overhead_press;
pub mod pushup;
pub mod squat;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::counter::{Position, RepCycle, Zone};
pub use curl::DumbbellCurl;
pub use jumping_jack::JumpingJack;
pub use overhead_press::OverheadPress;
pub use pushup::Pushup;
pub use squat::Squat;

use crate::counter::Step;
use crate::exercises::ExerciseKind;
use crate::pose::PoseSnapshot;

/// One classifier, tagged by exercise kind
#[derive(Debug, Clone)]
pub enum Classifier {
    Pushup(Pushup),
    Squat(Squat),
    OverheadPress(OverheadPress),
    DumbbellCurl(DumbbellCurl),
    JumpingJack(JumpingJack),
}

impl Classifier {
    pub fn new(kind: ExerciseKind) -> Self {
        match kind {
            ExerciseKind::Pushup => Classifier::Pushup(Pushup::default()),
            ExerciseKind::Squat => Classifier::Squat(Squat::default()),
            ExerciseKind::OverheadPress => Classifier::OverheadPress(OverheadPress::default()),
            ExerciseKind::DumbbellCurl => Classifier::DumbbellCurl(DumbbellCurl::default()),
            ExerciseKind::JumpingJack => Classifier::JumpingJack(JumpingJack::default()),
        }
    }

    pub fn kind(&self) -> ExerciseKind {
        match self {
            Classifier::Pushup(_) => ExerciseKind::Pushup,
            Classifier::Squat(_) => ExerciseKind::Squat,
            Classifier::OverheadPress(_) => ExerciseKind::OverheadPress,
            Classifier::DumbbellCurl(_) => ExerciseKind::DumbbellCurl,
            Classifier::JumpingJack(_) => ExerciseKind::JumpingJack,
        }
    }

    pub fn cycle(&self) -> &RepCycle {
        match self {
            Classifier::Pushup(c) => c.cycle(),
            Classifier::Squat(c) => c.cycle(),
            Classifier::OverheadPress(c) => c.cycle(),
            Classifier::DumbbellCurl(c) => c.cycle(),
            Classifier::JumpingJack(c) => c.cycle(),
        }
    }

    pub fn position(&self) -> Position {
        self.cycle().position()
    }

    /// Back to the resting position with a clear guard
    pub fn reset(&mut self) {
        match self {
            Classifier::Pushup(c) => c.reset(),
            Classifier::Squat(c) => c.reset(),
            Classifier::OverheadPress(c) => c.reset(),
            Classifier::DumbbellCurl(c) => c.reset(),
            Classifier::JumpingJack(c) => c.reset(),
        }
    }

    /// `None` when the frame was skipped for missing or low-confidence keypoints
    pub fn update(&mut self, pose: &PoseSnapshot) -> Option<Step> {
        match self {
            Classifier::Pushup(c) => c.update(pose),
            Classifier::Squat(c) => c.update(pose),
            Classifier::OverheadPress(c) => c.update(pose),
            Classifier::DumbbellCurl(c) => c.update(pose),
            Classifier::JumpingJack(c) => c.update(pose),
        }
    }
}

/// One classifier per exercise kind, alive for the whole session
#[derive(Debug, Clone)]
pub struct ClassifierBank {
    classifiers: Vec<Classifier>,
}

impl Default for ClassifierBank {
    fn default() -> Self {
        Self {
            classifiers: ExerciseKind::all().iter().map(|k| Classifier::new(*k)).collect(),
        }
    }
}

impl ClassifierBank {
    pub fn get(&self, kind: ExerciseKind) -> &Classifier {
        &self.classifiers[kind.index()]
    }

    pub fn get_mut(&mut self, kind: ExerciseKind) -> &mut Classifier {
        &mut self.classifiers[kind.index()]
    }

    pub fn reset_all(&mut self) {
        for classifier in &mut self.classifiers {
            classifier.reset();
        }
    }
}
