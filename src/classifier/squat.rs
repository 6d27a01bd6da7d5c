//! Squat: knee height relative to hip height

use crate::counter::{Position, RepCycle, Step, Zone};
use crate::pose::{Landmark, PoseSnapshot};

// Lower-body tracking is noisier from a typical camera framing
const CONFIDENCE_FLOOR: f32 = 0.2;

const REQUIRED: [Landmark; 4] = [
    Landmark::LeftKnee,
    Landmark::RightKnee,
    Landmark::LeftHip,
    Landmark::RightHip,
];

/// Counts on standing back up
#[derive(Debug, Clone)]
pub struct Squat {
    cycle: RepCycle,
}

impl Default for Squat {
    fn default() -> Self {
        Self { cycle: RepCycle::new(Position::Up) }
    }
}

impl Squat {
    pub fn cycle(&self) -> &RepCycle {
        &self.cycle
    }

    pub fn reset(&mut self) {
        self.cycle.reset();
    }

    pub fn update(&mut self, pose: &PoseSnapshot) -> Option<Step> {
        let zone = zone(pose)?;
        Some(self.cycle.observe(zone))
    }
}

fn zone(pose: &PoseSnapshot) -> Option<Zone> {
    let [lk, rk, lh, rh] = pose.require(REQUIRED, CONFIDENCE_FLOOR)?;

    let zone = if lk.y < lh.y && rk.y < rh.y {
        Zone::Down
    } else if lk.y > lh.y && rk.y > rh.y {
        Zone::Up
    } else {
        Zone::DeadBand
    };
    Some(zone)
}
