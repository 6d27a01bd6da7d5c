//! Overhead press / pull: elbow height relative to shoulder height

use crate::counter::{Position, RepCycle, Step, Zone};
use crate::pose::{Landmark, PoseSnapshot};

const CONFIDENCE_FLOOR: f32 = 0.5;

const REQUIRED: [Landmark; 4] = [
    Landmark::LeftShoulder,
    Landmark::RightShoulder,
    Landmark::LeftElbow,
    Landmark::RightElbow,
];

/// Elbows below shoulders is "down" (hanging), above is "up" (pulled).
/// Counts when the elbows come back above the shoulders.
#[derive(Debug, Clone)]
pub struct OverheadPress {
    cycle: RepCycle,
}

impl Default for OverheadPress {
    fn default() -> Self {
        Self { cycle: RepCycle::new(Position::Up) }
    }
}

impl OverheadPress {
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
    let [ls, rs, le, re] = pose.require(REQUIRED, CONFIDENCE_FLOOR)?;

    let zone = if le.y > ls.y && re.y > rs.y {
        Zone::Down
    } else if le.y < ls.y && re.y < rs.y {
        Zone::Up
    } else {
        Zone::DeadBand
    };
    Some(zone)
}
