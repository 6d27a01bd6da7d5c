//! Pushup: elbow angle with a nose-below-shoulders check

use crate::counter::{Position, RepCycle, Step, Zone};
use crate::geometry::angle_at;
use crate::pose::{Landmark, PoseSnapshot};

const CONFIDENCE_FLOOR: f32 = 0.5;

/// Both elbows tighter than this (and nose low) confirms the bottom
pub const ELBOW_DOWN_BELOW: f32 = 110.0;

/// Both elbows straighter than this confirms the top
pub const ELBOW_UP_ABOVE: f32 = 145.0;

const REQUIRED: [Landmark; 7] = [
    Landmark::LeftShoulder,
    Landmark::LeftElbow,
    Landmark::LeftWrist,
    Landmark::RightShoulder,
    Landmark::RightElbow,
    Landmark::RightWrist,
    Landmark::Nose,
];

/// Counts on the way back up
#[derive(Debug, Clone)]
pub struct Pushup {
    cycle: RepCycle,
}

impl Default for Pushup {
    fn default() -> Self {
        Self { cycle: RepCycle::new(Position::Up) }
    }
}

impl Pushup {
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
    let [ls, le, lw, rs, re, rw, nose] = pose.require(REQUIRED, CONFIDENCE_FLOOR)?;

    let left = angle_at(le.point(), ls.point(), lw.point());
    let right = angle_at(re.point(), rs.point(), rw.point());
    let nose_low = nose.y > ls.y && nose.y > rs.y;

    let zone = if left < ELBOW_DOWN_BELOW && right < ELBOW_DOWN_BELOW && nose_low {
        Zone::Down
    } else if left > ELBOW_UP_ABOVE && right > ELBOW_UP_ABOVE {
        Zone::Up
    } else {
        Zone::DeadBand
    };
    Some(zone)
}
