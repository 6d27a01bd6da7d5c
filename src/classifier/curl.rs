//! Dumbbell curl: elbow angle on both arms

use crate::counter::{Position, RepCycle, Step, Zone};
use crate::geometry::angle_at;
use crate::pose::{Landmark, PoseSnapshot};

const CONFIDENCE_FLOOR: f32 = 0.5;

/// Both arms straighter than this: weights lowered
pub const ARM_DOWN_ABOVE: f32 = 145.0;

/// Both arms tighter than this: weights curled
pub const ARM_UP_BELOW: f32 = 105.0;

const REQUIRED: [Landmark; 6] = [
    Landmark::LeftShoulder,
    Landmark::LeftElbow,
    Landmark::LeftWrist,
    Landmark::RightShoulder,
    Landmark::RightElbow,
    Landmark::RightWrist,
];

/// Counts when the weights are lowered again
#[derive(Debug, Clone)]
pub struct DumbbellCurl {
    cycle: RepCycle,
}

impl Default for DumbbellCurl {
    fn default() -> Self {
        Self { cycle: RepCycle::new(Position::Down) }
    }
}

impl DumbbellCurl {
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
    let [ls, le, lw, rs, re, rw] = pose.require(REQUIRED, CONFIDENCE_FLOOR)?;

    let left = angle_at(le.point(), ls.point(), lw.point());
    let right = angle_at(re.point(), rs.point(), rw.point());

    let zone = if left > ARM_DOWN_ABOVE && right > ARM_DOWN_ABOVE {
        Zone::Down
    } else if left < ARM_UP_BELOW && right < ARM_UP_BELOW {
        Zone::Up
    } else {
        Zone::DeadBand
    };
    Some(zone)
}
