//! Jumping jack: smoothed shoulder-elbow-hip angle on both sides

use std::collections::VecDeque;

use crate::counter::{Position, RepCycle, Step, Zone};
use crate::geometry::angle_at;
use crate::pose::{Landmark, PoseSnapshot};

const CONFIDENCE_FLOOR: f32 = 0.5;

/// Frames in the trailing average
pub const WINDOW: usize = 5;

/// Both smoothed angles wider than this: arms down at the sides
pub const ARMS_DOWN_ABOVE: f32 = 130.0;

/// Both smoothed angles tighter than this: arms raised
pub const ARMS_UP_BELOW: f32 = 60.0;

const REQUIRED: [Landmark; 6] = [
    Landmark::LeftShoulder,
    Landmark::RightShoulder,
    Landmark::LeftElbow,
    Landmark::RightElbow,
    Landmark::LeftHip,
    Landmark::RightHip,
];

/// Simple moving average over the last [`WINDOW`] samples
#[derive(Debug, Clone, Default)]
pub struct RollingAngle {
    samples: VecDeque<f32>,
}

impl RollingAngle {
    pub fn push(&mut self, angle: f32) -> f32 {
        if self.samples.len() == WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(angle);
        self.mean()
    }

    pub fn mean(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f32>() / self.samples.len() as f32
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Counts when the arms come back down
#[derive(Debug, Clone)]
pub struct JumpingJack {
    cycle: RepCycle,
    left: RollingAngle,
    right: RollingAngle,
}

impl Default for JumpingJack {
    fn default() -> Self {
        Self {
            cycle: RepCycle::new(Position::Down),
            left: RollingAngle::default(),
            right: RollingAngle::default(),
        }
    }
}

impl JumpingJack {
    pub fn cycle(&self) -> &RepCycle {
        &self.cycle
    }

    pub fn reset(&mut self) {
        self.cycle.reset();
        self.left.clear();
        self.right.clear();
    }

    /// Smoothed (left, right) angles
    pub fn smoothed(&self) -> (f32, f32) {
        (self.left.mean(), self.right.mean())
    }

    pub fn update(&mut self, pose: &PoseSnapshot) -> Option<Step> {
        let [ls, rs, le, re, lh, rh] = pose.require(REQUIRED, CONFIDENCE_FLOOR)?;

        let left = self.left.push(angle_at(le.point(), ls.point(), lh.point()));
        let right = self.right.push(angle_at(re.point(), rs.point(), rh.point()));

        let zone = if left > ARMS_DOWN_ABOVE && right > ARMS_DOWN_ABOVE {
            Zone::Down
        } else if left < ARMS_UP_BELOW && right < ARMS_UP_BELOW {
            Zone::Up
        } else {
            Zone::DeadBand
        };
        Some(self.cycle.observe(zone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::testing::jack_frame;

    fn feed(jack: &mut JumpingJack, angles: &[f32]) -> usize {
        angles
            .iter()
            .filter(|a| matches!(jack.update(&jack_frame(**a, **a, 0.9)), Some(Step::Counted(_))))
            .count()
    }

    #[test]
    fn test_rolling_angle_drops_oldest() {
        let mut rolling = RollingAngle::default();
        for a in [10.0, 20.0, 30.0, 40.0, 50.0] {
            rolling.push(a);
        }
        assert_eq!(rolling.mean(), 30.0);
        assert_eq!(rolling.push(60.0), 40.0);
        assert_eq!(rolling.len(), WINDOW);
    }

    #[test]
    fn test_single_outlier_does_not_flip_down() {
        let mut jack = JumpingJack::default();
        feed(&mut jack, &[170.0; 5]);
        assert_eq!(jack.cycle().position(), Position::Down);

        // (4 * 170 + 10) / 5 = 138, still above the down threshold
        feed(&mut jack, &[10.0]);
        assert_eq!(jack.cycle().position(), Position::Down);
        feed(&mut jack, &[170.0, 170.0]);
        assert_eq!(jack.cycle().position(), Position::Down);
    }

    #[test]
    fn test_single_outlier_does_not_flip_up() {
        let mut jack = JumpingJack::default();
        feed(&mut jack, &[20.0; 5]);
        assert_eq!(jack.cycle().position(), Position::Up);

        // (4 * 20 + 170) / 5 = 50, still below the up threshold
        assert_eq!(feed(&mut jack, &[170.0]), 0);
        assert_eq!(jack.cycle().position(), Position::Up);
    }

    #[test]
    fn test_sustained_motion_counts_one_rep() {
        let mut jack = JumpingJack::default();
        feed(&mut jack, &[170.0; 5]);
        assert_eq!(feed(&mut jack, &[20.0; 4]), 0);
        assert_eq!(jack.cycle().position(), Position::Up);
        assert_eq!(feed(&mut jack, &[170.0; 6]), 1);
        assert_eq!(jack.cycle().position(), Position::Down);
    }

    #[test]
    fn test_low_confidence_frame_is_not_sampled() {
        let mut jack = JumpingJack::default();
        feed(&mut jack, &[170.0; 3]);
        assert_eq!(jack.update(&jack_frame(10.0, 10.0, 0.4)), None);
        assert_eq!(jack.left.len(), 3);
    }

    #[test]
    fn test_reset_clears_window() {
        let mut jack = JumpingJack::default();
        feed(&mut jack, &[20.0; 5]);
        jack.reset();
        assert!(jack.left.is_empty());
        assert_eq!(jack.cycle().position(), Position::Down);
    }
}
