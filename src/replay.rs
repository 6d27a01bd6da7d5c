//! Pose sources without a camera: recorded JSON-lines files and a synthetic
//! athlete that performs a workout plan

use std::collections::VecDeque;
use std::f32::consts::PI;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::exercises::{ExerciseKind, WorkoutPlan};
use crate::pose::{Keypoint, Landmark, PoseSnapshot};
use crate::runtime::{Estimate, PoseEstimator};

/// One line of a recording: every detected person, or just one
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordedFrame {
    People(Vec<PoseSnapshot>),
    Single(PoseSnapshot),
}

impl From<RecordedFrame> for Estimate {
    fn from(frame: RecordedFrame) -> Self {
        match frame {
            RecordedFrame::People(poses) => Estimate::Poses(poses),
            RecordedFrame::Single(pose) => Estimate::Poses(vec![pose]),
        }
    }
}

/// Replays a recording at a fixed frame interval
pub struct ReplayEstimator<R> {
    lines: Lines<R>,
    interval: Duration,
    line_no: usize,
}

impl ReplayEstimator<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>, interval: Duration) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("opening recording {}", path.display()))?;
        Ok(Self::new(BufReader::new(file), interval))
    }
}

impl<R: BufRead> ReplayEstimator<R> {
    pub fn new(reader: R, interval: Duration) -> Self {
        Self {
            lines: reader.lines(),
            interval,
            line_no: 0,
        }
    }

    /// Next recorded frame without pacing; blank lines are skipped
    pub fn next_frame(&mut self) -> Result<Estimate> {
        loop {
            let Some(line) = self.lines.next() else {
                return Ok(Estimate::Closed);
            };
            let line = line?;
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            let frame: RecordedFrame = serde_json::from_str(&line)
                .with_context(|| format!("bad frame on line {}", self.line_no))?;
            return Ok(frame.into());
        }
    }
}

impl<R: BufRead + Send + 'static> PoseEstimator for ReplayEstimator<R> {
    async fn estimate(&mut self) -> Result<Estimate> {
        tokio::time::sleep(self.interval).await;
        self.next_frame()
    }
}

// Synthetic athlete: a front-facing stick figure, y grows downwards

const UPPER_ARM: f32 = 70.0;
const FOREARM: f32 = 60.0;
const NOSE: (f32, f32) = (320.0, 140.0);
const LEFT_SHOULDER: (f32, f32) = (260.0, 200.0);
const RIGHT_SHOULDER: (f32, f32) = (380.0, 200.0);
const LEFT_HIP: (f32, f32) = (280.0, 340.0);
const RIGHT_HIP: (f32, f32) = (360.0, 340.0);
const ANKLE_Y: f32 = 520.0;

/// Confidence reported for a clean frame
pub const CLEAN_SCORE: f32 = 0.9;

/// Confidence reported for a dropped-out frame; under every classifier floor
pub const DROPOUT_SCORE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Arm {
    /// Upper arm away from hanging, in degrees (180 = straight up)
    raise: f32,
    /// Interior elbow angle in degrees
    bend: f32,
}

impl Arm {
    const fn new(raise: f32, bend: f32) -> Self {
        Self { raise, bend }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Stance {
    left: Arm,
    right: Arm,
    head_drop: f32,
    /// Knee height below the hip (negative = above)
    knee_offset: f32,
}

/// Between reps: one arm down, one up, elbows half bent. Reads as a dead band
/// for every arm-based classifier, so frames of one exercise never complete a
/// rep of another.
const NEUTRAL: Stance = Stance {
    left: Arm::new(0.0, 125.0),
    right: Arm::new(170.0, 125.0),
    head_drop: 0.0,
    knee_offset: 90.0,
};

impl Stance {
    const fn arms(arm: Arm) -> Self {
        Self {
            left: arm,
            right: arm,
            head_drop: 0.0,
            knee_offset: 90.0,
        }
    }

    fn lerp(&self, to: &Stance, t: f32) -> Stance {
        let mix = |a: f32, b: f32| a + (b - a) * t;
        let arm = |a: Arm, b: Arm| Arm::new(mix(a.raise, b.raise), mix(a.bend, b.bend));
        Stance {
            left: arm(self.left, to.left),
            right: arm(self.right, to.right),
            head_drop: mix(self.head_drop, to.head_drop),
            knee_offset: mix(self.knee_offset, to.knee_offset),
        }
    }
}

/// (far extreme, extreme that credits the rep)
fn extremes(kind: ExerciseKind) -> (Stance, Stance) {
    match kind {
        ExerciseKind::Pushup => (
            Stance { head_drop: 75.0, ..Stance::arms(Arm::new(0.0, 80.0)) },
            Stance::arms(Arm::new(0.0, 170.0)),
        ),
        ExerciseKind::Squat => (Stance { knee_offset: -20.0, ..NEUTRAL }, NEUTRAL),
        ExerciseKind::OverheadPress => (
            Stance::arms(Arm::new(45.0, 90.0)),
            Stance::arms(Arm::new(150.0, 170.0)),
        ),
        ExerciseKind::DumbbellCurl => (
            Stance::arms(Arm::new(0.0, 40.0)),
            Stance::arms(Arm::new(0.0, 170.0)),
        ),
        ExerciseKind::JumpingJack => (
            Stance::arms(Arm::new(170.0, 160.0)),
            Stance::arms(Arm::new(0.0, 160.0)),
        ),
    }
}

fn ease(t: f32) -> f32 {
    (1.0 - (PI * t).cos()) / 2.0
}

/// Neutral, out to the far extreme, hold, over to the counting extreme, hold, back
fn stance_at(kind: ExerciseKind, phase: f32) -> Stance {
    let (far, counting) = extremes(kind);
    let keys = [
        (0.0, NEUTRAL),
        (0.3, far),
        (0.4, far),
        (0.7, counting),
        (0.8, counting),
        (1.0, NEUTRAL),
    ];

    let phase = phase.clamp(0.0, 1.0);
    for pair in keys.windows(2) {
        let ((p0, from), (p1, to)) = (pair[0], pair[1]);
        if phase <= p1 {
            return from.lerp(&to, ease((phase - p0) / (p1 - p0)));
        }
    }
    NEUTRAL
}

/// Elbow and wrist for one arm; `side` is -1 for the left arm, +1 for the right
fn arm_points(shoulder: (f32, f32), arm: Arm, side: f32) -> ((f32, f32), (f32, f32)) {
    let (sin, cos) = arm.raise.to_radians().sin_cos();
    let elbow = (shoulder.0 + side * UPPER_ARM * sin, shoulder.1 + UPPER_ARM * cos);

    // forearm leaves the elbow `bend` degrees away from the upper arm
    let back = ((shoulder.0 - elbow.0) / UPPER_ARM, (shoulder.1 - elbow.1) / UPPER_ARM);
    let (sin, cos) = (side * arm.bend.to_radians()).sin_cos();
    let dir = (back.0 * cos - back.1 * sin, back.0 * sin + back.1 * cos);
    let wrist = (elbow.0 + FOREARM * dir.0, elbow.1 + FOREARM * dir.1);
    (elbow, wrist)
}

fn figure(stance: &Stance) -> Vec<(Landmark, f32, f32)> {
    let head = NOSE.1 + stance.head_drop;
    let (le, lw) = arm_points(LEFT_SHOULDER, stance.left, -1.0);
    let (re, rw) = arm_points(RIGHT_SHOULDER, stance.right, 1.0);
    let knee_y = LEFT_HIP.1 + stance.knee_offset;

    vec![
        (Landmark::Nose, NOSE.0, head),
        (Landmark::LeftEye, NOSE.0 - 10.0, head - 10.0),
        (Landmark::RightEye, NOSE.0 + 10.0, head - 10.0),
        (Landmark::LeftEar, NOSE.0 - 25.0, head - 5.0),
        (Landmark::RightEar, NOSE.0 + 25.0, head - 5.0),
        (Landmark::LeftShoulder, LEFT_SHOULDER.0, LEFT_SHOULDER.1),
        (Landmark::RightShoulder, RIGHT_SHOULDER.0, RIGHT_SHOULDER.1),
        (Landmark::LeftElbow, le.0, le.1),
        (Landmark::RightElbow, re.0, re.1),
        (Landmark::LeftWrist, lw.0, lw.1),
        (Landmark::RightWrist, rw.0, rw.1),
        (Landmark::LeftHip, LEFT_HIP.0, LEFT_HIP.1),
        (Landmark::RightHip, RIGHT_HIP.0, RIGHT_HIP.1),
        (Landmark::LeftKnee, LEFT_HIP.0, knee_y),
        (Landmark::RightKnee, RIGHT_HIP.0, knee_y),
        (Landmark::LeftAnkle, LEFT_HIP.0, ANKLE_Y),
        (Landmark::RightAnkle, RIGHT_HIP.0, ANKLE_Y),
    ]
}

fn snapshot(stance: &Stance, score: f32, mut jitter: impl FnMut() -> f32) -> PoseSnapshot {
    PoseSnapshot::from_keypoints(
        figure(stance)
            .into_iter()
            .map(|(name, x, y)| Keypoint::new(name, x + jitter(), y + jitter(), score)),
    )
}

/// Noise-free figure `phase` of the way through one rep (0 and 1 are the neutral stance)
pub fn synthetic_pose(kind: ExerciseKind, phase: f32, score: f32) -> PoseSnapshot {
    snapshot(&stance_at(kind, phase), score, || 0.0)
}

/// Noise-free figure standing between reps
pub fn neutral_pose(score: f32) -> PoseSnapshot {
    snapshot(&NEUTRAL, score, || 0.0)
}

#[derive(Debug, Clone)]
pub struct SyntheticOptions {
    pub frames_per_rep: usize,
    /// Neutral frames before each plan entry
    pub lead_in_frames: usize,
    /// Uniform per-coordinate noise, in pixels
    pub jitter: f32,
    /// Share of frames with no person or an unusably low confidence
    pub dropout_rate: f64,
    /// Share of inference calls that fail outright
    pub failure_rate: f64,
    pub frame_interval: Duration,
    pub seed: u64,
}

impl Default for SyntheticOptions {
    fn default() -> Self {
        Self {
            frames_per_rep: 30,
            lead_in_frames: 10,
            jitter: 1.5,
            dropout_rate: 0.0,
            failure_rate: 0.0,
            frame_interval: Duration::from_millis(33),
            seed: 42,
        }
    }
}

/// Performs every plan entry to its target, then closes
pub struct SyntheticEstimator {
    script: VecDeque<Stance>,
    options: SyntheticOptions,
    rng: StdRng,
}

impl SyntheticEstimator {
    pub fn new(plan: &WorkoutPlan, options: SyntheticOptions) -> Self {
        let frames_per_rep = options.frames_per_rep.max(2);
        let mut script = VecDeque::new();
        for entry in plan.entries() {
            script.extend(std::iter::repeat_n(NEUTRAL, options.lead_in_frames));
            for _ in 0..entry.target_reps {
                for frame in 0..frames_per_rep {
                    let phase = frame as f32 / frames_per_rep as f32;
                    script.push_back(stance_at(entry.exercise, phase));
                }
            }
        }
        debug!("Synthetic script: {} frames", script.len());

        Self {
            script,
            rng: StdRng::seed_from_u64(options.seed),
            options,
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    /// Next frame without pacing
    pub fn next_frame(&mut self) -> Result<Estimate> {
        let Some(stance) = self.script.pop_front() else {
            return Ok(Estimate::Closed);
        };

        if self.rng.gen_bool(self.options.failure_rate.clamp(0.0, 1.0)) {
            anyhow::bail!("synthetic inference failure");
        }

        let mut score = CLEAN_SCORE;
        if self.rng.gen_bool(self.options.dropout_rate.clamp(0.0, 1.0)) {
            if self.rng.gen_bool(0.5) {
                return Ok(Estimate::Poses(vec![]));
            }
            score = DROPOUT_SCORE;
        }

        let jitter = self.options.jitter.abs();
        let rng = &mut self.rng;
        let pose = snapshot(&stance, score, || {
            if jitter > 0.0 { rng.gen_range(-jitter..=jitter) } else { 0.0 }
        });
        Ok(Estimate::Poses(vec![pose]))
    }
}

impl PoseEstimator for SyntheticEstimator {
    async fn estimate(&mut self) -> Result<Estimate> {
        tokio::time::sleep(self.options.frame_interval).await;
        self.next_frame()
    }
}
