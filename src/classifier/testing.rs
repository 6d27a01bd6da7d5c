//! Synthetic frames for classifier tests

use crate::pose::{Keypoint, Landmark, PoseSnapshot};

fn frame(points: &[(Landmark, f32, f32)], score: f32) -> PoseSnapshot {
    PoseSnapshot::from_keypoints(points.iter().map(|(l, x, y)| Keypoint::new(*l, *x, *y, score)))
}

/// Point at `length` from `origin`, rotated `degrees` away from straight up
fn from_vertical(origin: (f32, f32), degrees: f32, length: f32) -> (f32, f32) {
    let t = degrees.to_radians();
    (origin.0 + length * t.sin(), origin.1 - length * t.cos())
}

/// Shoulders straight above the elbows, wrists opened to the given elbow angles
pub fn arm_frame(left_angle: f32, right_angle: f32, score: f32) -> PoseSnapshot {
    let (le, re) = ((200.0, 250.0), (400.0, 250.0));
    let lw = from_vertical(le, left_angle, 60.0);
    let rw = from_vertical(re, right_angle, 60.0);
    frame(
        &[
            (Landmark::Nose, 300.0, 150.0),
            (Landmark::LeftShoulder, le.0, le.1 - 60.0),
            (Landmark::RightShoulder, re.0, re.1 - 60.0),
            (Landmark::LeftElbow, le.0, le.1),
            (Landmark::RightElbow, re.0, re.1),
            (Landmark::LeftWrist, lw.0, lw.1),
            (Landmark::RightWrist, rw.0, rw.1),
        ],
        score,
    )
}

/// Both elbows at `elbow_angle`; nose below or above the shoulder line
pub fn pushup_frame(elbow_angle: f32, nose_low: bool, score: f32) -> PoseSnapshot {
    let arms = arm_frame(elbow_angle, elbow_angle, score);
    let mut keypoints: Vec<Keypoint> = Landmark::all().iter().filter_map(|l| arms.get(*l).copied()).collect();
    let shoulder_y = 190.0;
    for k in keypoints.iter_mut().filter(|k| k.name == Landmark::Nose) {
        k.y = if nose_low { shoulder_y + 30.0 } else { shoulder_y - 40.0 };
    }
    PoseSnapshot::from_keypoints(keypoints)
}

/// Hips at y=300; knees offset vertically (negative = knee higher than hip)
pub fn squat_frame(left_offset: f32, right_offset: f32, score: f32) -> PoseSnapshot {
    frame(
        &[
            (Landmark::LeftHip, 250.0, 300.0),
            (Landmark::RightHip, 350.0, 300.0),
            (Landmark::LeftKnee, 250.0, 300.0 + left_offset),
            (Landmark::RightKnee, 350.0, 300.0 + right_offset),
        ],
        score,
    )
}

/// Shoulders at y=200; elbows offset vertically (negative = above shoulders)
pub fn press_frame(offset: f32, score: f32) -> PoseSnapshot {
    frame(
        &[
            (Landmark::LeftShoulder, 250.0, 200.0),
            (Landmark::RightShoulder, 350.0, 200.0),
            (Landmark::LeftElbow, 220.0, 200.0 + offset),
            (Landmark::RightElbow, 380.0, 200.0 + offset),
        ],
        score,
    )
}

/// Shoulder-elbow-hip angles (vertex at the elbow) for both sides
pub fn jack_frame(left_angle: f32, right_angle: f32, score: f32) -> PoseSnapshot {
    let (le, re) = ((200.0, 250.0), (400.0, 250.0));
    let lh = from_vertical(le, left_angle, 80.0);
    let rh = from_vertical(re, right_angle, 80.0);
    frame(
        &[
            (Landmark::LeftShoulder, le.0, le.1 - 50.0),
            (Landmark::RightShoulder, re.0, re.1 - 50.0),
            (Landmark::LeftElbow, le.0, le.1),
            (Landmark::RightElbow, re.0, re.1),
            (Landmark::LeftHip, lh.0, lh.1),
            (Landmark::RightHip, rh.0, rh.1),
        ],
        score,
    )
}
