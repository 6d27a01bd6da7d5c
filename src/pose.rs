//! Pose input model - keypoints produced by the external pose estimator

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Confidence a keypoint needs before the renderer draws it
pub const DISPLAY_POINT_FLOOR: f32 = 0.3;

/// Confidence both ends of a bone need before the renderer draws it
pub const DISPLAY_BONE_FLOOR: f32 = 0.2;

/// Anatomical landmarks reported by single-pose MoveNet models
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Landmark {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl Landmark {
    pub fn all() -> &'static [Landmark] {
        &[
            Landmark::Nose,
            Landmark::LeftEye,
            Landmark::RightEye,
            Landmark::LeftEar,
            Landmark::RightEar,
            Landmark::LeftShoulder,
            Landmark::RightShoulder,
            Landmark::LeftElbow,
            Landmark::RightElbow,
            Landmark::LeftWrist,
            Landmark::RightWrist,
            Landmark::LeftHip,
            Landmark::RightHip,
            Landmark::LeftKnee,
            Landmark::RightKnee,
            Landmark::LeftAnkle,
            Landmark::RightAnkle,
        ]
    }
}

/// Bones drawn by the skeleton overlay
pub const SKELETON: &[(Landmark, Landmark)] = &[
    (Landmark::Nose, Landmark::LeftEye),
    (Landmark::Nose, Landmark::RightEye),
    (Landmark::LeftEye, Landmark::LeftEar),
    (Landmark::RightEye, Landmark::RightEar),
    (Landmark::LeftShoulder, Landmark::RightShoulder),
    (Landmark::LeftShoulder, Landmark::LeftElbow),
    (Landmark::RightShoulder, Landmark::RightElbow),
    (Landmark::LeftElbow, Landmark::LeftWrist),
    (Landmark::RightElbow, Landmark::RightWrist),
    (Landmark::LeftHip, Landmark::RightHip),
    (Landmark::LeftHip, Landmark::LeftKnee),
    (Landmark::RightHip, Landmark::RightKnee),
    (Landmark::LeftKnee, Landmark::LeftAnkle),
    (Landmark::RightKnee, Landmark::RightAnkle),
];

/// One landmark estimate for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub name: Landmark,
    pub x: f32,
    pub y: f32,
    pub score: f32,
}

impl Keypoint {
    pub fn new(name: Landmark, x: f32, y: f32, score: f32) -> Self {
        Self { name, x, y, score }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// All keypoints of one detected person in one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Frame", into = "Frame")]
pub struct PoseSnapshot {
    keypoints: HashMap<Landmark, Keypoint>,
}

/// Wire shape: the estimator's flat keypoint list
#[derive(Serialize, Deserialize)]
struct Frame {
    keypoints: Vec<Keypoint>,
}

impl From<Frame> for PoseSnapshot {
    fn from(frame: Frame) -> Self {
        Self::from_keypoints(frame.keypoints)
    }
}

impl From<PoseSnapshot> for Frame {
    fn from(snapshot: PoseSnapshot) -> Self {
        let mut keypoints: Vec<_> = snapshot.keypoints.into_values().collect();
        keypoints.sort_by_key(|k| Landmark::all().iter().position(|l| *l == k.name));
        Frame { keypoints }
    }
}

impl PoseSnapshot {
    /// Build a snapshot; a later duplicate landmark replaces an earlier one
    pub fn from_keypoints(keypoints: impl IntoIterator<Item = Keypoint>) -> Self {
        Self {
            keypoints: keypoints.into_iter().map(|k| (k.name, k)).collect(),
        }
    }

    pub fn get(&self, landmark: Landmark) -> Option<&Keypoint> {
        self.keypoints.get(&landmark)
    }

    /// Keypoint if present and strictly above the confidence floor
    pub fn confident(&self, landmark: Landmark, floor: f32) -> Option<&Keypoint> {
        self.get(landmark).filter(|k| k.score > floor)
    }

    /// Fetch several landmarks at once; `None` if any is missing or under-confident
    pub fn require<const N: usize>(&self, landmarks: [Landmark; N], floor: f32) -> Option<[Keypoint; N]> {
        let mut out = [Keypoint::new(Landmark::Nose, 0.0, 0.0, 0.0); N];
        for (slot, landmark) in out.iter_mut().zip(landmarks) {
            *slot = *self.confident(landmark, floor)?;
        }
        Some(out)
    }

    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    /// Keypoints confident enough to draw
    pub fn visible_points(&self) -> Vec<Keypoint> {
        Landmark::all()
            .iter()
            .filter_map(|l| self.confident(*l, DISPLAY_POINT_FLOOR))
            .copied()
            .collect()
    }

    /// Bones whose both ends are confident enough to draw
    pub fn skeleton_segments(&self) -> Vec<(Keypoint, Keypoint)> {
        SKELETON
            .iter()
            .filter_map(|(a, b)| {
                let a = self.confident(*a, DISPLAY_BONE_FLOOR)?;
                let b = self.confident(*b, DISPLAY_BONE_FLOOR)?;
                Some((*a, *b))
            })
            .collect()
    }
}
