//! Joint angle geometry

use serde::{Deserialize, Serialize};

/// Angle returned when one of the rays has zero length (duplicate keypoints)
pub const DEGENERATE_ANGLE: f32 = 0.0;

const MIN_RAY_LENGTH: f32 = 1e-6;

/// 2-D point in frame coordinates (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    fn length(self) -> f32 {
        self.dot(self).sqrt()
    }
}

/// Unsigned interior angle at `vertex` between the rays to `a` and `b`, in degrees [0, 180].
///
/// Uses the arc-cosine of the normalised dot product. Returns [`DEGENERATE_ANGLE`]
/// when either ray is shorter than a micro-pixel.
pub fn angle_at(vertex: Point, a: Point, b: Point) -> f32 {
    let ra = a.sub(vertex);
    let rb = b.sub(vertex);

    let len_a = ra.length();
    let len_b = rb.length();
    if len_a < MIN_RAY_LENGTH || len_b < MIN_RAY_LENGTH {
        return DEGENERATE_ANGLE;
    }

    // Rounding can push near-colinear cosines just past ±1
    let cos = (ra.dot(rb) / (len_a * len_b)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}
