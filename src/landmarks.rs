use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of keypoints per detected hand
pub const NUM_LANDMARKS: usize = 21;

// Keypoint indices used by the classifier and palm metrics
pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_TIP: usize = 20;

/// Wrist plus the four finger knuckles
pub const PALM_LANDMARKS: [usize; 5] = [WRIST, INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];

/// (tip, mcp) pairs for index, middle, ring and pinky
pub const FINGERS: [(usize, usize); 4] = [
    (INDEX_TIP, INDEX_MCP),
    (MIDDLE_TIP, MIDDLE_MCP),
    (RING_TIP, RING_MCP),
    (PINKY_TIP, PINKY_MCP),
];

/// Detected hand side, as reported by the landmark detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// Processing order within a tick
    pub const ALL: [Handedness; 2] = [Handedness::Left, Handedness::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            Handedness::Left => "left",
            Handedness::Right => "right",
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single keypoint. x and y are normalized image coordinates (y grows
/// downwards), z is relative depth on roughly the same scale as x.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Point3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Distance in the image plane, ignoring z
    pub fn distance_2d(&self, other: &Point3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f32; 3]> for Point3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Point3> for [f32; 3] {
    fn from(p: Point3) -> Self {
        [p.x, p.y, p.z]
    }
}

/// One detected hand in one captured frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub handedness: Handedness,
    /// Detector confidence in [0, 1]
    pub confidence: f32,
    pub landmarks: Vec<Point3>,
}

impl LandmarkFrame {
    pub fn new(handedness: Handedness, confidence: f32, landmarks: Vec<Point3>) -> Self {
        Self {
            handedness,
            confidence,
            landmarks,
        }
    }

    /// Full keypoint set with finite coordinates
    pub fn is_complete(&self) -> bool {
        self.landmarks.len() == NUM_LANDMARKS && self.landmarks.iter().all(Point3::is_finite)
    }

    /// Keypoint by index. Callers check `is_complete` first.
    pub fn point(&self, index: usize) -> Point3 {
        self.landmarks.get(index).copied().unwrap_or_default()
    }

    /// Mean of the wrist and finger knuckles in the image plane
    pub fn palm_center(&self) -> (f32, f32) {
        let (sx, sy) = PALM_LANDMARKS.iter().fold((0.0, 0.0), |(sx, sy), &i| {
            let p = self.point(i);
            (sx + p.x, sy + p.y)
        });
        let n = PALM_LANDMARKS.len() as f32;
        (sx / n, sy / n)
    }

    /// Knuckle span (index MCP to pinky MCP). Grows as the hand nears the camera.
    pub fn palm_width(&self) -> f32 {
        self.point(INDEX_MCP).distance_2d(&self.point(PINKY_MCP))
    }

    pub fn palm_z(&self) -> f32 {
        PALM_LANDMARKS.iter().map(|&i| self.point(i).z).sum::<f32>() / PALM_LANDMARKS.len() as f32
    }

    /// Wrist to middle knuckle, used to normalize finger lengths
    pub fn hand_size(&self) -> f32 {
        self.point(WRIST).distance(&self.point(MIDDLE_MCP))
    }

    /// z component of (index_mcp - wrist) x (pinky_mcp - wrist)
    pub fn palm_normal_z(&self) -> f32 {
        let wrist = self.point(WRIST);
        let index = self.point(INDEX_MCP);
        let pinky = self.point(PINKY_MCP);
        let (ax, ay) = (index.x - wrist.x, index.y - wrist.y);
        let (bx, by) = (pinky.x - wrist.x, pinky.y - wrist.y);
        ax * by - ay * bx
    }
}
