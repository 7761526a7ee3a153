use crate::landmarks::Handedness;
use crate::pose::Pose;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Debounced, discrete action derived from a hand's recent poses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GestureKind {
    /// Hand settled into an open palm
    Activate,
    /// Open hand started moving towards the camera
    PullStart,
    /// Ongoing pull; `depth` is the normalized approach in [0, 1]
    PullUpdate { depth: f32 },
    /// Hand settled into a pinch
    Grab,
    /// Pinch let go, or the hand dropped out of view
    Release,
    /// Hand gone for the whole grace period
    Deactivate,
}

impl GestureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GestureKind::Activate => "activate",
            GestureKind::PullStart => "pull_start",
            GestureKind::PullUpdate { .. } => "pull_update",
            GestureKind::Grab => "grab",
            GestureKind::Release => "release",
            GestureKind::Deactivate => "deactivate",
        }
    }

    /// Ordering rank within one tick; lower runs first. Grab pre-empts pull.
    pub fn priority(&self) -> u8 {
        match self {
            GestureKind::Grab => 0,
            _ => 1,
        }
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureKind::PullUpdate { depth } => write!(f, "pull_update({:.2})", depth),
            other => f.write_str(other.as_str()),
        }
    }
}

/// A gesture tagged with the hand that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureEvent {
    pub hand: Handedness,
    pub kind: GestureKind,
    /// Palm centre of the triggering hand (last known position for releases)
    pub position: (f32, f32),
}

impl GestureEvent {
    pub fn new(hand: Handedness, kind: GestureKind, position: (f32, f32)) -> Self {
        Self {
            hand,
            kind,
            position,
        }
    }
}

impl fmt::Display for GestureEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} at ({:.3}, {:.3})",
            self.hand, self.kind, self.position.0, self.position.1
        )
    }
}

/// Continuous per-hand readings published alongside discrete events
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HandSignal {
    pub hand: Handedness,
    /// Pose for this tick before debouncing
    pub raw_pose: Pose,
    /// Debounced pose
    pub pose: Pose,
    /// Palm centre, when the hand is visible this tick
    pub position: Option<(f32, f32)>,
    /// Smoothed depth proxy (palm width)
    pub depth: Option<f32>,
    /// Normalized pull amount while a pull is in progress
    pub pull: Option<f32>,
    pub grabbing: bool,
}

impl HandSignal {
    pub fn is_tracked(&self) -> bool {
        self.position.is_some()
    }
}
