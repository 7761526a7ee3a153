use crate::config::{ClassifierConfig, PluckConfig};
use crate::landmarks::{Handedness, LandmarkFrame, FINGERS, INDEX_TIP, THUMB_TIP};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Single-frame classification of a hand's shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pose {
    /// All four fingers extended, palm towards the camera
    Open,
    /// Thumb tip touching index tip
    Pinch,
    /// Hand visible but neither open nor pinching
    Neutral,
    /// No usable detection for this hand
    Absent,
}

impl Pose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pose::Open => "open",
            Pose::Pinch => "pinch",
            Pose::Neutral => "neutral",
            Pose::Absent => "absent",
        }
    }

    pub fn is_present(&self) -> bool {
        !matches!(self, Pose::Absent)
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stateless pose classifier. Thresholds are fixed at construction.
#[derive(Debug, Clone)]
pub struct PoseClassifier {
    config: ClassifierConfig,
    min_confidence: f32,
    mirrored: bool,
}

impl PoseClassifier {
    pub fn new(config: ClassifierConfig, min_confidence: f32, mirrored: bool) -> Self {
        Self {
            config,
            min_confidence,
            mirrored,
        }
    }

    pub fn from_config(config: &PluckConfig) -> Self {
        Self::new(
            config.classifier.clone(),
            config.source.min_confidence,
            config.source.mirrored,
        )
    }

    /// Classify one hand. `None` (no detection for this hand) is `Absent`.
    pub fn classify(&self, frame: Option<&LandmarkFrame>) -> Pose {
        let Some(frame) = frame else {
            return Pose::Absent;
        };

        if frame.confidence.is_nan() || frame.confidence < self.min_confidence {
            trace!(
                hand = %frame.handedness,
                confidence = frame.confidence,
                "Detection below confidence threshold"
            );
            return Pose::Absent;
        }
        if !frame.is_complete() {
            trace!(hand = %frame.handedness, "Incomplete landmark set");
            return Pose::Absent;
        }

        // Pinch wins over everything else, including an otherwise open hand
        if self.is_pinching(frame) {
            return Pose::Pinch;
        }

        if self.fingers_extended(frame) && self.palm_facing(frame) {
            Pose::Open
        } else {
            Pose::Neutral
        }
    }

    pub fn is_pinching(&self, frame: &LandmarkFrame) -> bool {
        frame.point(THUMB_TIP).distance(&frame.point(INDEX_TIP)) < self.config.pinch_threshold
    }

    pub fn fingers_extended(&self, frame: &LandmarkFrame) -> bool {
        let size = frame.hand_size();
        if size <= f32::EPSILON {
            return false;
        }

        FINGERS.iter().all(|&(tip, mcp)| {
            frame.point(tip).distance(&frame.point(mcp)) / size > self.config.extension_ratio
        })
    }

    pub fn palm_facing(&self, frame: &LandmarkFrame) -> bool {
        if !self.config.require_palm_facing {
            return true;
        }

        // Selfie view swaps which winding a camera-facing palm produces
        let expect_positive = (frame.handedness == Handedness::Right) == self.mirrored;
        let normal = frame.palm_normal_z();
        if expect_positive {
            normal > 0.0
        } else {
            normal < 0.0
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }
}
