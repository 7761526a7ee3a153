//! Shared fixtures for unit tests.

use crate::config::PluckConfig;
use crate::landmarks::{Handedness, LandmarkFrame};
use crate::source::{synthetic_hand, HandShape};

pub const DEFAULT_CENTER: (f32, f32) = (0.5, 0.55);

pub fn open_hand(hand: Handedness, width: f32) -> LandmarkFrame {
    synthetic_hand(hand, HandShape::Open, DEFAULT_CENTER, width)
}

pub fn pinch_hand(hand: Handedness, width: f32) -> LandmarkFrame {
    synthetic_hand(hand, HandShape::Pinch, DEFAULT_CENTER, width)
}

pub fn fist_hand(hand: Handedness, width: f32) -> LandmarkFrame {
    synthetic_hand(hand, HandShape::Fist, DEFAULT_CENTER, width)
}

pub fn hand_at(hand: Handedness, shape: HandShape, center: (f32, f32)) -> LandmarkFrame {
    synthetic_hand(hand, shape, center, 0.15)
}

/// Defaults with a short grace period so scenarios stay readable
pub fn test_config() -> PluckConfig {
    let mut config = PluckConfig::default();
    config.detector.history_len = 6;
    config.detector.confirm_frames = 2;
    config.detector.grace_frames = 4;
    config.detector.depth_smoothing_window = 1;
    config
}
