//! Temporal gesture detection.
//!
//! Per-frame poses are noisy. Each hand keeps a short rolling history and a
//! pose only counts once it has held for `confirm_frames` ticks. Confirmed
//! pose changes, the pull motion and prolonged absence become
//! [`GestureEvent`]s for the interaction state machine.

mod depth;
mod detector;
mod history;
mod types;

pub use depth::MovingAverage;
pub use detector::{GestureDetector, HandGestureDetector, HandObservation};
pub use history::PoseHistory;
pub use types::{GestureEvent, GestureKind, HandSignal};
