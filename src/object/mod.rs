//! The controlled object: animated position, scale and opacity.

mod controller;
mod properties;

pub use controller::{ObjectController, TargetContext};
pub use properties::{ObjectProperties, ObjectSnapshot, Smoothed, SETTLE_EPSILON};
