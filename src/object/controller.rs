use super::properties::{ObjectProperties, ObjectSnapshot};
use crate::config::ObjectConfig;
use crate::interaction::InteractionState;
use std::time::Duration;
use tracing::{debug, info};

/// Inputs beyond the state itself that shape the targets
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TargetContext {
    /// Latest position of the owning hand
    pub hand_position: Option<(f32, f32)>,
    /// Normalized pull amount in [0, 1]
    pub pull_depth: f32,
}

/// Owns the object's animated properties
pub struct ObjectController {
    config: ObjectConfig,
    properties: ObjectProperties,
}

impl ObjectController {
    /// Create a controller resting at the idle pose
    pub fn new(config: ObjectConfig) -> Self {
        info!(
            "Object controller initialized at ({:.2}, {:.2}), scale {:.2}, smoothing {:.2}",
            config.anchor.0, config.anchor.1, config.base_scale, config.smoothing
        );

        let rest = ObjectSnapshot {
            position: config.anchor,
            scale: config.base_scale,
            opacity: config.idle_opacity,
        };

        Self {
            config,
            properties: ObjectProperties::at_rest(rest),
        }
    }

    /// Derive and apply targets for `state`
    pub fn set_targets(&mut self, state: InteractionState, context: &TargetContext) {
        let target = self.targets_for(state, context);
        debug!(
            %state,
            x = target.position.0,
            y = target.position.1,
            scale = target.scale,
            opacity = target.opacity,
            "Object targets set"
        );
        self.properties.set_target(target);
    }

    fn targets_for(&self, state: InteractionState, context: &TargetContext) -> ObjectSnapshot {
        let config = &self.config;
        let anchor = config.anchor;
        let depth = context.pull_depth.clamp(0.0, 1.0);

        let (position, scale, opacity) = match state {
            InteractionState::Idle => (anchor, config.base_scale, config.idle_opacity),
            InteractionState::Responding => (anchor, config.base_scale, config.responding_opacity),
            InteractionState::Attracted => (
                (
                    anchor.0 + config.attract_offset.0 * depth,
                    anchor.1 + config.attract_offset.1 * depth,
                ),
                lerp(config.base_scale, config.attracted_scale, depth),
                config.responding_opacity,
            ),
            InteractionState::Grabbed => (
                // Hold the last target if the hand skipped this tick
                context
                    .hand_position
                    .unwrap_or((self.properties.x.target, self.properties.y.target)),
                config.grabbed_scale,
                config.responding_opacity,
            ),
        };

        ObjectSnapshot {
            position,
            scale: scale.clamp(config.min_scale, config.max_scale),
            opacity: opacity.clamp(0.0, 1.0),
        }
    }

    /// Smoothing factor for a tick of length `dt`, scaled so the response
    /// is the same at any frame rate
    pub fn alpha_for(&self, dt: Duration) -> f32 {
        let reference = 1.0 / self.config.reference_fps as f64;
        let steps = dt.as_secs_f64() / reference;
        (1.0 - (1.0 - self.config.smoothing as f64).powf(steps)) as f32
    }

    /// Advance current values towards their targets
    pub fn tick(&mut self, dt: Duration) {
        let alpha = self.alpha_for(dt);
        self.properties.advance(alpha);
    }

    /// Snapshot for the presentation layer
    pub fn current_properties(&self) -> ObjectSnapshot {
        self.properties.current()
    }

    pub fn target_properties(&self) -> ObjectSnapshot {
        self.properties.target()
    }

    pub fn is_settled(&self) -> bool {
        self.properties.is_settled()
    }

    pub fn config(&self) -> &ObjectConfig {
        &self.config
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
