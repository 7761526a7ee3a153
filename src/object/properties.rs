use serde::{Deserialize, Serialize};

/// Below this distance a value snaps onto its target
pub const SETTLE_EPSILON: f32 = 1e-5;

/// A scalar that eases towards a target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoothed {
    pub current: f32,
    pub target: f32,
}

impl Smoothed {
    pub fn at(value: f32) -> Self {
        Self {
            current: value,
            target: value,
        }
    }

    /// Move `alpha` of the remaining distance towards the target. Never overshoots.
    pub fn advance(&mut self, alpha: f32) {
        let remaining = self.target - self.current;
        if remaining.abs() <= SETTLE_EPSILON {
            self.current = self.target;
            return;
        }
        let next = self.current + alpha.clamp(0.0, 1.0) * remaining;
        self.current = if (self.target - next).abs() <= SETTLE_EPSILON
            || (self.target - next).signum() != remaining.signum()
        {
            self.target
        } else {
            next
        };
    }

    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }
}

/// Read-only view of the object handed to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub position: (f32, f32),
    pub scale: f32,
    pub opacity: f32,
}

/// Current and target values of every animated property
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectProperties {
    pub x: Smoothed,
    pub y: Smoothed,
    pub scale: Smoothed,
    pub opacity: Smoothed,
}

impl ObjectProperties {
    pub fn at_rest(snapshot: ObjectSnapshot) -> Self {
        Self {
            x: Smoothed::at(snapshot.position.0),
            y: Smoothed::at(snapshot.position.1),
            scale: Smoothed::at(snapshot.scale),
            opacity: Smoothed::at(snapshot.opacity),
        }
    }

    pub fn current(&self) -> ObjectSnapshot {
        ObjectSnapshot {
            position: (self.x.current, self.y.current),
            scale: self.scale.current,
            opacity: self.opacity.current,
        }
    }

    pub fn target(&self) -> ObjectSnapshot {
        ObjectSnapshot {
            position: (self.x.target, self.y.target),
            scale: self.scale.target,
            opacity: self.opacity.target,
        }
    }

    pub fn set_target(&mut self, target: ObjectSnapshot) {
        self.x.target = target.position.0;
        self.y.target = target.position.1;
        self.scale.target = target.scale;
        self.opacity.target = target.opacity;
    }

    pub fn advance(&mut self, alpha: f32) {
        self.x.advance(alpha);
        self.y.advance(alpha);
        self.scale.advance(alpha);
        self.opacity.advance(alpha);
    }

    pub fn is_settled(&self) -> bool {
        self.x.is_settled()
            && self.y.is_settled()
            && self.scale.is_settled()
            && self.opacity.is_settled()
    }
}
