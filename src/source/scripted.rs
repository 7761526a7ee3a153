use super::LandmarkSource;
use crate::error::Result;
use crate::landmarks::{
    Handedness, LandmarkFrame, Point3, FINGERS, NUM_LANDMARKS, THUMB_CMC, THUMB_IP, THUMB_MCP,
    THUMB_TIP, WRIST,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use tracing::debug;

/// Hand shapes the synthetic generator can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandShape {
    Open,
    Pinch,
    Fist,
}

/// Build a plausible 21-point hand as seen in a mirrored (selfie) image.
///
/// `center` is the palm centre and `width` the knuckle span, so the result
/// reports exactly those values through `palm_center()` and `palm_width()`.
pub fn synthetic_hand(
    hand: Handedness,
    shape: HandShape,
    center: (f32, f32),
    width: f32,
) -> LandmarkFrame {
    let (cx, cy) = center;
    let w = width;
    // Mirrored view: the right hand's index knuckle sits on the left of the image
    let side = match hand {
        Handedness::Right => -1.0,
        Handedness::Left => 1.0,
    };

    let mut points = vec![Point3::default(); NUM_LANDMARKS];
    points[WRIST] = Point3::new(cx, cy + 0.8 * w, 0.0);

    let knuckle_offsets = [0.5, 1.0 / 6.0, -1.0 / 6.0, -0.5];
    for (&(tip, mcp), offset) in FINGERS.iter().zip(knuckle_offsets) {
        let mx = cx + side * offset * w;
        let my = cy - 0.2 * w;
        points[mcp] = Point3::new(mx, my, 0.0);

        // PIP, DIP, tip follow the MCP index-wise
        let (pip, dip, end) = match shape {
            HandShape::Fist => (-0.25, -0.1, 0.15),
            HandShape::Open | HandShape::Pinch => (-0.35, -0.65, -0.9),
        };
        points[mcp + 1] = Point3::new(mx, my + pip * w, 0.0);
        points[mcp + 2] = Point3::new(mx, my + dip * w, 0.0);
        points[tip] = Point3::new(mx, my + end * w, 0.0);
    }

    points[THUMB_CMC] = Point3::new(cx + side * 0.45 * w, cy + 0.5 * w, 0.0);
    points[THUMB_MCP] = Point3::new(cx + side * 0.75 * w, cy + 0.25 * w, 0.0);
    points[THUMB_IP] = Point3::new(cx + side * 0.95 * w, cy, 0.0);
    points[THUMB_TIP] = match shape {
        HandShape::Open => Point3::new(cx + side * 1.1 * w, cy - 0.15 * w, 0.0),
        HandShape::Fist => Point3::new(cx - side * 0.1 * w, cy + 0.35 * w, 0.0),
        HandShape::Pinch => {
            let index_tip = points[FINGERS[0].0];
            Point3::new(index_tip.x + side * 0.01, index_tip.y, 0.0)
        }
    };

    LandmarkFrame::new(hand, 0.95, points)
}

/// Serves a prepared sequence of ticks, then reports exhaustion
pub struct ScriptedSource {
    name: String,
    ticks: VecDeque<Vec<LandmarkFrame>>,
}

impl ScriptedSource {
    pub fn new<S: Into<String>>(name: S, ticks: Vec<Vec<LandmarkFrame>>) -> Self {
        Self {
            name: name.into(),
            ticks: ticks.into(),
        }
    }

    /// A right hand appears open, moves towards the camera, pinches, drags the
    /// object up and to the side, lets go and finally leaves the view.
    pub fn demo() -> Self {
        let hand = Handedness::Right;
        let start = (0.5, 0.55);
        let end = (0.3, 0.4);
        let mut ticks: Vec<Vec<LandmarkFrame>> = Vec::new();

        let mut push = |count: usize, f: &dyn Fn(f32) -> Option<LandmarkFrame>| {
            for i in 0..count {
                let t = if count > 1 {
                    i as f32 / (count - 1) as f32
                } else {
                    1.0
                };
                ticks.push(f(t).into_iter().collect());
            }
        };

        push(20, &|_| None);
        push(30, &|_| Some(synthetic_hand(hand, HandShape::Open, start, 0.12)));
        push(40, &|t| {
            Some(synthetic_hand(hand, HandShape::Open, start, lerp(0.12, 0.22, t)))
        });
        push(10, &|_| Some(synthetic_hand(hand, HandShape::Pinch, start, 0.22)));
        push(45, &|t| {
            let center = (lerp(start.0, end.0, t), lerp(start.1, end.1, t));
            Some(synthetic_hand(hand, HandShape::Pinch, center, 0.22))
        });
        push(20, &|_| Some(synthetic_hand(hand, HandShape::Open, end, 0.22)));
        push(30, &|_| None);

        debug!("Demo script prepared with {} ticks", ticks.len());
        Self::new("demo", ticks)
    }

    pub fn remaining(&self) -> usize {
        self.ticks.len()
    }
}

#[async_trait]
impl LandmarkSource for ScriptedSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn next_frame(&mut self) -> Result<Option<Vec<LandmarkFrame>>> {
        Ok(self.ticks.pop_front())
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
