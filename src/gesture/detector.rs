use super::depth::MovingAverage;
use super::history::PoseHistory;
use super::types::{GestureEvent, GestureKind, HandSignal};
use crate::config::DetectorConfig;
use crate::landmarks::{Handedness, LandmarkFrame};
use crate::pose::Pose;
use tracing::{debug, trace};

/// Debounce and gesture tracking for a single hand
#[derive(Debug, Clone)]
pub struct HandGestureDetector {
    hand: Handedness,
    config: DetectorConfig,
    history: PoseHistory,
    depth: MovingAverage,
    raw_pose: Pose,
    confirmed: Pose,
    /// Consecutive ticks without a usable detection
    absent_run: usize,
    /// A present pose was confirmed since the last deactivation
    engaged: bool,
    grabbing: bool,
    /// Current pull amount while pulling
    pull: Option<f32>,
    depth_anchor: Option<f32>,
    position: Option<(f32, f32)>,
    last_position: Option<(f32, f32)>,
}

impl HandGestureDetector {
    pub fn new(hand: Handedness, config: DetectorConfig) -> Self {
        Self {
            hand,
            history: PoseHistory::new(config.history_len),
            depth: MovingAverage::new(config.depth_smoothing_window),
            config,
            raw_pose: Pose::Absent,
            confirmed: Pose::Absent,
            absent_run: 0,
            engaged: false,
            grabbing: false,
            pull: None,
            depth_anchor: None,
            position: None,
            last_position: None,
        }
    }

    /// Feed this tick's pose and landmarks; returns the gestures it completes.
    pub fn update(&mut self, pose: Pose, frame: Option<&LandmarkFrame>) -> Vec<GestureEvent> {
        let mut events = Vec::new();

        let reading = frame
            .filter(|_| pose.is_present())
            .map(|f| (f.palm_center(), f.palm_width(), f.palm_z()));

        match reading {
            Some((position, width, z)) => {
                trace!(hand = %self.hand, %pose, width, z, "Palm reading");
                self.absent_run = 0;
                self.position = Some(position);
                self.last_position = Some(position);
                self.raw_pose = pose;
                self.depth.push(width);
            }
            None => {
                self.absent_run += 1;
                self.position = None;
                self.raw_pose = Pose::Absent;
            }
        }
        self.history.push(self.raw_pose);

        if let Some(next) = self.history.confirmed(self.config.confirm_frames) {
            if next != self.confirmed {
                let previous = std::mem::replace(&mut self.confirmed, next);
                self.on_confirmed(previous, next, &mut events);
            }
        }

        self.track_pull(&mut events);

        if self.engaged && self.absent_run >= self.config.grace_frames {
            debug!(
                hand = %self.hand,
                frames = self.absent_run,
                "Hand gone for the grace period"
            );
            events.push(self.event(GestureKind::Deactivate));
            self.reset();
        }

        events
    }

    fn on_confirmed(&mut self, from: Pose, to: Pose, events: &mut Vec<GestureEvent>) {
        debug!(hand = %self.hand, %from, %to, "Pose confirmed");

        match to {
            Pose::Open => {
                if self.grabbing {
                    self.grabbing = false;
                    events.push(self.event(GestureKind::Release));
                }
                self.engaged = true;
                self.depth_anchor = self.depth.value();
                events.push(self.event(GestureKind::Activate));
            }
            Pose::Pinch => {
                self.engaged = true;
                self.grabbing = true;
                self.pull = None;
                events.push(self.event(GestureKind::Grab));
            }
            // Keeps any grab in progress
            Pose::Neutral => {
                self.engaged = true;
            }
            Pose::Absent => {
                self.grabbing = false;
                self.pull = None;
                events.push(self.event(GestureKind::Release));
            }
        }
    }

    fn track_pull(&mut self, events: &mut Vec<GestureEvent>) {
        if self.confirmed != Pose::Open {
            self.pull = None;
            return;
        }
        // Hold the current pull through a dropped frame
        if self.position.is_none() {
            return;
        }
        let (Some(anchor), Some(depth)) = (self.depth_anchor, self.depth.value()) else {
            return;
        };

        let delta = depth - anchor;
        if delta > self.config.pull_threshold {
            let amount = (delta / self.config.pull_range).clamp(0.0, 1.0);
            if self.pull.is_none() {
                debug!(hand = %self.hand, delta, "Pull started");
                events.push(self.event(GestureKind::PullStart));
            }
            self.pull = Some(amount);
            trace!(hand = %self.hand, amount, "Pull update");
            events.push(self.event(GestureKind::PullUpdate { depth: amount }));
        } else if self.pull.take().is_some() {
            debug!(hand = %self.hand, delta, "Pull ended");
        }
    }

    fn event(&self, kind: GestureKind) -> GestureEvent {
        GestureEvent::new(self.hand, kind, self.last_position.unwrap_or_default())
    }

    /// Forget everything learned about the hand
    pub fn reset(&mut self) {
        self.history.clear();
        self.depth.clear();
        self.confirmed = Pose::Absent;
        self.engaged = false;
        self.grabbing = false;
        self.pull = None;
        self.depth_anchor = None;
        self.last_position = None;
    }

    pub fn signal(&self) -> HandSignal {
        HandSignal {
            hand: self.hand,
            raw_pose: self.raw_pose,
            pose: self.confirmed,
            position: self.position,
            depth: self.position.and(self.depth.value()),
            pull: self.pull,
            grabbing: self.grabbing,
        }
    }

    pub fn hand(&self) -> Handedness {
        self.hand
    }

    pub fn confirmed_pose(&self) -> Pose {
        self.confirmed
    }

    pub fn is_grabbing(&self) -> bool {
        self.grabbing
    }

    pub fn depth_anchor(&self) -> Option<f32> {
        self.depth_anchor
    }

    pub fn absent_run(&self) -> usize {
        self.absent_run
    }
}

/// One hand's classified input for a tick
#[derive(Debug, Clone, Copy)]
pub struct HandObservation<'a> {
    pub hand: Handedness,
    pub pose: Pose,
    pub frame: Option<&'a LandmarkFrame>,
}

/// Independent per-hand detectors, merged into one ordered event list
#[derive(Debug, Clone)]
pub struct GestureDetector {
    left: HandGestureDetector,
    right: HandGestureDetector,
}

impl GestureDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            left: HandGestureDetector::new(Handedness::Left, config.clone()),
            right: HandGestureDetector::new(Handedness::Right, config),
        }
    }

    pub fn hand(&self, hand: Handedness) -> &HandGestureDetector {
        match hand {
            Handedness::Left => &self.left,
            Handedness::Right => &self.right,
        }
    }

    fn hand_mut(&mut self, hand: Handedness) -> &mut HandGestureDetector {
        match hand {
            Handedness::Left => &mut self.left,
            Handedness::Right => &mut self.right,
        }
    }

    /// Advance both hands by one tick. Hands without an observation are absent.
    ///
    /// Events come back left hand first, then right, with every grab moved
    /// ahead of the rest.
    pub fn update(&mut self, observations: &[HandObservation<'_>]) -> Vec<GestureEvent> {
        let mut events = Vec::new();

        for hand in Handedness::ALL {
            let (pose, frame) = observations
                .iter()
                .find(|o| o.hand == hand)
                .map_or((Pose::Absent, None), |o| (o.pose, o.frame));
            events.extend(self.hand_mut(hand).update(pose, frame));
        }

        // Stable: per-hand order survives
        events.sort_by_key(|e| e.kind.priority());
        events
    }

    pub fn signals(&self) -> Vec<HandSignal> {
        Handedness::ALL
            .iter()
            .map(|&hand| self.hand(hand).signal())
            .collect()
    }

    pub fn signal(&self, hand: Handedness) -> HandSignal {
        self.hand(hand).signal()
    }

    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }
}
