use crate::pose::Pose;
use std::collections::VecDeque;

/// Bounded rolling window of the most recent poses for one hand
#[derive(Debug, Clone)]
pub struct PoseHistory {
    samples: VecDeque<Pose>,
    capacity: usize,
}

impl PoseHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, pose: Pose) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(pose);
    }

    pub fn latest(&self) -> Option<Pose> {
        self.samples.back().copied()
    }

    /// Number of trailing samples that share the latest pose
    pub fn trailing_run(&self) -> usize {
        let Some(latest) = self.latest() else {
            return 0;
        };
        self.samples
            .iter()
            .rev()
            .take_while(|&&pose| pose == latest)
            .count()
    }

    /// The latest pose, if it has held for at least `frames` samples
    pub fn confirmed(&self, frames: usize) -> Option<Pose> {
        let latest = self.latest()?;
        (self.trailing_run() >= frames).then_some(latest)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
