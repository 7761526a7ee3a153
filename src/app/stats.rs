use crate::pipeline::TickReport;
use std::collections::VecDeque;
use std::time::Duration;

/// Ticks averaged for the FPS figure
const FPS_WINDOW: usize = 30;

/// Tick loop statistics
#[derive(Debug, Clone, Default)]
pub struct TickStats {
    pub ticks: u64,
    pub ticks_with_hands: u64,
    pub gesture_events: u64,
    pub transitions: u64,
    frame_times: VecDeque<Duration>,
}

impl TickStats {
    pub fn record_tick(&mut self, report: &TickReport, dt: Duration) {
        self.ticks += 1;
        if report.signals.iter().any(|s| s.is_tracked()) {
            self.ticks_with_hands += 1;
        }
        self.gesture_events += report.events.len() as u64;
        self.transitions += report.transitions.len() as u64;

        if self.frame_times.len() == FPS_WINDOW {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(dt);
    }

    /// Rolling average over the last few ticks
    pub fn fps(&self) -> f64 {
        let total: Duration = self.frame_times.iter().sum();
        if total.is_zero() {
            0.0
        } else {
            self.frame_times.len() as f64 / total.as_secs_f64()
        }
    }

    pub fn hand_presence_ratio(&self) -> f64 {
        if self.ticks == 0 {
            0.0
        } else {
            self.ticks_with_hands as f64 / self.ticks as f64
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
