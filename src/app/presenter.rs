use crate::interaction::InteractionState;
use crate::pipeline::TickReport;
use tracing::{debug, info};

/// Consumer of the per-tick object snapshot. Drawing belongs to implementors.
pub trait Presenter: Send {
    fn present(&mut self, report: &TickReport);

    /// Called once after the loop stops
    fn finish(&mut self) {}
}

/// Writes the object state and hand readouts to the log
#[derive(Debug, Default)]
pub struct LogPresenter {
    frames: u64,
    last_state: Option<InteractionState>,
}

impl LogPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Presenter for LogPresenter {
    fn present(&mut self, report: &TickReport) {
        self.frames += 1;

        if self.last_state != Some(report.state) {
            info!("Object is now {}", report.state);
            self.last_state = Some(report.state);
        }

        for signal in report.signals.iter().filter(|s| s.is_tracked()) {
            debug!(
                hand = %signal.hand,
                pose = %signal.pose,
                raw = %signal.raw_pose,
                depth = signal.depth.unwrap_or_default(),
                pull = signal.pull.unwrap_or_default(),
                "Hand"
            );
        }

        let object = &report.object;
        debug!(
            state = %report.state,
            x = object.position.0,
            y = object.position.1,
            scale = object.scale,
            opacity = object.opacity,
            "Object"
        );
    }

    fn finish(&mut self) {
        info!(
            "Presented {} frames, final state {}",
            self.frames,
            self.last_state.unwrap_or_default()
        );
    }
}
