use super::PluckOrchestrator;
use crate::error::Result;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

impl PluckOrchestrator {
    /// Stop auxiliary components and report the session
    pub async fn shutdown(&mut self) -> Result<()> {
        info!("Beginning graceful shutdown");

        self.cancellation_token.cancel();

        if self.keyboard_enabled {
            if let Some(handler) = &self.keyboard_handler {
                match timeout(Duration::from_secs(2), handler.stop()).await {
                    Ok(Ok(())) => info!("Keyboard handler stopped"),
                    Ok(Err(e)) => error!("Error stopping keyboard handler: {}", e),
                    Err(_) => warn!("Keyboard handler did not stop in time"),
                }
            }
        }

        self.presenter.finish();

        let stats = &self.stats;
        info!(
            ticks = stats.ticks,
            fps = stats.fps(),
            hand_presence = stats.hand_presence_ratio(),
            gestures = stats.gesture_events,
            transitions = stats.transitions,
            "Session {} finished",
            self.session_id
        );

        Ok(())
    }
}
