use super::PluckOrchestrator;
use crate::error::Result;
use tracing::{error, info};

impl PluckOrchestrator {
    /// Start auxiliary components ahead of the tick loop
    pub async fn start(&mut self) -> Result<()> {
        info!(
            "Starting pluck session {} ({} fps, {} hand policy)",
            self.session_id,
            self.config.source.fps,
            self.config.interaction.policy.as_str()
        );

        if self.keyboard_enabled {
            if let Some(handler) = &self.keyboard_handler {
                handler.start().await.map_err(|e| {
                    error!("Failed to start keyboard handler: {}", e);
                    e
                })?;
            }
        }

        Ok(())
    }
}
