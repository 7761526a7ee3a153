//! Landmark sources: where per-tick hand detections come from.
//!
//! The detector itself lives outside this crate. A source only has to hand
//! over zero or more [`LandmarkFrame`]s per tick; a hand missing from a tick
//! is treated as absent downstream, never as an error.

mod replay;
mod scripted;

pub use replay::ReplaySource;
pub use scripted::{synthetic_hand, HandShape, ScriptedSource};

use crate::config::{SourceConfig, SourceKind};
use crate::error::{PluckError, Result};
use crate::landmarks::LandmarkFrame;
use async_trait::async_trait;
use tracing::info;

#[async_trait]
pub trait LandmarkSource: Send {
    /// Human-readable source name for logs
    fn name(&self) -> &str;

    /// Detections for the next tick. `Ok(None)` means the source is exhausted.
    async fn next_frame(&mut self) -> Result<Option<Vec<LandmarkFrame>>>;
}

/// Build the source selected in configuration
pub async fn from_config(config: &SourceConfig) -> Result<Box<dyn LandmarkSource>> {
    match config.kind {
        SourceKind::Replay => {
            let path = config.replay_path.as_deref().ok_or_else(|| {
                PluckError::invalid_config("source.replay_path", "no replay file given")
            })?;
            info!("Using replay source: {}", path);
            Ok(Box::new(ReplaySource::open(path).await?))
        }
        SourceKind::Demo => {
            info!("Using scripted demo source");
            Ok(Box::new(ScriptedSource::demo()))
        }
    }
}
