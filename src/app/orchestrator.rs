use super::keyboard_input::KeyboardInputHandler;
use super::presenter::Presenter;
use super::stats::TickStats;
use super::types::ShutdownReason;
use crate::config::PluckConfig;
use crate::error::Result;
use crate::events::EventBus;
use crate::pipeline::InteractionPipeline;
use crate::source::LandmarkSource;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

/// Drives the interaction pipeline from a landmark source at a fixed rate
pub struct PluckOrchestrator {
    pub(super) config: PluckConfig,
    pub(super) session_id: Uuid,
    pub(super) event_bus: Arc<EventBus>,

    // Tick loop
    pub(super) pipeline: InteractionPipeline,
    pub(super) source: Box<dyn LandmarkSource>,
    pub(super) presenter: Box<dyn Presenter>,
    pub(super) stats: TickStats,

    pub(super) keyboard_handler: Option<KeyboardInputHandler>,
    pub(super) keyboard_enabled: bool,

    // Lifecycle management
    pub(super) shutdown_sender: Option<oneshot::Sender<ShutdownReason>>,
    pub(super) shutdown_receiver: Option<oneshot::Receiver<ShutdownReason>>,
    pub(super) cancellation_token: CancellationToken,
}

impl PluckOrchestrator {
    /// Create a new orchestrator. Fails if the configuration does not validate.
    pub fn new(
        config: PluckConfig,
        source: Box<dyn LandmarkSource>,
        presenter: Box<dyn Presenter>,
    ) -> Result<Self> {
        let pipeline = InteractionPipeline::new(&config)?;
        let event_bus = Arc::new(EventBus::new(config.system.event_bus_capacity));
        let (shutdown_sender, shutdown_receiver) = oneshot::channel();
        let session_id = Uuid::new_v4();

        // Keyboard quit handler, disabled until set_keyboard_enabled(true)
        let keyboard_handler = Some(KeyboardInputHandler::new(Arc::clone(&event_bus)));

        info!("Session {} created with source '{}'", session_id, source.name());

        Ok(Self {
            config,
            session_id,
            event_bus,
            pipeline,
            source,
            presenter,
            stats: TickStats::default(),
            keyboard_handler,
            keyboard_enabled: false,
            shutdown_sender: Some(shutdown_sender),
            shutdown_receiver: Some(shutdown_receiver),
            cancellation_token: CancellationToken::new(),
        })
    }

    /// Enable or disable the keyboard quit handler
    pub fn set_keyboard_enabled(&mut self, enabled: bool) {
        self.keyboard_enabled = enabled;
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    /// Token that stops the tick loop when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    pub fn pipeline(&self) -> &InteractionPipeline {
        &self.pipeline
    }
}
