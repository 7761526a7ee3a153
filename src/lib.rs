pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod gesture;
pub mod interaction;
pub mod landmarks;
pub mod object;
pub mod pipeline;
pub mod pose;
pub mod source;

#[cfg(test)]
mod testing;

pub use app::{LogPresenter, PluckOrchestrator, Presenter, ShutdownReason, TickStats};
pub use config::{PluckConfig, SourceKind};
pub use error::{EventBusError, PluckError, Result};
pub use events::{EventBus, EventFilter, EventReceiver, PluckEvent};
pub use gesture::{GestureDetector, GestureEvent, GestureKind, HandSignal};
pub use interaction::{HandPolicy, InteractionState, InteractionStateMachine, Transition};
pub use landmarks::{Handedness, LandmarkFrame, Point3};
pub use object::{ObjectController, ObjectSnapshot};
pub use pipeline::{InteractionPipeline, TickReport};
pub use pose::{Pose, PoseClassifier};
pub use source::{LandmarkSource, ReplaySource, ScriptedSource};
