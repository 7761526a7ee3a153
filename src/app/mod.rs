pub mod keyboard_input;

mod orchestrator;
mod presenter;
mod runtime;
mod shutdown;
mod startup;
mod stats;
mod types;

#[cfg(test)]
mod tests;

pub use keyboard_input::KeyboardInputHandler;
pub use orchestrator::PluckOrchestrator;
pub use presenter::{LogPresenter, Presenter};
pub use stats::TickStats;
pub use types::ShutdownReason;
