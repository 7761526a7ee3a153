//! Interaction state machine and cross-hand arbitration.

mod machine;
mod policy;
mod state;

pub use machine::{InteractionStateMachine, Transition};
pub use policy::{Arbitration, HandPolicy};
pub use state::{transition, InteractionState};
