use crate::gesture::GestureKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the controlled object is currently behaving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InteractionState {
    /// Resting, no hand engaged
    #[default]
    Idle,
    /// A hand is presenting an open palm
    Responding,
    /// The object is being drawn towards the hand
    Attracted,
    /// The object follows the pinching hand
    Grabbed,
}

impl InteractionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionState::Idle => "idle",
            InteractionState::Responding => "responding",
            InteractionState::Attracted => "attracted",
            InteractionState::Grabbed => "grabbed",
        }
    }
}

impl fmt::Display for InteractionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transition table. `None` leaves the state unchanged; every pair is listed
/// so new states or gestures fail to compile until they are placed.
pub fn transition(state: InteractionState, event: &GestureKind) -> Option<InteractionState> {
    use GestureKind::*;
    use InteractionState::*;

    match (state, event) {
        (Idle, Activate) => Some(Responding),
        (Idle, PullStart | PullUpdate { .. } | Grab | Release | Deactivate) => None,

        (Responding, PullUpdate { .. }) => Some(Attracted),
        (Responding, Grab) => Some(Grabbed),
        (Responding, Deactivate) => Some(Idle),
        (Responding, Activate | PullStart | Release) => None,

        (Attracted, Grab) => Some(Grabbed),
        (Attracted, Release) => Some(Responding),
        (Attracted, Deactivate) => Some(Idle),
        (Attracted, Activate | PullStart | PullUpdate { .. }) => None,

        (Grabbed, Release) => Some(Responding),
        (Grabbed, Deactivate) => Some(Idle),
        (Grabbed, Activate | PullStart | PullUpdate { .. } | Grab) => None,
    }
}
