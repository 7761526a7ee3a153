use super::InteractionState;
use crate::gesture::{GestureEvent, GestureKind};
use crate::landmarks::Handedness;
use serde::{Deserialize, Serialize};

/// Cross-hand arbitration. Each hand is detected independently; the policy
/// decides whose gestures reach the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandPolicy {
    /// The hand that wakes the object owns it until it returns to idle
    FirstActive,
    /// Only the left hand interacts
    LeftOnly,
    /// Only the right hand interacts
    RightOnly,
    /// As `FirstActive`, but a grab by the other hand takes a held object over
    Transfer,
}

/// What to do with one gesture event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arbitration {
    Accept,
    Ignore,
    /// Ownership moves to the event's hand
    Handover,
}

impl HandPolicy {
    pub fn arbitrate(
        &self,
        owner: Option<Handedness>,
        state: InteractionState,
        event: &GestureEvent,
    ) -> Arbitration {
        let owned_by_sender = owner.map_or(true, |owner| owner == event.hand);

        match self {
            HandPolicy::LeftOnly if event.hand == Handedness::Left => Arbitration::Accept,
            HandPolicy::RightOnly if event.hand == Handedness::Right => Arbitration::Accept,
            HandPolicy::LeftOnly | HandPolicy::RightOnly => Arbitration::Ignore,
            HandPolicy::FirstActive | HandPolicy::Transfer if owned_by_sender => {
                Arbitration::Accept
            }
            HandPolicy::Transfer
                if state == InteractionState::Grabbed
                    && matches!(event.kind, GestureKind::Grab) =>
            {
                Arbitration::Handover
            }
            HandPolicy::FirstActive | HandPolicy::Transfer => Arbitration::Ignore,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HandPolicy::FirstActive => "first_active",
            HandPolicy::LeftOnly => "left_only",
            HandPolicy::RightOnly => "right_only",
            HandPolicy::Transfer => "transfer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use InteractionState::*;

    fn event(hand: Handedness, kind: GestureKind) -> GestureEvent {
        GestureEvent::new(hand, kind, (0.5, 0.5))
    }

    #[test]
    fn test_first_active_locks_to_owner() {
        let policy = HandPolicy::FirstActive;
        let left_grab = event(Handedness::Left, GestureKind::Grab);

        assert_eq!(policy.arbitrate(None, Idle, &left_grab), Arbitration::Accept);
        assert_eq!(
            policy.arbitrate(Some(Handedness::Left), Grabbed, &left_grab),
            Arbitration::Accept
        );
        assert_eq!(
            policy.arbitrate(Some(Handedness::Right), Grabbed, &left_grab),
            Arbitration::Ignore
        );
    }

    #[test]
    fn test_single_hand_policies() {
        let left = event(Handedness::Left, GestureKind::Activate);
        let right = event(Handedness::Right, GestureKind::Activate);

        assert_eq!(HandPolicy::LeftOnly.arbitrate(None, Idle, &left), Arbitration::Accept);
        assert_eq!(HandPolicy::LeftOnly.arbitrate(None, Idle, &right), Arbitration::Ignore);
        assert_eq!(HandPolicy::RightOnly.arbitrate(None, Idle, &right), Arbitration::Accept);
        assert_eq!(HandPolicy::RightOnly.arbitrate(None, Idle, &left), Arbitration::Ignore);
    }

    #[test]
    fn test_transfer_only_on_grab_while_grabbed() {
        let policy = HandPolicy::Transfer;
        let owner = Some(Handedness::Right);

        assert_eq!(
            policy.arbitrate(owner, Grabbed, &event(Handedness::Left, GestureKind::Grab)),
            Arbitration::Handover
        );
        assert_eq!(
            policy.arbitrate(owner, Attracted, &event(Handedness::Left, GestureKind::Grab)),
            Arbitration::Ignore
        );
        assert_eq!(
            policy.arbitrate(owner, Grabbed, &event(Handedness::Left, GestureKind::Release)),
            Arbitration::Ignore
        );
    }

    #[test]
    fn test_policy_names_match_config_values() {
        for policy in [
            HandPolicy::FirstActive,
            HandPolicy::LeftOnly,
            HandPolicy::RightOnly,
            HandPolicy::Transfer,
        ] {
            let rendered = serde_json::to_string(&policy).unwrap();
            assert_eq!(rendered, format!("\"{}\"", policy.as_str()));
        }
    }
}
