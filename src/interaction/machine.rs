use super::policy::{Arbitration, HandPolicy};
use super::state::{transition, InteractionState};
use crate::gesture::{GestureEvent, GestureKind, HandSignal};
use crate::landmarks::Handedness;
use crate::object::{ObjectController, TargetContext};
use serde::Serialize;
use tracing::{debug, info, trace};

/// A state change and the gesture that caused it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transition {
    pub from: InteractionState,
    pub to: InteractionState,
    pub cause: GestureEvent,
}

/// Owns the interaction state and drives the object's targets
#[derive(Debug, Clone)]
pub struct InteractionStateMachine {
    state: InteractionState,
    policy: HandPolicy,
    /// Hand that took the object out of idle
    owner: Option<Handedness>,
    pull_depth: f32,
    hand_position: Option<(f32, f32)>,
}

impl InteractionStateMachine {
    pub fn new(policy: HandPolicy) -> Self {
        info!("Interaction state machine using {} hand policy", policy.as_str());
        Self {
            state: InteractionState::Idle,
            policy,
            owner: None,
            pull_depth: 0.0,
            hand_position: None,
        }
    }

    /// Apply one gesture. Unmatched state/event pairs change nothing.
    pub fn handle(
        &mut self,
        event: &GestureEvent,
        controller: &mut ObjectController,
    ) -> Option<Transition> {
        match self.policy.arbitrate(self.owner, self.state, event) {
            Arbitration::Accept => {}
            Arbitration::Ignore => {
                trace!(event = %event, owner = ?self.owner, "Gesture from non-owning hand ignored");
                return None;
            }
            Arbitration::Handover => {
                info!(
                    from = ?self.owner,
                    to = %event.hand,
                    "Object handed over"
                );
                self.owner = Some(event.hand);
                self.hand_position = Some(event.position);
                controller.set_targets(self.state, &self.context());
                return None;
            }
        }

        let Some(next) = transition(self.state, &event.kind) else {
            // Attracted stays attracted but follows the pull
            if let (InteractionState::Attracted, GestureKind::PullUpdate { depth }) =
                (self.state, event.kind)
            {
                self.pull_depth = depth;
                controller.set_targets(self.state, &self.context());
            } else {
                trace!(state = %self.state, event = %event, "No transition");
            }
            return None;
        };

        let from = self.state;
        self.state = next;

        match next {
            InteractionState::Idle => {
                self.owner = None;
                self.pull_depth = 0.0;
                self.hand_position = None;
            }
            InteractionState::Responding => {
                self.pull_depth = 0.0;
            }
            InteractionState::Attracted => {
                if let GestureKind::PullUpdate { depth } = event.kind {
                    self.pull_depth = depth;
                }
            }
            InteractionState::Grabbed => {
                self.hand_position = Some(event.position);
            }
        }
        if from == InteractionState::Idle {
            self.owner = Some(event.hand);
        }

        controller.set_targets(next, &self.context());
        info!(%from, to = %next, hand = %event.hand, "Interaction state changed");

        Some(Transition {
            from,
            to: next,
            cause: *event,
        })
    }

    /// Per-tick continuous update: a grabbed object follows its hand
    pub fn track(&mut self, signals: &[HandSignal], controller: &mut ObjectController) {
        if self.state != InteractionState::Grabbed {
            return;
        }

        let position = self
            .owner
            .and_then(|owner| signals.iter().find(|s| s.hand == owner))
            .and_then(|s| s.position);
        if let Some(position) = position {
            self.hand_position = Some(position);
        } else {
            debug!("Owning hand not visible this tick, holding position");
        }

        controller.set_targets(self.state, &self.context());
    }

    fn context(&self) -> TargetContext {
        TargetContext {
            hand_position: self.hand_position,
            pull_depth: self.pull_depth,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn owner(&self) -> Option<Handedness> {
        self.owner
    }

    pub fn policy(&self) -> HandPolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PluckConfig;
    use crate::pose::Pose;
    use InteractionState::*;

    fn setup(policy: HandPolicy) -> (InteractionStateMachine, ObjectController) {
        (
            InteractionStateMachine::new(policy),
            ObjectController::new(PluckConfig::default().object),
        )
    }

    fn event(hand: Handedness, kind: GestureKind) -> GestureEvent {
        GestureEvent::new(hand, kind, (0.3, 0.4))
    }

    fn signal(hand: Handedness, position: Option<(f32, f32)>) -> HandSignal {
        HandSignal {
            hand,
            raw_pose: Pose::Pinch,
            pose: Pose::Pinch,
            position,
            depth: None,
            pull: None,
            grabbing: true,
        }
    }

    #[test]
    fn test_activate_sets_responding_targets() {
        let (mut machine, mut controller) = setup(HandPolicy::FirstActive);
        let transition = machine
            .handle(&event(Handedness::Right, GestureKind::Activate), &mut controller)
            .unwrap();

        assert_eq!(transition.from, Idle);
        assert_eq!(transition.to, Responding);
        assert_eq!(machine.owner(), Some(Handedness::Right));
        assert_eq!(
            controller.target_properties().opacity,
            controller.config().responding_opacity
        );
    }

    #[test]
    fn test_unmatched_events_are_ignored() {
        let (mut machine, mut controller) = setup(HandPolicy::FirstActive);
        let before = controller.target_properties();

        for kind in [
            GestureKind::Grab,
            GestureKind::Release,
            GestureKind::Deactivate,
            GestureKind::PullUpdate { depth: 0.5 },
        ] {
            assert!(machine.handle(&event(Handedness::Left, kind), &mut controller).is_none());
        }
        assert_eq!(machine.state(), Idle);
        assert_eq!(machine.owner(), None);
        assert_eq!(controller.target_properties(), before);
    }

    #[test]
    fn test_attracted_follows_pull_depth() {
        let (mut machine, mut controller) = setup(HandPolicy::FirstActive);
        let hand = Handedness::Right;
        machine.handle(&event(hand, GestureKind::Activate), &mut controller);
        machine.handle(&event(hand, GestureKind::PullUpdate { depth: 0.2 }), &mut controller);
        assert_eq!(machine.state(), Attracted);
        let shallow = controller.target_properties().scale;

        assert!(machine
            .handle(&event(hand, GestureKind::PullUpdate { depth: 0.9 }), &mut controller)
            .is_none());
        let deep = controller.target_properties().scale;
        assert!(deep > shallow);

        let transition = machine
            .handle(&event(hand, GestureKind::Release), &mut controller)
            .unwrap();
        assert_eq!(transition.to, Responding);
        assert_eq!(controller.target_properties().scale, controller.config().base_scale);
    }

    #[test]
    fn test_grabbed_tracks_owner_each_tick() {
        let (mut machine, mut controller) = setup(HandPolicy::FirstActive);
        let hand = Handedness::Left;
        machine.handle(&event(hand, GestureKind::Activate), &mut controller);
        machine.handle(&event(hand, GestureKind::Grab), &mut controller);
        assert_eq!(machine.state(), Grabbed);
        assert_eq!(controller.target_properties().position, (0.3, 0.4));

        let signals = [signal(Handedness::Left, Some((0.6, 0.1))), signal(Handedness::Right, Some((0.9, 0.9)))];
        machine.track(&signals, &mut controller);
        assert_eq!(controller.target_properties().position, (0.6, 0.1));

        // Owner briefly invisible
        machine.track(&[signal(Handedness::Left, None)], &mut controller);
        assert_eq!(controller.target_properties().position, (0.6, 0.1));
    }

    #[test]
    fn test_deactivate_returns_to_idle_once() {
        let (mut machine, mut controller) = setup(HandPolicy::FirstActive);
        let hand = Handedness::Right;
        machine.handle(&event(hand, GestureKind::Activate), &mut controller);
        machine.handle(&event(hand, GestureKind::Grab), &mut controller);

        let deactivate = event(hand, GestureKind::Deactivate);
        assert_eq!(machine.handle(&deactivate, &mut controller).unwrap().to, Idle);
        assert!(machine.handle(&deactivate, &mut controller).is_none());
        assert_eq!(machine.owner(), None);

        let target = controller.target_properties();
        assert_eq!(target.position, controller.config().anchor);
        assert_eq!(target.opacity, controller.config().idle_opacity);
    }

    #[test]
    fn test_first_active_ignores_second_hand() {
        let (mut machine, mut controller) = setup(HandPolicy::FirstActive);
        machine.handle(&event(Handedness::Right, GestureKind::Activate), &mut controller);
        assert!(machine
            .handle(&event(Handedness::Left, GestureKind::Grab), &mut controller)
            .is_none());
        assert_eq!(machine.state(), Responding);

        // Owner leaving frees the object for either hand
        machine.handle(&event(Handedness::Right, GestureKind::Deactivate), &mut controller);
        machine.handle(&event(Handedness::Left, GestureKind::Activate), &mut controller);
        assert_eq!(machine.owner(), Some(Handedness::Left));
    }

    #[test]
    fn test_transfer_hands_object_over() {
        let (mut machine, mut controller) = setup(HandPolicy::Transfer);
        machine.handle(&event(Handedness::Right, GestureKind::Activate), &mut controller);
        machine.handle(&event(Handedness::Right, GestureKind::Grab), &mut controller);

        let handover = GestureEvent::new(Handedness::Left, GestureKind::Grab, (0.8, 0.7));
        assert!(machine.handle(&handover, &mut controller).is_none());
        assert_eq!(machine.state(), Grabbed);
        assert_eq!(machine.owner(), Some(Handedness::Left));
        assert_eq!(controller.target_properties().position, (0.8, 0.7));

        // The previous holder letting go no longer matters
        assert!(machine
            .handle(&event(Handedness::Right, GestureKind::Release), &mut controller)
            .is_none());
        assert_eq!(machine.state(), Grabbed);

        let signals = [signal(Handedness::Left, Some((0.75, 0.65)))];
        machine.track(&signals, &mut controller);
        assert_eq!(controller.target_properties().position, (0.75, 0.65));
    }

    #[test]
    fn test_left_only_policy() {
        let (mut machine, mut controller) = setup(HandPolicy::LeftOnly);
        assert!(machine
            .handle(&event(Handedness::Right, GestureKind::Activate), &mut controller)
            .is_none());
        assert!(machine
            .handle(&event(Handedness::Left, GestureKind::Activate), &mut controller)
            .is_some());
    }
}
