use crate::config::PluckConfig;
use crate::error::Result;
use crate::gesture::{GestureDetector, GestureEvent, HandObservation, HandSignal};
use crate::interaction::{InteractionState, InteractionStateMachine, Transition};
use crate::landmarks::{Handedness, LandmarkFrame};
use crate::object::{ObjectController, ObjectSnapshot};
use crate::pose::PoseClassifier;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Everything one tick produced
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub events: Vec<GestureEvent>,
    pub transitions: Vec<Transition>,
    pub signals: Vec<HandSignal>,
    pub state: InteractionState,
    pub object: ObjectSnapshot,
}

/// Classifier, detector, state machine and object controller composed into
/// one synchronous tick
pub struct InteractionPipeline {
    classifier: PoseClassifier,
    detector: GestureDetector,
    machine: InteractionStateMachine,
    controller: ObjectController,
}

impl InteractionPipeline {
    /// Validate `config` and build the pipeline
    pub fn new(config: &PluckConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            classifier: PoseClassifier::from_config(config),
            detector: GestureDetector::new(config.detector.clone()),
            machine: InteractionStateMachine::new(config.interaction.policy),
            controller: ObjectController::new(config.object.clone()),
        })
    }

    /// Run one tick over this frame's detections. Hands missing from
    /// `frames` are absent; `dt` is the time since the previous tick.
    pub fn tick(&mut self, frames: &[LandmarkFrame], dt: Duration) -> TickReport {
        let observations: Vec<HandObservation<'_>> = Handedness::ALL
            .iter()
            .map(|&hand| {
                // Keep the most confident detection if a hand shows up twice
                let frame = frames
                    .iter()
                    .filter(|f| f.handedness == hand && f.confidence.is_finite())
                    .max_by(|a, b| a.confidence.total_cmp(&b.confidence));
                HandObservation {
                    hand,
                    pose: self.classifier.classify(frame),
                    frame,
                }
            })
            .collect();

        let events = self.detector.update(&observations);
        let signals = self.detector.signals();

        let mut transitions = Vec::new();
        for event in &events {
            debug!(event = %event, "Gesture");
            if let Some(transition) = self.machine.handle(event, &mut self.controller) {
                transitions.push(transition);
            }
        }

        self.machine.track(&signals, &mut self.controller);
        self.controller.tick(dt);

        TickReport {
            events,
            transitions,
            signals,
            state: self.machine.state(),
            object: self.controller.current_properties(),
        }
    }

    pub fn state(&self) -> InteractionState {
        self.machine.state()
    }

    pub fn object(&self) -> ObjectSnapshot {
        self.controller.current_properties()
    }

    pub fn controller(&self) -> &ObjectController {
        &self.controller
    }

    pub fn detector(&self) -> &GestureDetector {
        &self.detector
    }

    pub fn machine(&self) -> &InteractionStateMachine {
        &self.machine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PluckError;
    use crate::gesture::GestureKind;
    use crate::source::{synthetic_hand, HandShape};
    use crate::testing::{fist_hand, open_hand, pinch_hand, test_config, DEFAULT_CENTER};
    use InteractionState::*;

    const DT: Duration = Duration::from_millis(33);

    fn run(pipeline: &mut InteractionPipeline, frame: Option<&LandmarkFrame>, n: usize) -> Vec<TickReport> {
        let frames: Vec<LandmarkFrame> = frame.into_iter().cloned().collect();
        (0..n).map(|_| pipeline.tick(&frames, DT)).collect()
    }

    fn kinds(reports: &[TickReport]) -> Vec<GestureKind> {
        reports
            .iter()
            .flat_map(|r| r.events.iter().map(|e| e.kind))
            .collect()
    }

    fn pipeline() -> InteractionPipeline {
        InteractionPipeline::new(&test_config()).unwrap()
    }

    fn open_at(width: f32) -> LandmarkFrame {
        synthetic_hand(Handedness::Right, HandShape::Open, DEFAULT_CENTER, width)
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let mut config = test_config();
        config.detector.confirm_frames = config.detector.history_len + 1;
        assert!(matches!(
            InteractionPipeline::new(&config),
            Err(PluckError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_open_hand_activates() {
        let mut pipeline = pipeline();
        let open = open_hand(Handedness::Right, 0.15);

        let reports = run(&mut pipeline, Some(&open), 1);
        assert_eq!(reports[0].state, Idle);

        let reports = run(&mut pipeline, Some(&open), 1);
        assert_eq!(kinds(&reports), vec![GestureKind::Activate]);
        assert_eq!(reports[0].state, Responding);
        assert_eq!(reports[0].transitions.len(), 1);
        assert_eq!(
            pipeline.controller().target_properties().opacity,
            pipeline.controller().config().responding_opacity
        );
    }

    #[test]
    fn test_pull_attracts_and_grows() {
        let mut pipeline = pipeline();
        run(&mut pipeline, Some(&open_at(0.12)), 3);
        assert_eq!(pipeline.state(), Responding);
        let base = pipeline.controller().target_properties().scale;

        // Depth proxy climbs past the pull threshold
        let mut width = 0.12;
        for _ in 0..6 {
            width += 0.01;
            run(&mut pipeline, Some(&open_at(width)), 1);
        }
        assert_eq!(pipeline.state(), Attracted);
        assert!(pipeline.controller().target_properties().scale > base);
    }

    #[test]
    fn test_pinch_grabs_and_object_follows_hand() {
        let mut pipeline = pipeline();
        run(&mut pipeline, Some(&open_at(0.12)), 3);
        run(&mut pipeline, Some(&open_at(0.2)), 2);
        assert_eq!(pipeline.state(), Attracted);

        let pinch = |center| synthetic_hand(Handedness::Right, HandShape::Pinch, center, 0.2);
        let reports = run(&mut pipeline, Some(&pinch(DEFAULT_CENTER)), 2);
        assert!(kinds(&reports).contains(&GestureKind::Grab));
        assert_eq!(pipeline.state(), Grabbed);

        for step in 1..=5 {
            let center = (0.5 - 0.04 * step as f32, 0.55 - 0.03 * step as f32);
            run(&mut pipeline, Some(&pinch(center)), 1);
            let target = pipeline.controller().target_properties().position;
            assert!((target.0 - center.0).abs() < 1e-5);
            assert!((target.1 - center.1).abs() < 1e-5);
        }

        // Current position moves towards the hand
        let object = pipeline.object();
        assert!(object.position.0 < 0.5);
        assert!(object.position.1 < 0.55);
    }

    #[test]
    fn test_hand_leaving_while_grabbed_releases() {
        let mut pipeline = pipeline();
        let open = open_hand(Handedness::Right, 0.15);
        let pinch = pinch_hand(Handedness::Right, 0.15);
        run(&mut pipeline, Some(&open), 3);
        run(&mut pipeline, Some(&pinch), 3);
        assert_eq!(pipeline.state(), Grabbed);

        let reports = run(&mut pipeline, None, 2);
        assert_eq!(kinds(&reports), vec![GestureKind::Release]);
        assert_eq!(pipeline.state(), Responding);
        assert_eq!(
            pipeline.controller().target_properties().position,
            pipeline.controller().config().anchor
        );
    }

    #[test]
    fn test_absence_reaches_idle_exactly_once() {
        let mut pipeline = pipeline();
        run(&mut pipeline, Some(&open_hand(Handedness::Right, 0.15)), 3);
        assert_eq!(pipeline.state(), Responding);

        let reports = run(&mut pipeline, None, 30);
        let idle_entries = reports
            .iter()
            .flat_map(|r| &r.transitions)
            .filter(|t| t.to == Idle)
            .count();
        assert_eq!(idle_entries, 1);
        assert_eq!(
            kinds(&reports)
                .iter()
                .filter(|k| **k == GestureKind::Deactivate)
                .count(),
            1
        );
        assert_eq!(pipeline.state(), Idle);
    }

    #[test]
    fn test_single_frame_glitch_changes_nothing() {
        let mut pipeline = pipeline();
        let open = open_hand(Handedness::Right, 0.15);
        run(&mut pipeline, Some(&open), 4);

        for glitch in [Some(pinch_hand(Handedness::Right, 0.15)), Some(fist_hand(Handedness::Right, 0.15)), None] {
            let reports = run(&mut pipeline, glitch.as_ref(), 1);
            assert!(reports[0].events.is_empty());
            let reports = run(&mut pipeline, Some(&open), 2);
            assert!(reports.iter().all(|r| r.events.is_empty()));
            assert_eq!(pipeline.state(), Responding);
        }
    }

    #[test]
    fn test_low_confidence_frames_count_as_absent() {
        let mut pipeline = pipeline();
        let mut weak = open_hand(Handedness::Right, 0.15);
        weak.confidence = 0.3;
        let reports = run(&mut pipeline, Some(&weak), 10);
        assert!(kinds(&reports).is_empty());
        assert_eq!(pipeline.state(), Idle);
    }

    #[test]
    fn test_duplicate_detections_keep_most_confident() {
        let mut pipeline = pipeline();
        let mut weak_pinch = pinch_hand(Handedness::Right, 0.15);
        weak_pinch.confidence = 0.75;
        let open = open_hand(Handedness::Right, 0.15);
        let frames = vec![weak_pinch, open];

        pipeline.tick(&frames, DT);
        let report = pipeline.tick(&frames, DT);
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].kind, GestureKind::Activate);
    }

    #[test]
    fn test_nan_confidence_duplicate_is_skipped() {
        let mut pipeline = pipeline();
        let mut broken_pinch = pinch_hand(Handedness::Right, 0.15);
        broken_pinch.confidence = f32::NAN;
        let frames = vec![open_hand(Handedness::Right, 0.15), broken_pinch];

        pipeline.tick(&frames, DT);
        let report = pipeline.tick(&frames, DT);
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].kind, GestureKind::Activate);
    }

    #[test]
    fn test_full_interaction_cycle_settles_back_at_rest() {
        let mut pipeline = pipeline();
        let pinch = pinch_hand(Handedness::Right, 0.15);
        run(&mut pipeline, Some(&open_at(0.12)), 3);
        run(&mut pipeline, Some(&open_at(0.2)), 2);
        run(&mut pipeline, Some(&pinch), 3);
        run(&mut pipeline, Some(&open_at(0.2)), 3);
        assert_eq!(pipeline.state(), Responding);
        run(&mut pipeline, None, 200);
        assert_eq!(pipeline.state(), Idle);

        let config = pipeline.controller().config().clone();
        let object = pipeline.object();
        assert!(pipeline.controller().is_settled());
        assert_eq!(object.position, config.anchor);
        assert_eq!(object.scale, config.base_scale);
        assert_eq!(object.opacity, config.idle_opacity);
    }
}
