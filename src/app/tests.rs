use super::*;
use crate::config::PluckConfig;
use crate::error::{PluckError, Result};
use crate::events::PluckEvent;
use crate::gesture::GestureKind;
use crate::interaction::InteractionState;
use crate::landmarks::{Handedness, LandmarkFrame};
use crate::pipeline::TickReport;
use crate::source::{LandmarkSource, ScriptedSource};
use crate::testing::{open_hand, test_config};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn create_test_config() -> PluckConfig {
    let mut config = test_config();
    config.source.fps = 200;
    config
}

/// Keeps every state it is shown
#[derive(Clone, Default)]
struct RecordingPresenter {
    states: Arc<Mutex<Vec<InteractionState>>>,
    finished: Arc<Mutex<bool>>,
}

impl Presenter for RecordingPresenter {
    fn present(&mut self, report: &TickReport) {
        self.states.lock().unwrap().push(report.state);
    }

    fn finish(&mut self) {
        *self.finished.lock().unwrap() = true;
    }
}

/// Never runs out, never sees a hand
struct EmptyRoom;

#[async_trait]
impl LandmarkSource for EmptyRoom {
    fn name(&self) -> &str {
        "empty_room"
    }

    async fn next_frame(&mut self) -> Result<Option<Vec<LandmarkFrame>>> {
        Ok(Some(Vec::new()))
    }
}

fn open_then_leave() -> ScriptedSource {
    let open = open_hand(Handedness::Right, 0.15);
    let mut ticks = vec![vec![open]; 3];
    ticks.extend(vec![Vec::new(); 2]);
    ScriptedSource::new("open_then_leave", ticks)
}

fn orchestrator_with(source: Box<dyn LandmarkSource>) -> (PluckOrchestrator, RecordingPresenter) {
    let presenter = RecordingPresenter::default();
    let orchestrator =
        PluckOrchestrator::new(create_test_config(), source, Box::new(presenter.clone())).unwrap();
    (orchestrator, presenter)
}

#[tokio::test]
async fn test_orchestrator_creation() {
    let (orchestrator, _) = orchestrator_with(Box::new(open_then_leave()));
    assert_eq!(orchestrator.stats().ticks, 0);
    assert_eq!(orchestrator.pipeline().state(), InteractionState::Idle);
    assert!(!orchestrator.cancellation_token().is_cancelled());
}

#[tokio::test]
async fn test_invalid_config_rejected() {
    let mut config = create_test_config();
    config.object.min_scale = 3.0;
    let result = PluckOrchestrator::new(
        config,
        Box::new(open_then_leave()),
        Box::new(LogPresenter::new()),
    );
    assert!(matches!(result, Err(PluckError::InvalidConfig { .. })));
}

#[tokio::test]
async fn test_run_until_source_exhausted() {
    let (mut orchestrator, presenter) = orchestrator_with(Box::new(open_then_leave()));
    orchestrator.start().await.unwrap();

    let reason = orchestrator.run().await.unwrap();
    assert_eq!(reason, ShutdownReason::SourceExhausted);
    assert_eq!(reason.exit_code(), 0);

    let states = presenter.states.lock().unwrap().clone();
    assert_eq!(states.len(), 5);
    assert_eq!(states[0], InteractionState::Idle);
    assert_eq!(states[1], InteractionState::Responding);
    assert_eq!(orchestrator.stats().ticks, 5);
    // Activate, then Release once the hand is confirmed gone
    assert_eq!(orchestrator.stats().gesture_events, 2);
    assert!(*presenter.finished.lock().unwrap());
}

#[tokio::test]
async fn test_run_publishes_events() {
    let (mut orchestrator, _) = orchestrator_with(Box::new(open_then_leave()));
    let mut events = orchestrator.event_bus().subscribe();

    orchestrator.run().await.unwrap();

    let mut types = Vec::new();
    let mut activated = false;
    while let Ok(event) = events.try_recv() {
        if let PluckEvent::GestureDetected { gesture, .. } = &event {
            activated |= gesture.kind == GestureKind::Activate;
        }
        types.push(event.event_type());
    }

    assert!(activated);
    assert!(types.contains(&"state_changed"));
    assert_eq!(types.last(), Some(&"source_exhausted"));
}

#[tokio::test]
async fn test_cancellation_stops_endless_source() {
    let (mut orchestrator, _) = orchestrator_with(Box::new(EmptyRoom));
    let token = orchestrator.cancellation_token();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let reason = tokio::time::timeout(Duration::from_secs(5), orchestrator.run())
        .await
        .expect("run should stop once cancelled")
        .unwrap();
    assert_eq!(reason, ShutdownReason::UserRequest);
    assert!(orchestrator.stats().ticks > 0);
}

#[tokio::test]
async fn test_shutdown_event_stops_loop() {
    let (mut orchestrator, _) = orchestrator_with(Box::new(EmptyRoom));
    let event_bus = orchestrator.event_bus();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let _ = event_bus.publish(PluckEvent::shutdown("test")).await;
    });

    let reason = tokio::time::timeout(Duration::from_secs(5), orchestrator.run())
        .await
        .expect("run should stop on shutdown request")
        .unwrap();
    assert_eq!(reason, ShutdownReason::UserRequest);
}

#[tokio::test]
async fn test_step_reports_exhaustion() {
    let source = ScriptedSource::new("single", vec![Vec::new()]);
    let (mut orchestrator, _) = orchestrator_with(Box::new(source));
    let dt = Duration::from_millis(5);

    let report = orchestrator.step(dt).await.unwrap();
    assert!(report.is_some());
    assert!(orchestrator.step(dt).await.unwrap().is_none());
    assert_eq!(orchestrator.stats().ticks, 1);
}

#[tokio::test]
async fn test_run_twice_fails() {
    let (mut orchestrator, _) = orchestrator_with(Box::new(open_then_leave()));
    orchestrator.run().await.unwrap();
    assert!(matches!(
        orchestrator.run().await,
        Err(PluckError::System { .. })
    ));
}
