use crate::error::EventBusError;
use crate::gesture::GestureEvent;
use crate::interaction::{InteractionState, Transition};
use crate::landmarks::Handedness;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Events published by the runtime for observers outside the tick loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PluckEvent {
    /// A debounced gesture was detected
    GestureDetected {
        gesture: GestureEvent,
        timestamp: SystemTime,
    },
    /// The interaction state machine changed state
    StateChanged {
        from: InteractionState,
        to: InteractionState,
        hand: Handedness,
        timestamp: SystemTime,
    },
    /// The landmark source has no more frames
    SourceExhausted {
        source: String,
        timestamp: SystemTime,
    },
    /// A system error occurred in a component
    SystemError { component: String, error: String },
    /// System shutdown requested
    ShutdownRequested {
        timestamp: SystemTime,
        reason: String,
    },
}

impl PluckEvent {
    pub fn gesture(gesture: GestureEvent) -> Self {
        PluckEvent::GestureDetected {
            gesture,
            timestamp: SystemTime::now(),
        }
    }

    pub fn state_changed(transition: &Transition) -> Self {
        PluckEvent::StateChanged {
            from: transition.from,
            to: transition.to,
            hand: transition.cause.hand,
            timestamp: SystemTime::now(),
        }
    }

    pub fn shutdown<S: Into<String>>(reason: S) -> Self {
        PluckEvent::ShutdownRequested {
            timestamp: SystemTime::now(),
            reason: reason.into(),
        }
    }

    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            PluckEvent::GestureDetected { gesture, .. } => format!("Gesture: {}", gesture),
            PluckEvent::StateChanged { from, to, hand, .. } => {
                format!("State {} -> {} ({} hand)", from, to, hand)
            }
            PluckEvent::SourceExhausted { source, .. } => {
                format!("Source '{}' exhausted", source)
            }
            PluckEvent::SystemError { component, error } => {
                format!("Error in {}: {}", component, error)
            }
            PluckEvent::ShutdownRequested { reason, .. } => {
                format!("Shutdown requested: {}", reason)
            }
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            PluckEvent::GestureDetected { .. } => "gesture_detected",
            PluckEvent::StateChanged { .. } => "state_changed",
            PluckEvent::SourceExhausted { .. } => "source_exhausted",
            PluckEvent::SystemError { .. } => "system_error",
            PluckEvent::ShutdownRequested { .. } => "shutdown_requested",
        }
    }
}

/// Async event bus for component coordination using broadcast channels
pub struct EventBus {
    sender: broadcast::Sender<PluckEvent>,
}

impl EventBus {
    /// Create a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events and get a receiver
    pub fn subscribe(&self) -> broadcast::Receiver<PluckEvent> {
        self.sender.subscribe()
    }

    /// Subscribe with a filter
    pub fn receiver<S: Into<String>>(&self, filter: EventFilter, name: S) -> EventReceiver {
        EventReceiver::new(self.subscribe(), filter, name.into())
    }

    /// Publish an event to all subscribers
    pub async fn publish(&self, event: PluckEvent) -> Result<usize, EventBusError> {
        debug!("Publishing event: {}", event.description());

        match &event {
            PluckEvent::SystemError { component, error } => {
                error!("System error in {}: {}", component, error);
            }
            PluckEvent::SourceExhausted { source, .. } => {
                info!("Landmark source '{}' exhausted", source);
            }
            PluckEvent::ShutdownRequested { reason, .. } => {
                info!("Shutdown requested: {}", reason);
            }
            _ => {}
        }

        self.sender
            .send(event)
            .map_err(|e| EventBusError::PublishFailed {
                details: e.to_string(),
            })
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

/// Event filter for selective event handling
#[derive(Debug, Clone)]
pub enum EventFilter {
    /// Accept all events
    All,
    /// Accept only specific event types
    EventTypes(Vec<&'static str>),
}

impl EventFilter {
    /// Check if an event passes this filter
    pub fn matches(&self, event: &PluckEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::EventTypes(types) => types.contains(&event.event_type()),
        }
    }
}

/// Event receiver with filtering
pub struct EventReceiver {
    receiver: broadcast::Receiver<PluckEvent>,
    filter: EventFilter,
    name: String,
}

impl EventReceiver {
    /// Create a new event receiver with a filter
    pub fn new(
        receiver: broadcast::Receiver<PluckEvent>,
        filter: EventFilter,
        name: String,
    ) -> Self {
        Self {
            receiver,
            filter,
            name,
        }
    }

    /// Receive the next filtered event
    pub async fn recv(&mut self) -> Result<PluckEvent, EventBusError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        debug!(
                            "Receiver '{}' received event: {}",
                            self.name,
                            event.description()
                        );
                        return Ok(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Receiver '{}' lagged behind by {} events", self.name, skipped);
                    return Err(EventBusError::Lagged { skipped });
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Event bus closed for receiver '{}'", self.name);
                    return Err(EventBusError::ChannelClosed);
                }
            }
        }
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Result<Option<PluckEvent>, EventBusError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        return Ok(Some(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => {
                    return Ok(None);
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!("Receiver '{}' lagged behind by {} events", self.name, skipped);
                    return Err(EventBusError::Lagged { skipped });
                }
                Err(broadcast::error::TryRecvError::Closed) => {
                    debug!("Event bus closed for receiver '{}'", self.name);
                    return Err(EventBusError::ChannelClosed);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::GestureKind;
    use tokio::time::{timeout, Duration};

    fn grab(hand: Handedness) -> PluckEvent {
        PluckEvent::gesture(GestureEvent::new(hand, GestureKind::Grab, (0.5, 0.5)))
    }

    #[tokio::test]
    async fn test_event_bus_basic_operations() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();

        let subscriber_count = event_bus.publish(grab(Handedness::Right)).await.unwrap();
        assert_eq!(subscriber_count, 1);

        match receiver.recv().await.unwrap() {
            PluckEvent::GestureDetected { gesture, .. } => {
                assert_eq!(gesture.kind, GestureKind::Grab);
                assert_eq!(gesture.hand, Handedness::Right);
            }
            other => panic!("Unexpected event type: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_fails() {
        let event_bus = EventBus::new(10);
        assert!(matches!(
            event_bus.publish(PluckEvent::shutdown("test")).await,
            Err(EventBusError::PublishFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let event_bus = EventBus::new(10);
        let mut receiver1 = event_bus.subscribe();
        let mut receiver2 = event_bus.subscribe();

        let delivered = event_bus.publish(PluckEvent::shutdown("test")).await.unwrap();
        assert_eq!(delivered, 2);

        let _ = timeout(Duration::from_millis(100), receiver1.recv())
            .await
            .unwrap()
            .unwrap();
        let _ = timeout(Duration::from_millis(100), receiver2.recv())
            .await
            .unwrap()
            .unwrap();
    }

    #[test]
    fn test_event_filter() {
        let types = EventFilter::EventTypes(vec!["shutdown_requested"]);
        assert!(types.matches(&PluckEvent::shutdown("q")));
        assert!(!types.matches(&grab(Handedness::Left)));

        assert!(EventFilter::All.matches(&grab(Handedness::Left)));
    }

    #[tokio::test]
    async fn test_filtered_receiver_skips_other_events() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.receiver(
            EventFilter::EventTypes(vec!["shutdown_requested"]),
            "shutdown-watch",
        );

        event_bus.publish(grab(Handedness::Right)).await.unwrap();
        event_bus.publish(PluckEvent::shutdown("done")).await.unwrap();

        let event = timeout(Duration::from_millis(100), receiver.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.event_type(), "shutdown_requested");
        assert!(receiver.try_recv().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lagged_receiver_reports_skipped() {
        let event_bus = EventBus::new(2);
        let mut receiver = event_bus.receiver(EventFilter::All, "slow");

        for _ in 0..5 {
            event_bus.publish(grab(Handedness::Left)).await.unwrap();
        }

        assert!(matches!(
            receiver.try_recv(),
            Err(EventBusError::Lagged { skipped: 3 })
        ));
    }

    #[test]
    fn test_state_changed_from_transition() {
        let transition = Transition {
            from: InteractionState::Idle,
            to: InteractionState::Responding,
            cause: GestureEvent::new(Handedness::Right, GestureKind::Activate, (0.5, 0.5)),
        };
        let event = PluckEvent::state_changed(&transition);
        assert_eq!(event.event_type(), "state_changed");
        assert_eq!(event.description(), "State idle -> responding (right hand)");
    }
}
