use super::{PluckOrchestrator, ShutdownReason};
use crate::error::{EventBusError, PluckError, Result};
use crate::events::{EventFilter, PluckEvent};
use crate::pipeline::TickReport;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tokio::signal;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, info_span, warn, Instrument};

impl PluckOrchestrator {
    /// Run the tick loop until the source ends, a signal arrives or the
    /// user quits
    pub async fn run(&mut self) -> Result<ShutdownReason> {
        let span = info_span!("session", id = %self.session_id);
        self.run_session().instrument(span).await
    }

    async fn run_session(&mut self) -> Result<ShutdownReason> {
        let shutdown_sender = self
            .shutdown_sender
            .take()
            .ok_or_else(|| PluckError::system("Shutdown sender already taken"))?;
        let mut shutdown_receiver = self
            .shutdown_receiver
            .take()
            .ok_or_else(|| PluckError::system("Shutdown receiver already taken"))?;

        let signal_tasks = self.setup_signal_handlers(shutdown_sender);
        let mut shutdown_events = self.event_bus.receiver(
            EventFilter::EventTypes(vec!["shutdown_requested"]),
            "runtime",
        );
        let cancellation_token = self.cancellation_token.clone();

        let tick_interval = self.config.tick_interval();
        let mut interval = time::interval(tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_tick: Option<Instant> = None;
        let mut signals_closed = false;

        info!(
            "Interaction loop running every {:?} from source '{}'",
            tick_interval,
            self.source.name()
        );

        let reason = loop {
            tokio::select! {
                _ = interval.tick() => {
                    let now = Instant::now();
                    let dt = last_tick.map_or(tick_interval, |last| now.duration_since(last));
                    last_tick = Some(now);

                    match self.step(dt).await {
                        Ok(Some(_)) => {}
                        Ok(None) => break ShutdownReason::SourceExhausted,
                        Err(e) => {
                            self.publish(PluckEvent::SystemError {
                                component: "source".to_string(),
                                error: e.to_string(),
                            })
                            .await;
                            break ShutdownReason::Error(e.to_string());
                        }
                    }
                }
                reason = &mut shutdown_receiver, if !signals_closed => match reason {
                    Ok(reason) => break reason,
                    Err(_) => {
                        warn!("Signal handlers unavailable");
                        signals_closed = true;
                    }
                },
                event = shutdown_events.recv() => match event {
                    Ok(PluckEvent::ShutdownRequested { .. }) => break ShutdownReason::UserRequest,
                    Ok(_) => {}
                    Err(EventBusError::Lagged { skipped }) => {
                        debug!("Shutdown watcher skipped {} events", skipped);
                    }
                    Err(e) => break ShutdownReason::Error(e.to_string()),
                },
                _ = cancellation_token.cancelled() => break ShutdownReason::UserRequest,
            }
        };

        for task in signal_tasks {
            task.abort();
        }

        info!("Shutdown initiated: {}", reason);
        self.shutdown().await?;

        Ok(reason)
    }

    /// Pull one tick from the source and run it through the pipeline.
    /// `Ok(None)` once the source is exhausted.
    pub async fn step(&mut self, dt: Duration) -> Result<Option<TickReport>> {
        let Some(frames) = self.source.next_frame().await? else {
            self.publish(PluckEvent::SourceExhausted {
                source: self.source.name().to_string(),
                timestamp: SystemTime::now(),
            })
            .await;
            return Ok(None);
        };

        let report = self.pipeline.tick(&frames, dt);

        for gesture in &report.events {
            self.publish(PluckEvent::gesture(*gesture)).await;
        }
        for transition in &report.transitions {
            self.publish(PluckEvent::state_changed(transition)).await;
        }

        self.presenter.present(&report);
        self.stats.record_tick(&report, dt);

        let every = self.config.system.stats_interval_ticks;
        if every > 0 && self.stats.ticks % every == 0 {
            info!(
                "{} ticks, {:.1} fps, {} gestures, {} transitions, state {}",
                self.stats.ticks,
                self.stats.fps(),
                self.stats.gesture_events,
                self.stats.transitions,
                report.state
            );
        }

        Ok(Some(report))
    }

    async fn publish(&self, event: PluckEvent) {
        if let Err(e) = self.event_bus.publish(event).await {
            debug!("Event not delivered: {}", e);
        }
    }

    /// Set up signal handlers for graceful shutdown
    fn setup_signal_handlers(
        &self,
        shutdown_sender: oneshot::Sender<ShutdownReason>,
    ) -> Vec<JoinHandle<()>> {
        let shutdown_sender = Arc::new(Mutex::new(Some(shutdown_sender)));
        let mut tasks = Vec::new();

        // SIGTERM - Unix only
        #[cfg(unix)]
        {
            let shutdown_sender_sigterm = Arc::clone(&shutdown_sender);
            tasks.push(tokio::spawn(async move {
                let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(sigterm) => sigterm,
                    Err(e) => {
                        error!("Failed to register SIGTERM handler: {}", e);
                        return;
                    }
                };
                if sigterm.recv().await.is_some() {
                    info!("Received SIGTERM signal");
                    if let Some(sender) = shutdown_sender_sigterm.lock().await.take() {
                        let _ = sender.send(ShutdownReason::Signal("SIGTERM".to_string()));
                    }
                }
            }));
        }

        // SIGINT (Ctrl+C) - Cross-platform
        let shutdown_sender_sigint = Arc::clone(&shutdown_sender);
        tasks.push(tokio::spawn(async move {
            if let Ok(()) = signal::ctrl_c().await {
                info!("Received SIGINT signal (Ctrl+C)");
                if let Some(sender) = shutdown_sender_sigint.lock().await.take() {
                    let _ = sender.send(ShutdownReason::Signal("SIGINT".to_string()));
                }
            }
        }));

        tasks
    }
}
