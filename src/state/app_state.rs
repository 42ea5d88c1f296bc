//! Main application state management

use std::{
    sync::{Arc, Mutex, Weak},
    time::Instant,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use super::{ResetPolicy, TimerEngine, TimerEvent, TimerMode, TimerSnapshot};
use crate::tasks::TokioTicker;

/// A completion that nobody has acknowledged yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub mode: TimerMode,
    pub completed_at: DateTime<Utc>,
}

/// Main application state that owns the timer engine
pub struct AppState {
    /// The single timer engine, driven by its own tokio tick task
    engine: Mutex<TimerEngine<TokioTicker>>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<String>>,
    last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Completion waiting for acknowledgement
    pending_completion: Mutex<Option<Completion>>,
    /// Every event the engine emits
    pub event_tx: broadcast::Sender<TimerEvent>,
    /// Latest snapshot
    pub snapshot_tx: watch::Sender<TimerSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    _snapshot_rx: watch::Receiver<TimerSnapshot>,
}

impl AppState {
    /// Create the state with a fresh paused Pomodoro
    ///
    /// Must be called from within a tokio runtime; starting the timer spawns a task.
    pub fn new(port: u16, host: String, reset_policy: ResetPolicy) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<AppState>| {
            let weak = weak.clone();
            let ticker = TokioTicker::new(move |epoch| {
                if let Some(state) = weak.upgrade() {
                    state.handle_tick(epoch);
                }
            });

            let engine = TimerEngine::with_reset_policy(ticker, reset_policy);
            let (event_tx, _) = broadcast::channel(100);
            let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());

            Self {
                engine: Mutex::new(engine),
                start_time: Instant::now(),
                port,
                host,
                last_action: Mutex::new(None),
                last_action_time: Mutex::new(None),
                pending_completion: Mutex::new(None),
                event_tx,
                snapshot_tx,
                _snapshot_rx: snapshot_rx,
            }
        })
    }

    /// Run an engine operation and publish what it emitted
    pub fn apply<F>(&self, action: &str, operation: F) -> Result<TimerSnapshot, String>
    where
        F: FnOnce(&mut TimerEngine<TokioTicker>),
    {
        let mut engine = self.engine.lock()
            .map_err(|e| format!("Failed to lock timer engine: {}", e))?;

        operation(&mut *engine);
        let snapshot = engine.snapshot();
        let events = engine.drain_events();
        // Publish under the lock so observers see events in engine order
        self.publish(events);
        drop(engine);

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        Ok(snapshot)
    }

    pub fn start(&self) -> Result<TimerSnapshot, String> {
        self.apply("start", |engine| engine.start())
    }

    pub fn pause(&self) -> Result<TimerSnapshot, String> {
        self.apply("pause", |engine| engine.pause())
    }

    pub fn reset(&self) -> Result<TimerSnapshot, String> {
        self.apply("reset", |engine| engine.reset())
    }

    pub fn set_mode(&self, mode: TimerMode) -> Result<TimerSnapshot, String> {
        self.apply(&format!("mode:{}", mode), |engine| engine.set_mode(mode))
    }

    /// Called by the tick task once per second
    pub fn handle_tick(&self, epoch: u64) {
        let mut engine = match self.engine.lock() {
            Ok(engine) => engine,
            Err(e) => {
                tracing::error!("Failed to lock timer engine for tick: {}", e);
                return;
            }
        };

        engine.scheduled_tick(epoch);
        let events = engine.drain_events();
        self.publish(events);
    }

    /// Get current timer snapshot
    pub fn get_snapshot(&self) -> Result<TimerSnapshot, String> {
        self.engine.lock()
            .map(|engine| engine.snapshot())
            .map_err(|e| format!("Failed to lock timer engine: {}", e))
    }

    /// Which duration reset restores
    pub fn get_reset_policy(&self) -> Result<ResetPolicy, String> {
        self.engine.lock()
            .map(|engine| engine.reset_policy())
            .map_err(|e| format!("Failed to lock timer engine: {}", e))
    }

    /// Get the completion waiting for acknowledgement, if any
    pub fn get_pending_completion(&self) -> Result<Option<Completion>, String> {
        self.pending_completion.lock()
            .map(|pending| pending.clone())
            .map_err(|e| format!("Failed to lock pending completion: {}", e))
    }

    /// Acknowledge the pending completion, returning it
    pub fn acknowledge_completion(&self) -> Result<Option<Completion>, String> {
        let mut pending = self.pending_completion.lock()
            .map_err(|e| format!("Failed to lock pending completion: {}", e))?;

        let acknowledged = pending.take();
        if let Some(completion) = &acknowledged {
            info!("Completion of {} acknowledged", completion.mode);
        }
        Ok(acknowledged)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.event_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    fn publish(&self, events: Vec<TimerEvent>) {
        for event in events {
            match &event {
                TimerEvent::Updated { snapshot } => {
                    self.snapshot_tx.send_replace(snapshot.clone());
                }
                TimerEvent::Completed { mode } => {
                    if let Ok(mut pending) = self.pending_completion.lock() {
                        *pending = Some(Completion { mode: *mode, completed_at: Utc::now() });
                    }
                }
                TimerEvent::ModeSelected { .. } => {}
            }

            if self.event_tx.send(event).is_err() {
                debug!("No event subscribers");
            }
        }
    }
}
