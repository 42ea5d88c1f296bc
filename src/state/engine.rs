//! Countdown state machine and its tick scheduling seam

use std::time::Duration;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{TimerMode, TimerSnapshot, TimerState};

/// Period of the repeating tick source
pub const TICK_PERIOD: Duration = Duration::from_millis(1000);

/// Something that can arm a repeating tick source
///
/// Each armed source must deliver `epoch` back to
/// [`TimerEngine::scheduled_tick`] once per `period` until cancelled.
pub trait TickScheduler {
    type Handle: TickHandle;

    fn schedule(&mut self, period: Duration, epoch: u64) -> Self::Handle;
}

/// Cancellation handle for an armed tick source
pub trait TickHandle {
    fn cancel(self);
}

/// Which duration `reset()` restores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ResetPolicy {
    /// Always restore the Pomodoro duration, whatever the current mode
    #[default]
    Pomodoro,
    /// Restore the duration of the current mode
    CurrentMode,
}

/// Outputs emitted by the engine on every state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TimerEvent {
    /// Display text and title changed (or were re-emitted)
    Updated { snapshot: TimerSnapshot },
    /// A mode selector became the active one
    ModeSelected { mode: TimerMode },
    /// The countdown reached zero
    Completed { mode: TimerMode },
}

/// Pomodoro countdown state machine
pub struct TimerEngine<S: TickScheduler> {
    state: TimerState,
    scheduler: S,
    tick_source: Option<S::Handle>,
    epoch: u64,
    reset_policy: ResetPolicy,
    events: Vec<TimerEvent>,
}

impl<S: TickScheduler> TimerEngine<S> {
    pub fn new(scheduler: S) -> Self {
        Self::with_reset_policy(scheduler, ResetPolicy::default())
    }

    pub fn with_reset_policy(scheduler: S, reset_policy: ResetPolicy) -> Self {
        Self {
            state: TimerState::new(),
            scheduler,
            tick_source: None,
            epoch: 0,
            reset_policy,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        self.state.snapshot()
    }

    pub fn reset_policy(&self) -> ResetPolicy {
        self.reset_policy
    }

    /// Arm the tick source unless already running
    pub fn start(&mut self) {
        if self.state.is_running {
            debug!("Start ignored, timer already running");
            return;
        }
        if self.state.remaining_seconds == 0 {
            debug!("Start ignored, nothing left to count down");
            self.emit_update();
            return;
        }

        self.epoch = self.epoch.wrapping_add(1);
        self.tick_source = Some(self.scheduler.schedule(TICK_PERIOD, self.epoch));
        self.state.is_running = true;

        info!("Timer started: mode={}, remaining={}", self.state.mode, self.state.display());
        self.emit_update();
    }

    /// Stop counting down; safe to call while paused
    pub fn pause(&mut self) {
        if self.state.is_running {
            info!("Timer paused at {}", self.state.display());
        }
        self.halt();
        self.emit_update();
    }

    /// Stop and restore the duration chosen by the reset policy
    pub fn reset(&mut self) {
        self.halt();
        let target = match self.reset_policy {
            ResetPolicy::Pomodoro => TimerMode::Pomodoro,
            ResetPolicy::CurrentMode => self.state.mode,
        };
        self.state.remaining_seconds = target.duration_seconds();

        info!("Timer reset to {} ({} mode active)", self.state.display(), self.state.mode);
        self.emit_update();
    }

    /// Stop and switch to the full duration of `mode`
    pub fn set_mode(&mut self, mode: TimerMode) {
        self.halt();
        self.state.mode = mode;
        self.state.remaining_seconds = mode.duration_seconds();

        info!("Timer mode set to {}", mode);
        self.events.push(TimerEvent::ModeSelected { mode });
        self.emit_update();
    }

    /// Count down one second
    pub fn tick(&mut self) {
        if !self.state.is_running {
            debug!("Tick ignored, timer not running");
            return;
        }

        self.state.remaining_seconds = self.state.remaining_seconds.saturating_sub(1);

        if self.state.remaining_seconds == 0 {
            self.halt();
            self.emit_update();
            info!("Timer completed: mode={}", self.state.mode);
            self.events.push(TimerEvent::Completed { mode: self.state.mode });
        } else {
            self.emit_update();
        }
    }

    /// Tick delivered by a scheduler; ticks from a cancelled source are dropped
    pub fn scheduled_tick(&mut self, epoch: u64) {
        if epoch != self.epoch || self.tick_source.is_none() {
            debug!("Dropping stale tick: epoch={}, current={}", epoch, self.epoch);
            return;
        }
        self.tick();
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<TimerEvent> {
        std::mem::take(&mut self.events)
    }

    fn halt(&mut self) {
        if let Some(handle) = self.tick_source.take() {
            handle.cancel();
            debug!("Tick source cancelled (epoch {})", self.epoch);
        }
        self.state.is_running = false;
    }

    fn emit_update(&mut self) {
        self.events.push(TimerEvent::Updated { snapshot: self.state.snapshot() });
    }
}

impl<S: TickScheduler> Drop for TimerEngine<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.tick_source.take() {
            handle.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        cell::RefCell,
        rc::Rc,
    };

    /// Scheduler that only records what was armed and cancelled
    #[derive(Default, Clone)]
    struct ManualScheduler {
        log: Rc<RefCell<ScheduleLog>>,
    }

    #[derive(Default, Debug)]
    struct ScheduleLog {
        pub armed: Vec<u64>,
        pub cancelled: Vec<u64>,
    }

    impl ScheduleLog {
        pub fn active(&self) -> usize {
            self.armed.len() - self.cancelled.len()
        }
    }

    struct ManualHandle {
        epoch: u64,
        log: Rc<RefCell<ScheduleLog>>,
    }

    impl TickScheduler for ManualScheduler {
        type Handle = ManualHandle;

        fn schedule(&mut self, period: Duration, epoch: u64) -> ManualHandle {
            assert_eq!(period, TICK_PERIOD);
            self.log.borrow_mut().armed.push(epoch);
            ManualHandle { epoch, log: Rc::clone(&self.log) }
        }
    }

    impl TickHandle for ManualHandle {
        fn cancel(self) {
            self.log.borrow_mut().cancelled.push(self.epoch);
        }
    }

    fn engine() -> (TimerEngine<ManualScheduler>, Rc<RefCell<ScheduleLog>>) {
        let scheduler = ManualScheduler::default();
        let log = Rc::clone(&scheduler.log);
        (TimerEngine::new(scheduler), log)
    }

    /// Deliver `n` ticks the way the armed source would
    fn advance(engine: &mut TimerEngine<ManualScheduler>, log: &Rc<RefCell<ScheduleLog>>, n: u64) {
        for _ in 0..n {
            let epoch = log.borrow().armed.last().copied().unwrap_or(0);
            engine.scheduled_tick(epoch);
        }
    }

    fn completions(events: &[TimerEvent]) -> usize {
        events.iter().filter(|e| matches!(e, TimerEvent::Completed { .. })).count()
    }

    #[test]
    fn starts_as_paused_pomodoro() {
        let (engine, _) = engine();
        assert_eq!(engine.state(), &TimerState::new());
        assert_eq!(engine.snapshot().display, "25:00");
        assert_eq!(engine.snapshot().title, "Pomodoro Timer");
    }

    #[test]
    fn set_mode_loads_full_duration_and_stops() {
        let (mut engine, log) = engine();
        for mode in TimerMode::ALL {
            engine.start();
            engine.set_mode(mode);
            assert_eq!(engine.state().remaining_seconds, mode.duration_seconds());
            assert!(!engine.state().is_running);
            assert_eq!(log.borrow().active(), 0);
        }

        let events = engine.drain_events();
        assert!(events.contains(&TimerEvent::ModeSelected { mode: TimerMode::LongBreak }));
    }

    #[test]
    fn double_start_arms_one_source() {
        let (mut engine, log) = engine();
        engine.start();
        engine.start();
        assert_eq!(log.borrow().armed.len(), 1);

        advance(&mut engine, &log, 7);
        assert_eq!(engine.state().remaining_seconds, 1500 - 7);
    }

    #[test]
    fn start_updates_title_immediately() {
        let (mut engine, _) = engine();
        engine.start();
        let events = engine.drain_events();
        assert_eq!(
            events.last(),
            Some(&TimerEvent::Updated { snapshot: engine.snapshot() })
        );
        assert_eq!(engine.snapshot().title, "Pomodoro - 25:00");
    }

    #[test]
    fn pause_halts_decrementing() {
        let (mut engine, log) = engine();
        engine.start();
        advance(&mut engine, &log, 3);
        engine.pause();
        assert_eq!(log.borrow().active(), 0);

        let before = engine.snapshot();
        engine.drain_events();
        engine.scheduled_tick(1);
        engine.tick();
        assert_eq!(engine.snapshot(), before);
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn pause_while_paused_reemits_title() {
        let (mut engine, log) = engine();
        engine.pause();
        engine.pause();
        assert!(log.borrow().cancelled.is_empty());

        let events = engine.drain_events();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| matches!(
            e,
            TimerEvent::Updated { snapshot } if snapshot.title == "Pomodoro Timer"
        )));
    }

    #[test]
    fn stale_epoch_is_ignored() {
        let (mut engine, log) = engine();
        engine.start();
        engine.pause();
        engine.start();
        assert_eq!(log.borrow().armed, vec![1, 2]);

        engine.scheduled_tick(1);
        assert_eq!(engine.state().remaining_seconds, 1500);
        engine.scheduled_tick(2);
        assert_eq!(engine.state().remaining_seconds, 1499);
    }

    #[test]
    fn reset_always_restores_pomodoro_duration() {
        let (mut engine, log) = engine();
        for mode in [TimerMode::ShortBreak, TimerMode::LongBreak] {
            engine.set_mode(mode);
            engine.start();
            advance(&mut engine, &log, 5);
            engine.reset();

            assert_eq!(engine.state().remaining_seconds, 25 * 60);
            assert_eq!(engine.state().mode, mode);
            assert!(!engine.state().is_running);
            assert_eq!(log.borrow().active(), 0);
        }
    }

    #[test]
    fn reset_with_current_mode_policy() {
        let scheduler = ManualScheduler::default();
        let mut engine = TimerEngine::with_reset_policy(scheduler, ResetPolicy::CurrentMode);
        engine.set_mode(TimerMode::ShortBreak);
        engine.start();
        engine.scheduled_tick(1);
        engine.reset();
        assert_eq!(engine.state().remaining_seconds, 300);
    }

    #[test]
    fn full_pomodoro_completes_once() {
        let (mut engine, log) = engine();
        engine.start();
        advance(&mut engine, &log, 1500);

        assert_eq!(engine.state().remaining_seconds, 0);
        assert!(!engine.state().is_running);
        assert_eq!(log.borrow().active(), 0);

        // The cancelled source may still deliver ticks
        advance(&mut engine, &log, 3);
        assert_eq!(engine.state().remaining_seconds, 0);

        let events = engine.drain_events();
        assert_eq!(completions(&events), 1);
        assert_eq!(events.last(), Some(&TimerEvent::Completed { mode: TimerMode::Pomodoro }));
    }

    #[test]
    fn start_at_zero_does_not_arm() {
        let (mut engine, log) = engine();
        engine.set_mode(TimerMode::ShortBreak);
        engine.start();
        advance(&mut engine, &log, 300);
        assert_eq!(log.borrow().armed.len(), 1);

        engine.start();
        assert_eq!(log.borrow().armed.len(), 1);
        assert!(!engine.state().is_running);
    }

    #[test]
    fn short_break_counts_down() {
        let (mut engine, log) = engine();
        engine.set_mode(TimerMode::ShortBreak);
        assert_eq!(engine.state().remaining_seconds, 300);

        engine.start();
        advance(&mut engine, &log, 10);

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.remaining_seconds, 290);
        assert_eq!(snapshot.display, "04:50");
        assert_eq!(snapshot.title, "Short Break - 04:50");
    }

    #[test]
    fn dropping_engine_cancels_source() {
        let (mut engine, log) = engine();
        engine.start();
        drop(engine);
        assert_eq!(log.borrow().active(), 0);
    }
}
