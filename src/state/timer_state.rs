//! Timer state structure and display formatting

use serde::{Deserialize, Serialize};

use super::TimerMode;

/// Title shown whenever the countdown is not running
pub const IDLE_TITLE: &str = "Pomodoro Timer";

/// Countdown state held by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    pub mode: TimerMode,
    pub remaining_seconds: u64,
    pub is_running: bool,
}

impl TimerState {
    /// Create the startup state: a paused, full Pomodoro
    pub fn new() -> Self {
        Self {
            mode: TimerMode::Pomodoro,
            remaining_seconds: TimerMode::Pomodoro.duration_seconds(),
            is_running: false,
        }
    }

    /// Remaining time as `MM:SS`
    pub fn display(&self) -> String {
        format_remaining(self.remaining_seconds)
    }

    /// Window title for the current state
    pub fn title(&self) -> String {
        if !self.is_running {
            return IDLE_TITLE.to_string();
        }
        format!("{} - {}", self.mode.label(), self.display())
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            mode: self.mode,
            mode_label: self.mode.label().to_string(),
            remaining_seconds: self.remaining_seconds,
            is_running: self.is_running,
            display: self.display(),
            title: self.title(),
        }
    }
}

/// Format seconds as zero-padded `MM:SS`
pub fn format_remaining(remaining_seconds: u64) -> String {
    format!("{:02}:{:02}", remaining_seconds / 60, remaining_seconds % 60)
}

/// Read-only view of the timer handed to observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub mode: TimerMode,
    pub mode_label: String,
    pub remaining_seconds: u64,
    pub is_running: bool,
    pub display: String,
    pub title: String,
}
