//! Timer modes and their fixed durations

use std::{fmt, str::FromStr};
use serde::{Deserialize, Serialize};

/// The three countdown presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimerMode {
    Pomodoro,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub const ALL: [TimerMode; 3] = [TimerMode::Pomodoro, TimerMode::ShortBreak, TimerMode::LongBreak];

    /// Duration of this mode in whole minutes
    pub fn duration_minutes(self) -> u64 {
        match self {
            TimerMode::Pomodoro => 25,
            TimerMode::ShortBreak => 5,
            TimerMode::LongBreak => 15,
        }
    }

    pub fn duration_seconds(self) -> u64 {
        self.duration_minutes() * 60
    }

    /// Human-readable label used in the running title
    pub fn label(self) -> &'static str {
        match self {
            TimerMode::Pomodoro => "Pomodoro",
            TimerMode::ShortBreak => "Short Break",
            TimerMode::LongBreak => "Long Break",
        }
    }

    /// Identifier used in URLs and JSON
    pub fn as_str(self) -> &'static str {
        match self {
            TimerMode::Pomodoro => "pomodoro",
            TimerMode::ShortBreak => "short-break",
            TimerMode::LongBreak => "long-break",
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pomodoro" => Ok(TimerMode::Pomodoro),
            "short-break" | "shortBreak" => Ok(TimerMode::ShortBreak),
            "long-break" | "longBreak" => Ok(TimerMode::LongBreak),
            other => Err(format!("Unknown timer mode: {}", other)),
        }
    }
}
