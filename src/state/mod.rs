//! State management module
//! 
//! This module contains the countdown state machine and the shared application state.

pub mod timer_mode;
pub mod timer_state;
pub mod engine;
pub mod app_state;

// Re-export main types
pub use timer_mode::TimerMode;
pub use timer_state::{format_remaining, TimerSnapshot, TimerState, IDLE_TITLE};
pub use engine::{ResetPolicy, TickHandle, TickScheduler, TimerEngine, TimerEvent, TICK_PERIOD};
pub use app_state::{AppState, Completion};
