//! Pomodoro Timer - A countdown timer for the Pomodoro technique
//! 
//! This library provides the countdown state machine, a tokio tick source
//! that drives it, and an HTTP API exposing its controls and outputs.

pub mod config;
pub mod state;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, TimerEngine, TimerMode};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
