//! Background tasks module
//! 
//! This module contains the tick source and the tasks that run alongside the HTTP server.

pub mod ticker;
pub mod event_logger;

// Re-export main items
pub use ticker::{TokioTickHandle, TokioTicker};
pub use event_logger::event_logger_task;
