//! Tokio-backed repeating tick source

use std::{sync::Arc, time::Duration};
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant},
};
use tracing::debug;

use crate::state::{TickHandle, TickScheduler};

type TickCallback = Arc<dyn Fn(u64) + Send + Sync>;

/// Scheduler that spawns one tokio task per armed tick source
#[derive(Clone)]
pub struct TokioTicker {
    on_tick: TickCallback,
}

impl TokioTicker {
    /// Create a ticker that calls `on_tick(epoch)` every period
    pub fn new<F>(on_tick: F) -> Self
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        Self { on_tick: Arc::new(on_tick) }
    }
}

impl TickScheduler for TokioTicker {
    type Handle = TokioTickHandle;

    fn schedule(&mut self, period: Duration, epoch: u64) -> TokioTickHandle {
        let on_tick = Arc::clone(&self.on_tick);

        let task = tokio::spawn(async move {
            debug!("Tick task started (epoch {})", epoch);
            // First tick lands one full period after arming
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                on_tick(epoch);
            }
        });

        TokioTickHandle { task }
    }
}

/// Handle that aborts the tick task on cancel
#[derive(Debug)]
pub struct TokioTickHandle {
    task: JoinHandle<()>,
}

impl TickHandle for TokioTickHandle {
    fn cancel(self) {
        self.task.abort();
    }
}
