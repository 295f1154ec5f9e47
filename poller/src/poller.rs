//! The timer loop: one independent request per tick.
//!
//! Requests are fire and forget. Nothing is cancelled and nothing is
//! ordered, so when requests overlap the display shows whichever
//! completion ran last, which is not necessarily the newest request.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::display::DisplayTarget;
use crate::source::{RequestFailure, TimeSource};

/// Text written to the display for a successful response body.
pub fn format_message(body: &str) -> String {
    format!("The time is currently {body}.")
}

pub struct Poller {
    source: Arc<dyn TimeSource>,
    display: Arc<dyn DisplayTarget>,
    interval: Duration,
    issued: AtomicU64,
}

impl Poller {
    /// `interval` must be non-zero.
    pub fn new(source: Arc<dyn TimeSource>, display: Arc<dyn DisplayTarget>, interval: Duration) -> Self {
        Self {
            source,
            display,
            interval,
            issued: AtomicU64::new(0),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of requests issued so far.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// Issue one request and return without waiting for it.
    ///
    /// Dropping the handle detaches the request; awaiting it waits for
    /// the completion to have been applied to the display.
    pub fn tick(&self) -> JoinHandle<()> {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let source = Arc::clone(&self.source);
        let display = Arc::clone(&self.display);

        debug!(seq, endpoint = %source.endpoint(), "Issuing time request");
        tokio::spawn(async move {
            let result = source.fetch().await;
            complete(seq, source.endpoint(), result, display.as_ref());
        })
    }

    /// Poll forever.
    pub async fn run(&self) {
        self.run_until(std::future::pending::<()>()).await;
    }

    /// Poll until `shutdown` resolves. The first request goes out one
    /// interval after the call, not immediately.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(
            endpoint = %self.source.endpoint(),
            display = %self.display.name(),
            interval_ms = self.interval.as_millis() as u64,
            "Poller started"
        );

        let mut interval = time::interval_at(Instant::now() + self.interval, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!(issued = self.issued(), "Poller stopped");
                    return;
                }
                _ = interval.tick() => {
                    self.tick();
                }
            }
        }
    }
}

/// Apply exactly one of the two continuations for a finished request.
fn complete(seq: u64, endpoint: &str, result: Result<String, RequestFailure>, display: &dyn DisplayTarget) {
    match result {
        Ok(body) => {
            let message = format_message(&body);
            match display.replace(&message) {
                Ok(()) => debug!(seq, "Display updated"),
                Err(e) => error!(seq, "{}", e),
            }
        }
        Err(failure) => {
            error!(seq, endpoint = %endpoint, "{}", failure.status_text);
        }
    }
}
