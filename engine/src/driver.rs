//! Tokio event loop for hosts with a runtime.
//!
//! The loop owns nothing: it borrows a synchronizer, multiplexes host events
//! and the debounce deadline on a single task, and detaches the synchronizer
//! when the page unloads or the event channel closes.

use crate::{HostEvent, Navigator, Scheduler, Synchronizer};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

/// Sender half handed to whatever produces host events.
pub type EventSender = mpsc::UnboundedSender<HostEvent>;

/// Receiver half consumed by [`run`].
pub type EventReceiver = mpsc::UnboundedReceiver<HostEvent>;

/// Scheduler backed by a tokio deadline.
#[derive(Debug, Clone, Default)]
pub struct TokioScheduler {
    deadline: Option<Instant>,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve once the armed deadline passes; never resolves while disarmed.
    pub async fn elapsed(&mut self) {
        match self.deadline {
            Some(deadline) => {
                sleep_until(deadline).await;
                self.deadline = None;
            }
            None => std::future::pending().await,
        }
    }
}

impl Scheduler for TokioScheduler {
    fn arm(&mut self, delay: Duration) {
        self.deadline = Some(Instant::now() + delay);
    }

    fn cancel(&mut self) {
        self.deadline = None;
    }

    fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }
}

/// Create a host event channel.
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Drive a synchronizer until the page unloads.
pub async fn run<N: Navigator>(
    sync: &mut Synchronizer<N, TokioScheduler>,
    events: &mut EventReceiver,
) {
    tracing::debug!("synchronizer event loop started");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(HostEvent::Unload) | None => break,
                Some(event) => {
                    sync.dispatch(event);
                }
            },
            _ = sync.scheduler_mut().elapsed() => sync.flush(),
        }
    }

    sync.detach();
    tracing::debug!("synchronizer event loop stopped");
}
