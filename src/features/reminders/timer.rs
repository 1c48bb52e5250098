//! Timer provider abstraction
//!
//! Timers never call back into the engine. When one elapses it posts a
//! [`TimerFire`] onto the engine's inbound channel, so timer fires are
//! serialized with every other event.

use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};

/// Which leg of a schedule a timer belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerKind {
    /// First reminder at the configured wall-clock time
    OneShot,
    /// Fixed 24-hour repeat after the first reminder
    Daily,
}

/// Payload delivered when a timer elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerFire {
    /// Schedule generation that armed the timer
    pub generation: u64,
    pub kind: TimerKind,
}

/// Cancellable reference to an armed timer
#[derive(Debug)]
pub struct TimerHandle {
    id: u64,
    abort: Option<AbortHandle>,
}

impl TimerHandle {
    pub fn new(id: u64, abort: Option<AbortHandle>) -> Self {
        Self { id, abort }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Source of one-shot and repeating timers
pub trait TimerProvider: Send + Sync {
    /// Fire once after `delay`
    fn after(&self, delay: Duration, fire: TimerFire) -> TimerHandle;

    /// Fire every `period`, first tick one period from now
    fn every(&self, period: Duration, fire: TimerFire) -> TimerHandle;

    fn cancel(&self, handle: TimerHandle);
}

/// Tokio-backed timers that post fires into an event channel
pub struct TokioTimers<E> {
    tx: mpsc::UnboundedSender<E>,
    next_id: AtomicU64,
}

impl<E> TokioTimers<E>
where
    E: From<TimerFire> + Send + 'static,
{
    pub fn new(tx: mpsc::UnboundedSender<E>) -> Self {
        Self {
            tx,
            next_id: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl<E> TimerProvider for TokioTimers<E>
where
    E: From<TimerFire> + Send + 'static,
{
    fn after(&self, delay: Duration, fire: TimerFire) -> TimerHandle {
        let id = self.next_id();
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            sleep(delay).await;
            if tx.send(fire.into()).is_err() {
                debug!("Timer {id} fired after the engine stopped");
            }
        });
        TimerHandle::new(id, Some(task.abort_handle()))
    }

    fn every(&self, period: Duration, fire: TimerFire) -> TimerHandle {
        let id = self.next_id();
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tx.send(fire.into()).is_err() {
                    debug!("Repeating timer {id} stopping, engine is gone");
                    break;
                }
            }
        });
        TimerHandle::new(id, Some(task.abort_handle()))
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some(abort) = handle.abort {
            abort.abort();
        }
        debug!("Cancelled timer {}", handle.id);
    }
}
