//! One-second tick sources for the quiz countdown.
//!
//! A scheduler hands out a [`TickGuard`] for every armed callback. Dropping the
//! guard stops the cadence for good, which lets the session release its timer
//! on whichever edge it leaves the running phases.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::SchedulerError;

pub type TickCallback = Box<dyn FnMut() + Send + 'static>;

/// Host-supplied source of periodic ticks.
pub trait TickScheduler: Send + Sync {
    /// Call `on_tick` once per period until the returned guard is dropped.
    fn every_second(&self, on_tick: TickCallback) -> TickGuard;
}

/// Scoped registration of a tick callback.
#[must_use = "dropping the guard stops the ticks"]
pub struct TickGuard {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TickGuard {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TickGuard {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for TickGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickGuard")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

//
// ─── TOKIO ─────────────────────────────────────────────────────────────────────
//

/// Drives ticks from a spawned `tokio::time::interval` task.
///
/// The first tick lands one full period after arming. Cancelling aborts the task.
#[derive(Debug, Clone)]
pub struct TokioTickScheduler {
    runtime: Handle,
    period: Duration,
}

impl TokioTickScheduler {
    #[must_use]
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            period: Duration::from_secs(1),
        }
    }

    /// Bind to the runtime the caller is running on.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::NoRuntime` outside a tokio runtime.
    pub fn current() -> Result<Self, SchedulerError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| SchedulerError::NoRuntime)
    }

    #[must_use]
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }
}

impl TickScheduler for TokioTickScheduler {
    fn every_second(&self, mut on_tick: TickCallback) -> TickGuard {
        let period = self.period;
        let task = self.runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                on_tick();
            }
        });
        let abort = task.abort_handle();
        TickGuard::new(move || abort.abort())
    }
}

//
// ─── MANUAL ────────────────────────────────────────────────────────────────────
//

struct Slot {
    active: Arc<AtomicBool>,
    callback: Arc<Mutex<TickCallback>>,
}

/// Tick source driven explicitly by the host (or a test) through [`fire`](Self::fire).
#[derive(Clone, Default)]
pub struct ManualTickScheduler {
    slots: Arc<Mutex<Vec<Slot>>>,
}

impl ManualTickScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one tick to every armed callback and return how many ran.
    ///
    /// Callbacks run without the registry lock held, so a callback may cancel
    /// its own guard.
    pub fn fire(&self) -> usize {
        let armed: Vec<_> = {
            let mut slots = lock(&self.slots);
            slots.retain(|slot| slot.active.load(Ordering::SeqCst));
            slots
                .iter()
                .map(|slot| (Arc::clone(&slot.active), Arc::clone(&slot.callback)))
                .collect()
        };

        let mut fired = 0;
        for (active, callback) in armed {
            if !active.load(Ordering::SeqCst) {
                continue;
            }
            let mut on_tick = lock(&callback);
            (&mut **on_tick)();
            fired += 1;
        }
        fired
    }

    /// Fire `n` ticks in a row; returns the total number of callback runs.
    pub fn fire_n(&self, n: usize) -> usize {
        (0..n).map(|_| self.fire()).sum()
    }

    /// Number of callbacks that would run on the next tick.
    #[must_use]
    pub fn armed(&self) -> usize {
        lock(&self.slots)
            .iter()
            .filter(|slot| slot.active.load(Ordering::SeqCst))
            .count()
    }
}

impl TickScheduler for ManualTickScheduler {
    fn every_second(&self, on_tick: TickCallback) -> TickGuard {
        let active = Arc::new(AtomicBool::new(true));
        lock(&self.slots).push(Slot {
            active: Arc::clone(&active),
            callback: Arc::new(Mutex::new(on_tick)),
        });
        TickGuard::new(move || active.store(false, Ordering::SeqCst))
    }
}

impl fmt::Debug for ManualTickScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualTickScheduler")
            .field("armed", &self.armed())
            .finish()
    }
}
