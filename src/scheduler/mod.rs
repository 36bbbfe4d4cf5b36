//! Schedulers drive every time-based operator.
//!
//! Operators never sleep or spawn on their own; they hand delayed and
//! periodic work to a [`Scheduler`]. [`VirtualTimeScheduler`] runs that work
//! when a test advances its clock, [`TokioScheduler`] runs it on a Tokio
//! runtime.
//!
//! Cancelling the returned [`Subscription`] is synchronous: once
//! `unsubscribe` returns, the task will not start again.

mod tokio_scheduler;
mod virtual_time;

pub use tokio_scheduler::TokioScheduler;
pub use virtual_time::VirtualTimeScheduler;

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use crate::subscription::subscribe::Subscription;

/// One-shot work handed to a scheduler.
pub type Task = Box<dyn FnOnce() + Send>;

/// Repeating work handed to a scheduler.
pub type PeriodicTask = Box<dyn FnMut() + Send>;

/// Clock and timer service.
pub trait Scheduler: Send + Sync + 'static {
    /// Time elapsed since the scheduler was created.
    fn now(&self) -> Duration;

    /// Runs `task` once after `delay`.
    fn schedule(&self, delay: Duration, task: Task) -> Subscription;

    /// Runs `task` after `initial`, then every `period`, until the returned
    /// subscription is unsubscribed.
    fn schedule_periodic(&self, initial: Duration, period: Duration, task: PeriodicTask)
        -> Subscription;
}

/// Cancellation flag shared between a scheduled task and its subscription.
#[derive(Clone, Default)]
pub(crate) struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub(crate) fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
