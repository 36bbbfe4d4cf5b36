use std::time::Duration;

use tokio::{runtime::Handle, time::Instant};

use super::{CancelFlag, PeriodicTask, Scheduler, Task};
use crate::errors::ObservableError;
use crate::subscription::subscribe::{
    Subscription, SubscriptionHandle, UnsubscribeLogic,
};

/// Wall-clock scheduler running tasks on a Tokio runtime.
///
/// The returned subscriptions carry the task's join handle, so a caller can
/// wait for a timer with
/// [`Subscription::join_concurrent`](crate::subscribe::Subscription::join_concurrent).
#[derive(Clone)]
pub struct TokioScheduler {
    handle: Handle,
    origin: Instant,
}

impl TokioScheduler {
    /// Uses the runtime the caller is running in.
    ///
    /// # Errors
    ///
    /// Returns [`ObservableError::NoRuntime`] when called outside a Tokio
    /// runtime.
    pub fn try_current() -> Result<Self, ObservableError> {
        Ok(Self::from_handle(Handle::try_current()?))
    }

    #[must_use]
    pub fn from_handle(handle: Handle) -> Self {
        TokioScheduler {
            handle,
            origin: Instant::now(),
        }
    }

    fn cancellable(&self, cancelled: CancelFlag, task: tokio::task::JoinHandle<()>) -> Subscription {
        let abort = task.abort_handle();
        Subscription::new(
            UnsubscribeLogic::Logic(Box::new(move || {
                cancelled.cancel();
                abort.abort();
            })),
            SubscriptionHandle::JoinTask(task),
        )
    }
}

impl Scheduler for TokioScheduler {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn schedule(&self, delay: Duration, task: Task) -> Subscription {
        let cancelled = CancelFlag::default();
        let flag = cancelled.clone();
        let deadline = Instant::now() + delay;
        let join = self.handle.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if !flag.is_cancelled() {
                task();
            }
        });
        self.cancellable(cancelled, join)
    }

    fn schedule_periodic(
        &self,
        initial: Duration,
        period: Duration,
        mut task: PeriodicTask,
    ) -> Subscription {
        // Tokio intervals reject a zero period.
        let period = period.max(Duration::from_millis(1));
        let cancelled = CancelFlag::default();
        let flag = cancelled.clone();
        let start = Instant::now() + initial;
        let join = self.handle.spawn(async move {
            let mut ticks = tokio::time::interval_at(start, period);
            loop {
                ticks.tick().await;
                if flag.is_cancelled() {
                    break;
                }
                task();
            }
        });
        log::trace!("periodic tokio task spawned every {period:?}");
        self.cancellable(cancelled, join)
    }
}
