use std::{cmp::Ordering, collections::BinaryHeap, sync::Arc, time::Duration};

use parking_lot::Mutex;

use super::{CancelFlag, PeriodicTask, Scheduler, Task};
use crate::subscription::subscribe::Subscription;

enum Job {
    Once(Task),
    Periodic { task: PeriodicTask, period: Duration },
}

struct ScheduledJob {
    due: Duration,
    id: u64,
    job: Job,
    cancelled: CancelFlag,
}

impl PartialEq for ScheduledJob {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.id == other.id
    }
}

impl Eq for ScheduledJob {}

impl PartialOrd for ScheduledJob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledJob {
    // Min-heap: earliest due time first, FIFO among equal times.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.id.cmp(&self.id))
    }
}

struct Clock {
    now: Duration,
    queue: BinaryHeap<ScheduledJob>,
    next_id: u64,
}

impl Clock {
    fn push(&mut self, due: Duration, job: Job, cancelled: CancelFlag) {
        let id = self.next_id;
        self.next_id += 1;
        self.queue.push(ScheduledJob {
            due,
            id,
            job,
            cancelled,
        });
    }
}

/// Deterministic scheduler whose clock only moves when told to.
///
/// Due tasks run synchronously on the thread calling
/// [`advance_by`](Self::advance_by), [`advance_to`](Self::advance_to) or
/// [`flush`](Self::flush). Clones share the same clock and queue.
///
/// ```
/// use std::time::Duration;
/// use rxcore::{scheduler::VirtualTimeScheduler, Observable, ObservableExt, Subscribeable, Subscriber};
///
/// let scheduler = VirtualTimeScheduler::new();
/// let _s = Observable::interval(Duration::from_secs(1), scheduler.clone())
///     .take(3)
///     .subscribe(Subscriber::on_next(|v| println!("{v}")));
///
/// scheduler.advance_by(Duration::from_secs(3)); // prints 0, 1, 2
/// ```
#[derive(Clone)]
pub struct VirtualTimeScheduler {
    clock: Arc<Mutex<Clock>>,
}

impl VirtualTimeScheduler {
    #[must_use]
    pub fn new() -> Self {
        VirtualTimeScheduler {
            clock: Arc::new(Mutex::new(Clock {
                now: Duration::ZERO,
                queue: BinaryHeap::new(),
                next_id: 0,
            })),
        }
    }

    /// Moves the clock forward by `duration`, running every task that falls
    /// due on the way.
    pub fn advance_by(&self, duration: Duration) {
        let target = self.clock.lock().now + duration;
        self.advance_to(target);
    }

    /// Moves the clock to `target`. A target in the past leaves the clock
    /// where it is.
    pub fn advance_to(&self, target: Duration) {
        self.run_until(Some(target));
        let mut clock = self.clock.lock();
        if clock.now < target {
            clock.now = target;
        }
    }

    /// Runs tasks until the queue is empty. Never returns while a periodic
    /// task is still scheduled.
    pub fn flush(&self) {
        self.run_until(None);
    }

    /// Number of tasks waiting in the queue, cancelled ones included until
    /// their due time is reached.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.clock.lock().queue.len()
    }

    fn run_until(&self, limit: Option<Duration>) {
        loop {
            let next = {
                let mut clock = self.clock.lock();
                let due = match clock.queue.peek() {
                    Some(job) if limit.map_or(true, |l| job.due <= l) => job.due,
                    _ => break,
                };
                clock.now = due;
                clock.queue.pop()
            };
            let Some(ScheduledJob {
                due,
                job,
                cancelled,
                ..
            }) = next
            else {
                break;
            };
            if cancelled.is_cancelled() {
                continue;
            }
            match job {
                Job::Once(task) => task(),
                Job::Periodic { mut task, period } => {
                    task();
                    if !cancelled.is_cancelled() {
                        self.clock
                            .lock()
                            .push(due + period, Job::Periodic { task, period }, cancelled);
                    }
                }
            }
        }
    }
}

impl Default for VirtualTimeScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for VirtualTimeScheduler {
    fn now(&self) -> Duration {
        self.clock.lock().now
    }

    fn schedule(&self, delay: Duration, task: Task) -> Subscription {
        let cancelled = CancelFlag::default();
        {
            let mut clock = self.clock.lock();
            let due = clock.now + delay;
            log::trace!("virtual task scheduled at {due:?}");
            clock.push(due, Job::Once(task), cancelled.clone());
        }
        Subscription::from_fn(move || cancelled.cancel())
    }

    fn schedule_periodic(
        &self,
        initial: Duration,
        period: Duration,
        task: PeriodicTask,
    ) -> Subscription {
        // A zero period would never let the clock move past the task.
        let period = period.max(Duration::from_nanos(1));
        let cancelled = CancelFlag::default();
        {
            let mut clock = self.clock.lock();
            let due = clock.now + initial;
            log::trace!("virtual periodic task scheduled at {due:?} every {period:?}");
            clock.push(due, Job::Periodic { task, period }, cancelled.clone());
        }
        Subscription::from_fn(move || cancelled.cancel())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::subscribe::Unsubscribeable;

    fn recorder() -> (Arc<Mutex<Vec<(Duration, &'static str)>>>, VirtualTimeScheduler) {
        (Arc::new(Mutex::new(Vec::new())), VirtualTimeScheduler::new())
    }

    #[test]
    fn tasks_run_in_due_order_then_fifo() {
        let (log, scheduler) = recorder();
        for (delay, name) in [(20, "c"), (10, "a"), (10, "b")] {
            let log = Arc::clone(&log);
            let sch = scheduler.clone();
            let _ = scheduler.schedule(
                Duration::from_millis(delay),
                Box::new(move || log.lock().push((sch.now(), name))),
            );
        }

        scheduler.advance_by(Duration::from_millis(15));
        assert_eq!(
            *log.lock(),
            vec![
                (Duration::from_millis(10), "a"),
                (Duration::from_millis(10), "b")
            ]
        );
        assert_eq!(scheduler.now(), Duration::from_millis(15));

        scheduler.flush();
        assert_eq!(log.lock().len(), 3);
        assert_eq!(scheduler.now(), Duration::from_millis(20));
    }

    #[test]
    fn cancelled_task_never_runs() {
        let (log, scheduler) = recorder();
        let log_c = Arc::clone(&log);
        let s = scheduler.schedule(
            Duration::from_millis(5),
            Box::new(move || log_c.lock().push((Duration::ZERO, "late"))),
        );
        s.unsubscribe();
        scheduler.advance_by(Duration::from_millis(10));
        assert!(log.lock().is_empty());
    }

    #[test]
    fn periodic_task_stops_when_cancelled_from_inside() {
        let scheduler = VirtualTimeScheduler::new();
        let ticks = Arc::new(Mutex::new(0));
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let ticks_c = Arc::clone(&ticks);
        let slot_c = Arc::clone(&slot);
        let s = scheduler.schedule_periodic(
            Duration::from_secs(1),
            Duration::from_secs(1),
            Box::new(move || {
                *ticks_c.lock() += 1;
                if *ticks_c.lock() == 3 {
                    if let Some(s) = slot_c.lock().take() {
                        s.unsubscribe();
                    }
                }
            }),
        );
        *slot.lock() = Some(s);

        scheduler.advance_by(Duration::from_secs(10));
        assert_eq!(*ticks.lock(), 3);
        assert_eq!(scheduler.pending_count(), 0);
    }
}
