//! Time-based producers and operators. All timing goes through a
//! [`Scheduler`], so virtual time drives them in tests.

use std::{collections::VecDeque, sync::Arc, time::Duration};

use parking_lot::Mutex;

use super::sink::Outlet;
use super::Observable;
use crate::observer::{Observer, Signal};
use crate::scheduler::Scheduler;
use crate::subscription::slot::SubscriptionSlot;
use crate::subscription::subscribe::{Subscribeable, Subscriber, Subscription};

impl Observable<u64> {
    /// Emits 0, 1, 2, ... every `period`, starting one period after
    /// subscription. Never completes on its own.
    pub fn interval<S: Scheduler + Clone>(period: Duration, scheduler: S) -> Self {
        Observable::new(move |mut o| {
            let mut tick = 0;
            scheduler.schedule_periodic(
                period,
                period,
                Box::new(move || {
                    o.next(tick);
                    tick += 1;
                }),
            )
        })
    }

    /// Emits `0` after `due` and completes.
    pub fn timer<S: Scheduler + Clone>(due: Duration, scheduler: S) -> Self {
        Observable::new(move |mut o| {
            scheduler.schedule(
                due,
                Box::new(move || {
                    o.next(0);
                    o.complete();
                }),
            )
        })
    }
}

struct DelayQueue<T> {
    entries: VecDeque<(Duration, Signal<T>)>,
    timer_running: bool,
}

/// Signals waiting for their due time, delivered in arrival order by a
/// single timer that re-arms itself for the next entry.
struct Delayed<T, S> {
    out: Outlet<T>,
    queue: Mutex<DelayQueue<T>>,
    timer: SubscriptionSlot,
    upstream: SubscriptionSlot,
    scheduler: S,
    delay: Duration,
}

impl<T, S> Delayed<T, S>
where
    T: Send + 'static,
    S: Scheduler,
{
    fn push(self: &Arc<Self>, signal: Signal<T>) {
        if let Signal::Error(e) = signal {
            self.queue.lock().entries.clear();
            self.out.error(e);
            self.timer.cancel();
            return;
        }
        let due = self.scheduler.now() + self.delay;
        let arm = {
            let mut queue = self.queue.lock();
            queue.entries.push_back((due, signal));
            !std::mem::replace(&mut queue.timer_running, true)
        };
        if arm {
            self.arm(self.delay);
        }
    }

    fn arm(self: &Arc<Self>, wait: Duration) {
        let this = Arc::clone(self);
        self.timer
            .set(self.scheduler.schedule(wait, Box::new(move || this.drain())));
    }

    fn drain(self: &Arc<Self>) {
        let now = self.scheduler.now();
        let due: Vec<Signal<T>> = {
            let mut queue = self.queue.lock();
            let ready = queue
                .entries
                .iter()
                .take_while(|(at, _)| *at <= now)
                .count();
            queue.entries.drain(..ready).map(|(_, signal)| signal).collect()
        };

        for signal in due {
            let terminal = signal.is_terminal();
            self.out.deliver(signal);
            if terminal {
                self.upstream.cancel();
                return;
            }
        }

        let next = {
            let mut queue = self.queue.lock();
            match queue.entries.front() {
                Some((at, _)) => Some(at.saturating_sub(self.scheduler.now())),
                None => {
                    queue.timer_running = false;
                    None
                }
            }
        };
        if let Some(wait) = next {
            self.arm(wait);
        }
    }
}

pub(super) fn delay<T, S>(source: Observable<T>, delay: Duration, scheduler: S) -> Observable<T>
where
    T: Send + 'static,
    S: Scheduler + Clone,
{
    Observable::new(move |o: Subscriber<T>| {
        let delayed = Arc::new(Delayed {
            out: Outlet::new(o),
            queue: Mutex::new(DelayQueue {
                entries: VecDeque::new(),
                timer_running: false,
            }),
            timer: SubscriptionSlot::new(),
            upstream: SubscriptionSlot::new(),
            scheduler: scheduler.clone(),
            delay,
        });

        let delayed_c = Arc::clone(&delayed);
        let s = source.subscribe(Subscriber::from_fn(move |signal: Signal<T>| {
            delayed_c.push(signal);
        }));
        delayed.upstream.set(s);

        Subscription::multiple(vec![
            delayed.upstream.clone().into_subscription(),
            delayed.timer.clone().into_subscription(),
        ])
    })
}

pub(super) fn delay_subscription<T, S>(
    source: Observable<T>,
    delay: Duration,
    scheduler: S,
) -> Observable<T>
where
    T: Send + 'static,
    S: Scheduler + Clone,
{
    Observable::new(move |o| {
        let inner = SubscriptionSlot::new();
        let inner_c = inner.clone();
        let source = source.clone();
        let timer = scheduler.schedule(
            delay,
            Box::new(move || {
                log::trace!("delayed subscription starting");
                inner_c.set(source.subscribe(o));
            }),
        );
        Subscription::multiple(vec![timer, inner.into_subscription()])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observable::ObservableExt;
    use crate::errors::ObservableError;
    use crate::scheduler::VirtualTimeScheduler;
    use crate::subjects::PublishSubject;
    use crate::subscription::subscribe::Unsubscribeable;

    fn timestamped<T: Send + 'static>(
        o: &Observable<T>,
        scheduler: &VirtualTimeScheduler,
    ) -> (Arc<Mutex<Vec<(u64, Signal<T>)>>>, Subscription) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_c = Arc::clone(&log);
        let sch = scheduler.clone();
        let s = o.subscribe(Subscriber::from_fn(move |signal| {
            log_c.lock().push((sch.now().as_millis() as u64, signal));
        }));
        (log, s)
    }

    #[test]
    fn interval_ticks_until_unsubscribed() {
        let scheduler = VirtualTimeScheduler::new();
        let (log, s) = timestamped(
            &Observable::interval(Duration::from_millis(100), scheduler.clone()),
            &scheduler,
        );

        scheduler.advance_by(Duration::from_millis(350));
        s.unsubscribe();
        scheduler.advance_by(Duration::from_millis(1000));

        assert_eq!(
            *log.lock(),
            vec![
                (100, Signal::Next(0)),
                (200, Signal::Next(1)),
                (300, Signal::Next(2))
            ]
        );
    }

    #[test]
    fn delay_shifts_values_and_completion() {
        let scheduler = VirtualTimeScheduler::new();
        let source = Observable::from_iter(vec![1, 2]);
        let (log, _s) = timestamped(
            &source.delay(Duration::from_millis(50), scheduler.clone()),
            &scheduler,
        );

        assert!(log.lock().is_empty());
        scheduler.flush();
        assert_eq!(
            *log.lock(),
            vec![(50, Signal::Next(1)), (50, Signal::Next(2)), (50, Signal::Completed)]
        );
    }

    #[test]
    fn delay_waits_per_entry_and_fails_immediately() {
        let scheduler = VirtualTimeScheduler::new();
        let mut subject = PublishSubject::new();
        let (log, _s) = timestamped(
            &subject.clone().delay(Duration::from_millis(50), scheduler.clone()),
            &scheduler,
        );

        subject.next(1);
        scheduler.advance_by(Duration::from_millis(30));
        subject.next(2);
        scheduler.advance_by(Duration::from_millis(30));
        assert_eq!(*log.lock(), vec![(50, Signal::Next(1))]);

        scheduler.advance_by(Duration::from_millis(30));
        subject.next(3);
        subject.error(ObservableError::NoElements.into_ref());
        scheduler.flush();

        assert_eq!(log.lock().len(), 3);
        assert_eq!(log.lock()[1], (80, Signal::Next(2)));
        assert!(matches!(log.lock()[2], (90, Signal::Error(_))));
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn timer_emits_once() {
        let scheduler = VirtualTimeScheduler::new();
        let (log, _s) = timestamped(
            &Observable::timer(Duration::from_secs(2), scheduler.clone()),
            &scheduler,
        );
        scheduler.flush();
        assert_eq!(
            *log.lock(),
            vec![(2000, Signal::Next(0)), (2000, Signal::Completed)]
        );
    }
}
