use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use super::sink::Outlet;
use super::Observable;
use crate::errors::ObservableError;
use crate::observer::{Observer, Signal};
use crate::subscription::slot::SubscriptionSlot;
use crate::subscription::subscribe::{Subscribeable, Subscriber, Subscription};

pub(super) fn filter<T, P>(source: Observable<T>, predicate: P) -> Observable<T>
where
    T: Send + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    let predicate = Arc::new(predicate);
    Observable::new(move |mut o| {
        let predicate = Arc::clone(&predicate);
        source.subscribe(Subscriber::from_fn(move |signal| match signal {
            Signal::Next(v) => {
                if predicate(&v) {
                    o.next(v);
                }
            }
            terminal => o.signal(terminal),
        }))
    })
}

pub(super) fn skip<T: Send + 'static>(source: Observable<T>, n: usize) -> Observable<T> {
    Observable::new(move |mut o| {
        let mut skipped = 0;
        source.subscribe(Subscriber::from_fn(move |signal| match signal {
            Signal::Next(_) if skipped < n => skipped += 1,
            signal => o.signal(signal),
        }))
    })
}

pub(super) fn take<T: Send + 'static>(source: Observable<T>, n: usize) -> Observable<T> {
    Observable::new(move |mut o| {
        if n == 0 {
            o.complete();
            return Subscription::nil();
        }
        let slot = SubscriptionSlot::new();
        let upstream = slot.clone();
        let mut remaining = n;
        let s = source.subscribe(Subscriber::from_fn(move |signal| match signal {
            Signal::Next(v) => {
                if remaining == 0 {
                    return;
                }
                remaining -= 1;
                o.next(v);
                if remaining == 0 {
                    o.complete();
                    upstream.cancel();
                }
            }
            terminal => o.signal(terminal),
        }));
        slot.set(s);
        slot.into_subscription()
    })
}

pub(super) fn skip_while<T, P>(source: Observable<T>, predicate: P) -> Observable<T>
where
    T: Send + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    let predicate = Arc::new(predicate);
    Observable::new(move |mut o| {
        let predicate = Arc::clone(&predicate);
        let mut skipping = true;
        source.subscribe(Subscriber::from_fn(move |signal| match signal {
            Signal::Next(v) => {
                if skipping && predicate(&v) {
                    return;
                }
                skipping = false;
                o.next(v);
            }
            terminal => o.signal(terminal),
        }))
    })
}

pub(super) fn take_while<T, P>(source: Observable<T>, predicate: P) -> Observable<T>
where
    T: Send + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    let predicate = Arc::new(predicate);
    Observable::new(move |mut o| {
        let predicate = Arc::clone(&predicate);
        let slot = SubscriptionSlot::new();
        let upstream = slot.clone();
        let s = source.subscribe(Subscriber::from_fn(move |signal| match signal {
            Signal::Next(v) => {
                if o.is_closed() {
                    return;
                }
                if predicate(&v) {
                    o.next(v);
                } else {
                    o.complete();
                    upstream.cancel();
                }
            }
            terminal => o.signal(terminal),
        }));
        slot.set(s);
        slot.into_subscription()
    })
}

pub(super) fn skip_until<T, U>(source: Observable<T>, trigger: Observable<U>) -> Observable<T>
where
    T: Send + 'static,
    U: Send + 'static,
{
    Observable::new(move |o: Subscriber<T>| {
        let out = Arc::new(Outlet::new(o));
        let open = Arc::new(AtomicBool::new(false));
        let source_slot = SubscriptionSlot::new();
        let trigger_slot = SubscriptionSlot::new();

        let open_c = Arc::clone(&open);
        let out_c = Arc::clone(&out);
        let source_c = source_slot.clone();
        let trigger_c = trigger_slot.clone();
        let s = trigger.subscribe(Subscriber::from_fn(move |signal: Signal<U>| match signal {
            Signal::Next(_) => {
                open_c.store(true, Ordering::SeqCst);
                trigger_c.cancel();
            }
            Signal::Error(e) => {
                out_c.error(e);
                source_c.cancel();
            }
            // A trigger that completes silently keeps the gate shut.
            Signal::Completed => (),
        }));
        trigger_slot.set(s);

        if out.is_closed() {
            source_slot.cancel();
            return trigger_slot.into_subscription();
        }

        let trigger_c = trigger_slot.clone();
        let s = source.subscribe(Subscriber::from_fn(move |signal: Signal<T>| match signal {
            Signal::Next(v) => {
                if open.load(Ordering::SeqCst) {
                    out.next(v);
                }
            }
            terminal => {
                out.deliver(terminal);
                trigger_c.cancel();
            }
        }));
        source_slot.set(s);

        Subscription::multiple(vec![
            source_slot.into_subscription(),
            trigger_slot.into_subscription(),
        ])
    })
}

pub(super) fn take_until<T, U>(source: Observable<T>, trigger: Observable<U>) -> Observable<T>
where
    T: Send + 'static,
    U: Send + 'static,
{
    Observable::new(move |o: Subscriber<T>| {
        let out = Arc::new(Outlet::new(o));
        let source_slot = SubscriptionSlot::new();
        let trigger_slot = SubscriptionSlot::new();

        let out_c = Arc::clone(&out);
        let source_c = source_slot.clone();
        let trigger_c = trigger_slot.clone();
        let s = trigger.subscribe(Subscriber::from_fn(move |signal: Signal<U>| match signal {
            Signal::Next(_) => {
                out_c.complete();
                source_c.cancel();
                trigger_c.cancel();
            }
            Signal::Error(e) => {
                out_c.error(e);
                source_c.cancel();
            }
            Signal::Completed => (),
        }));
        trigger_slot.set(s);

        // The trigger may have fired synchronously.
        if out.is_closed() {
            source_slot.cancel();
            return trigger_slot.into_subscription();
        }

        let trigger_c = trigger_slot.clone();
        let s = source.subscribe(Subscriber::from_fn(move |signal: Signal<T>| {
            let terminal = signal.is_terminal();
            out.deliver(signal);
            if terminal {
                trigger_c.cancel();
            }
        }));
        source_slot.set(s);

        Subscription::multiple(vec![
            source_slot.into_subscription(),
            trigger_slot.into_subscription(),
        ])
    })
}

pub(super) fn distinct_until_changed_by<T, F>(source: Observable<T>, equals: F) -> Observable<T>
where
    T: Clone + Send + 'static,
    F: Fn(&T, &T) -> bool + Send + Sync + 'static,
{
    let equals = Arc::new(equals);
    Observable::new(move |mut o| {
        let equals = Arc::clone(&equals);
        let mut last: Option<T> = None;
        source.subscribe(Subscriber::from_fn(move |signal| match signal {
            Signal::Next(v) => {
                if last.as_ref().is_some_and(|l| equals(l, &v)) {
                    return;
                }
                last = Some(v.clone());
                o.next(v);
            }
            terminal => o.signal(terminal),
        }))
    })
}

pub(super) fn ignore_elements<T: Send + 'static>(source: Observable<T>) -> Observable<T> {
    Observable::new(move |mut o| {
        source.subscribe(Subscriber::from_fn(move |signal| {
            if signal.is_terminal() {
                o.signal(signal);
            }
        }))
    })
}

pub(super) fn element_at<T: Send + 'static>(source: Observable<T>, index: usize) -> Observable<T> {
    Observable::new(move |mut o| {
        let slot = SubscriptionSlot::new();
        let upstream = slot.clone();
        let mut seen = 0;
        let s = source.subscribe(Subscriber::from_fn(move |signal| match signal {
            Signal::Next(v) => {
                if o.is_closed() {
                    return;
                }
                if seen == index {
                    o.next(v);
                    o.complete();
                    upstream.cancel();
                }
                seen += 1;
            }
            Signal::Completed => o.error(
                ObservableError::ArgumentOutOfRange { index, len: seen }.into_ref(),
            ),
            Signal::Error(e) => o.error(e),
        }));
        slot.set(s);
        slot.into_subscription()
    })
}

pub(super) fn take_last<T: Send + 'static>(source: Observable<T>, n: usize) -> Observable<T> {
    Observable::new(move |mut o| {
        let mut buffer = VecDeque::with_capacity(n.min(64));
        source.subscribe(Subscriber::from_fn(move |signal| match signal {
            Signal::Next(v) => {
                if n == 0 {
                    return;
                }
                if buffer.len() == n {
                    buffer.pop_front();
                }
                buffer.push_back(v);
            }
            Signal::Completed => {
                for v in buffer.drain(..) {
                    o.next(v);
                }
                o.complete();
            }
            Signal::Error(e) => o.error(e),
        }))
    })
}
