use std::{fmt::Debug, sync::Arc};

use super::Observable;
use crate::errors::ErrorRef;
use crate::observer::{Observer, Signal};
use crate::subscription::slot::SubscriptionSlot;
use crate::subscription::subscribe::{Subscribeable, Subscriber, Subscription, Unsubscribeable};

pub(super) fn map<T, U, F>(source: Observable<T>, f: F) -> Observable<U>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> U + Send + Sync + 'static,
{
    let f = Arc::new(f);
    Observable::new(move |mut o| {
        let f = Arc::clone(&f);
        source.subscribe(Subscriber::from_fn(move |signal| o.signal(signal.map(&*f))))
    })
}

pub(super) fn try_map<T, U, E, F>(source: Observable<T>, f: F) -> Observable<U>
where
    T: Send + 'static,
    U: Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
    F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
{
    let f = Arc::new(f);
    Observable::new(move |mut o| {
        let f = Arc::clone(&f);
        let slot = SubscriptionSlot::new();
        let upstream = slot.clone();
        let s = source.subscribe(Subscriber::from_fn(move |signal| match signal {
            Signal::Next(v) => {
                if o.is_closed() {
                    return;
                }
                match f(v) {
                    Ok(u) => o.next(u),
                    Err(e) => {
                        o.error(Arc::new(e) as ErrorRef);
                        upstream.cancel();
                    }
                }
            }
            Signal::Error(e) => o.error(e),
            Signal::Completed => o.complete(),
        }));
        slot.set(s);
        slot.into_subscription()
    })
}

pub(super) fn enumerated<T: Send + 'static>(source: Observable<T>) -> Observable<(usize, T)> {
    Observable::new(move |mut o| {
        let mut index = 0;
        source.subscribe(Subscriber::from_fn(move |signal| {
            o.signal(signal.map(|v| {
                let pair = (index, v);
                index += 1;
                pair
            }));
        }))
    })
}

pub(super) fn scan<T, A, F>(source: Observable<T>, seed: A, accumulator: F) -> Observable<A>
where
    T: Send + 'static,
    A: Clone + Send + Sync + 'static,
    F: Fn(A, T) -> A + Send + Sync + 'static,
{
    let accumulator = Arc::new(accumulator);
    Observable::new(move |mut o| {
        let accumulator = Arc::clone(&accumulator);
        let mut acc = Some(seed.clone());
        source.subscribe(Subscriber::from_fn(move |signal| match signal {
            Signal::Next(v) => {
                if let Some(current) = acc.take() {
                    let next = accumulator(current, v);
                    acc = Some(next.clone());
                    o.next(next);
                }
            }
            Signal::Error(e) => o.error(e),
            Signal::Completed => o.complete(),
        }))
    })
}

pub(super) fn materialize<T: Send + 'static>(source: Observable<T>) -> Observable<Signal<T>> {
    Observable::new(move |mut o| {
        source.subscribe(Subscriber::from_fn(move |signal| {
            let terminal = signal.is_terminal();
            o.next(signal);
            if terminal {
                o.complete();
            }
        }))
    })
}

pub(super) fn dematerialize<T: Send + 'static>(source: Observable<Signal<T>>) -> Observable<T> {
    Observable::new(move |mut o: Subscriber<T>| {
        let slot = SubscriptionSlot::new();
        let upstream = slot.clone();
        let s = source.subscribe(Subscriber::from_fn(move |signal: Signal<Signal<T>>| match signal {
            Signal::Next(inner) => {
                let terminal = inner.is_terminal();
                o.signal(inner);
                if terminal {
                    upstream.cancel();
                }
            }
            Signal::Error(e) => o.error(e),
            Signal::Completed => o.complete(),
        }));
        slot.set(s);
        slot.into_subscription()
    })
}

pub(super) fn tap<T, F>(source: Observable<T>, f: F) -> Observable<T>
where
    T: Send + 'static,
    F: Fn(&T) + Send + Sync + 'static,
{
    let f = Arc::new(f);
    Observable::new(move |mut o| {
        let f = Arc::clone(&f);
        source.subscribe(Subscriber::from_fn(move |signal| {
            if let Some(v) = signal.value() {
                f(v);
            }
            o.signal(signal);
        }))
    })
}

pub(super) fn do_on_subscribe<T, F>(source: Observable<T>, f: F) -> Observable<T>
where
    T: Send + 'static,
    F: Fn() + Send + Sync + 'static,
{
    Observable::new(move |o| {
        f();
        source.subscribe(o)
    })
}

pub(super) fn debug<T: Debug + Send + 'static>(
    source: Observable<T>,
    label: &'static str,
) -> Observable<T> {
    Observable::new(move |mut o| {
        log::debug!("[{label}] subscribed");
        let s = source.subscribe(Subscriber::from_fn(move |signal| {
            log::debug!("[{label}] {signal:?}");
            o.signal(signal);
        }));
        Subscription::from_fn(move || {
            log::debug!("[{label}] disposed");
            s.unsubscribe();
        })
    })
}
