use std::sync::Arc;

use super::Observable;
use crate::errors::ObservableError;
use crate::observer::{Observer, Signal};
use crate::single::Single;
use crate::subscription::slot::SubscriptionSlot;
use crate::subscription::subscribe::{Subscribeable, Subscriber};

/// Emits the fold of the whole sequence once the source completes. An
/// error discards the accumulation.
pub(super) fn reduce<T, A, F>(source: Observable<T>, seed: A, accumulator: F) -> Observable<A>
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
                acc = acc.take().map(|current| accumulator(current, v));
            }
            Signal::Completed => {
                if let Some(result) = acc.take() {
                    o.next(result);
                }
                o.complete();
            }
            Signal::Error(e) => o.error(e),
        }))
    })
}

pub(super) fn to_vec<T: Send + 'static>(source: Observable<T>) -> Single<Vec<T>> {
    Single::from_observable(Observable::new(move |mut o| {
        let mut values = Vec::new();
        source.subscribe(Subscriber::from_fn(move |signal| match signal {
            Signal::Next(v) => values.push(v),
            Signal::Completed => {
                o.next(std::mem::take(&mut values));
                o.complete();
            }
            Signal::Error(e) => o.error(e),
        }))
    }))
}

pub(super) fn as_single<T: Send + 'static>(source: Observable<T>) -> Single<T> {
    Single::from_observable(Observable::new(move |mut o| {
        let slot = SubscriptionSlot::new();
        let upstream = slot.clone();
        let mut value = None;
        let s = source.subscribe(Subscriber::from_fn(move |signal| match signal {
            Signal::Next(v) => {
                if value.is_some() {
                    value = None;
                    o.error(ObservableError::MoreThanOneElement.into_ref());
                    upstream.cancel();
                } else if !o.is_closed() {
                    value = Some(v);
                }
            }
            Signal::Completed => match value.take() {
                Some(v) => {
                    o.next(v);
                    o.complete();
                }
                None => o.error(ObservableError::NoElements.into_ref()),
            },
            Signal::Error(e) => o.error(e),
        }));
        slot.set(s);
        slot.into_subscription()
    }))
}
