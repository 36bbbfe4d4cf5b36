use crate::errors::ErrorRef;
use crate::observer::Observer;
use crate::subscription::subscribe::{Subscribeable, Subscription};

use super::Observable;

impl<T: Send + 'static> Observable<T> {
    /// Emits `value` and completes.
    pub fn just(value: T) -> Self
    where
        T: Clone + Sync,
    {
        Observable::new(move |mut o| {
            o.next(value.clone());
            o.complete();
            Subscription::nil()
        })
    }

    /// Emits every value of `values` in order and completes.
    pub fn of(values: impl IntoIterator<Item = T>) -> Self
    where
        T: Clone + Sync,
    {
        Observable::from_iter(values.into_iter().collect::<Vec<_>>())
    }

    /// Iterates a fresh copy of `iter` for every subscription.
    ///
    /// Iteration stops early once the subscriber has been closed.
    pub fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T> + Clone + Send + Sync + 'static,
    {
        Observable::new(move |mut o| {
            for v in iter.clone() {
                if o.is_closed() {
                    break;
                }
                o.next(v);
            }
            o.complete();
            Subscription::nil()
        })
    }

    /// Completes immediately.
    #[must_use]
    pub fn empty() -> Self {
        Observable::new(|mut o| {
            o.complete();
            Subscription::nil()
        })
    }

    /// Never emits and never terminates.
    #[must_use]
    pub fn never() -> Self {
        Observable::new(|_| Subscription::nil())
    }

    /// Terminates immediately with `error`.
    #[must_use]
    pub fn throw(error: ErrorRef) -> Self {
        Observable::new(move |mut o| {
            o.error(error.clone());
            Subscription::nil()
        })
    }

    /// Calls `factory` on every subscription and subscribes to the observable
    /// it returns. A panicking factory is reported as an error.
    pub fn deferred<F>(factory: F) -> Self
    where
        F: Fn() -> Observable<T> + Send + Sync + 'static,
    {
        Observable::create(move |o| factory().subscribe(o))
    }
}
