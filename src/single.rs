//! One-shot producers.
//!
//! A [`Single`] finishes with exactly one outcome: a value or an error.
//! Its producer receives a [`SingleEmitter`] that is consumed by whichever
//! outcome it reports first, so reporting both is impossible.

use crate::errors::ErrorRef;
use crate::observable::Observable;
use crate::observer::{Observer, Signal};
use crate::subscription::subscribe::{Subscribeable, Subscriber, Subscription};

/// Reports the outcome of a [`Single`].
pub struct SingleEmitter<T> {
    subscriber: Subscriber<T>,
}

impl<T> SingleEmitter<T> {
    pub fn success(mut self, value: T) {
        self.subscriber.next(value);
        self.subscriber.complete();
    }

    pub fn failure(mut self, error: ErrorRef) {
        self.subscriber.error(error);
    }
}

/// A cold producer of exactly one value or one error.
///
/// As an observable a `Single` emits its value followed by `complete`, or
/// only the error.
///
/// ```
/// use rxcore::{single::Single, ObservableError};
///
/// let text = Single::create(|emitter| {
///     match std::fs::read_to_string("Copyright.txt") {
///         Ok(contents) => emitter.success(contents),
///         Err(e) => emitter.failure(ObservableError::Wrapped {
///             name: "load_text",
///             source: Box::new(e),
///         }.into_ref()),
///     }
///     rxcore::subscribe::Subscription::nil()
/// });
///
/// text.subscribe_result(|result| match result {
///     Ok(contents) => println!("{contents}"),
///     Err(e) => eprintln!("{e}"),
/// });
/// ```
pub struct Single<T> {
    inner: Observable<T>,
}

impl<T> Clone for Single<T> {
    fn clone(&self) -> Self {
        Single {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Send + 'static> Single<T> {
    /// Runs `producer` on every subscription. A panicking producer fails the
    /// single with [`ObservableError::ProducerPanicked`](crate::ObservableError::ProducerPanicked).
    pub fn create<F>(producer: F) -> Self
    where
        F: Fn(SingleEmitter<T>) -> Subscription + Send + Sync + 'static,
    {
        Single::from_observable(Observable::create(move |subscriber| {
            producer(SingleEmitter { subscriber })
        }))
    }

    pub fn just(value: T) -> Self
    where
        T: Clone + Sync,
    {
        Single::from_observable(Observable::just(value))
    }

    pub fn error(error: ErrorRef) -> Self {
        Single::from_observable(Observable::throw(error))
    }

    /// Wraps an observable that emits one value and completes, or errors.
    pub(crate) fn from_observable(inner: Observable<T>) -> Self {
        Single { inner }
    }

    /// Delivers the outcome to `f`.
    pub fn subscribe_result<F>(&self, f: F) -> Subscription
    where
        F: FnOnce(Result<T, ErrorRef>) + Send + 'static,
    {
        let mut f = Some(f);
        self.inner.subscribe(Subscriber::from_fn(move |signal| {
            let outcome = match signal {
                Signal::Next(v) => Ok(v),
                Signal::Error(e) => Err(e),
                Signal::Completed => return,
            };
            if let Some(f) = f.take() {
                f(outcome);
            }
        }))
    }

    #[must_use]
    pub fn map<U, F>(self, f: F) -> Single<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Single::from_observable(crate::ObservableExt::map(self.inner, f))
    }

    #[must_use]
    pub fn as_observable(&self) -> Observable<T> {
        self.inner.clone()
    }
}

impl<T: 'static> Subscribeable for Single<T> {
    type ObsType = T;

    fn subscribe(&self, s: Subscriber<Self::ObsType>) -> Subscription {
        self.inner.subscribe(s)
    }
}
