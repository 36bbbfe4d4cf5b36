//! The `observable` module provides the building blocks for creating and manipulating
//! observables.
//!
//! [`Observable`] is a cold description of a sequence: every call to
//! `subscribe` runs its subscribe function again. Operators are available on
//! anything [`Subscribeable`] through [`ObservableExt`]; creation functions,
//! n-ary combinators and flattening of nested observables are inherent
//! methods of [`Observable`].

mod aggregating;
mod combining;
mod creation;
mod filtering;
mod higher_order;
mod multicast;
mod sink;
mod time;
mod transforming;


use std::{
    fmt::Debug,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    time::Duration,
};

use parking_lot::Mutex;

pub use multicast::Connectable;

use crate::errors::ObservableError;
use crate::observer::{Observer, Signal};
use crate::scheduler::Scheduler;
use crate::single::Single;
use crate::subscription::subscribe::{wrap_subscriber, Subscribeable, Subscriber, Subscription};

type SubscribeFn<T> = dyn Fn(Subscriber<T>) -> Subscription + Send + Sync;

/// The `Observable` struct represents a source of values that can be observed
/// and transformed.
///
/// It is a value, not a running process: cloning it shares the description,
/// and each subscription starts its own run of the producer.
///
/// ```
/// use rxcore::{Observable, ObservableExt, Subscribeable, Subscriber};
///
/// let observable = Observable::new(|mut subscriber| {
///     use rxcore::Observer;
///     for i in 1..=10 {
///         subscriber.next(i);
///     }
///     subscriber.complete();
///     rxcore::subscribe::Subscription::nil()
/// });
///
/// observable
///     .filter(|v| v % 2 == 0)
///     .map(|v| v * 10)
///     .subscribe(Subscriber::on_next(|v| println!("{v}")));
/// ```
pub struct Observable<T> {
    subscribe_fn: Arc<SubscribeFn<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Observable {
            subscribe_fn: Arc::clone(&self.subscribe_fn),
        }
    }
}

impl<T: 'static> Observable<T> {
    /// Creates an observable from a raw subscribe function.
    ///
    /// The function is invoked once per subscription with the subscriber to
    /// feed and returns the `Subscription` that tears the run down.
    pub fn new(sf: impl Fn(Subscriber<T>) -> Subscription + Send + Sync + 'static) -> Self {
        Observable {
            subscribe_fn: Arc::new(sf),
        }
    }

    /// Like [`new`](Self::new), but a panic raised by `producer` is caught
    /// and delivered to the subscriber as
    /// [`ObservableError::ProducerPanicked`] instead of unwinding into the
    /// caller of `subscribe`.
    pub fn create(producer: impl Fn(Subscriber<T>) -> Subscription + Send + Sync + 'static) -> Self {
        Observable::new(move |s| {
            let shared = Arc::new(Mutex::new(s));
            let forward = wrap_subscriber(Arc::clone(&shared));
            match panic::catch_unwind(AssertUnwindSafe(|| producer(forward))) {
                Ok(subscription) => subscription,
                Err(payload) => {
                    let err = ObservableError::from_panic(payload.as_ref());
                    log::warn!("{err}; delivering it as an error signal");
                    shared.lock().error(err.into_ref());
                    Subscription::nil()
                }
            }
        })
    }
}

impl<T: 'static> Subscribeable for Observable<T> {
    type ObsType = T;

    fn subscribe(&self, s: Subscriber<Self::ObsType>) -> Subscription {
        (self.subscribe_fn)(s)
    }
}

/// Operators available on every [`Subscribeable`] source.
pub trait ObservableExt<T: Send + 'static>:
    Subscribeable<ObsType = T> + Sized + Send + Sync + 'static
{
    /// Erases the concrete source type.
    fn into_observable(self) -> Observable<T> {
        Observable::new(move |s| self.subscribe(s))
    }

    // Filtering

    /// Emits only the values satisfying `predicate`.
    fn filter<P>(self, predicate: P) -> Observable<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        filtering::filter(self.into_observable(), predicate)
    }

    /// Drops the first `n` values.
    fn skip(self, n: usize) -> Observable<T> {
        filtering::skip(self.into_observable(), n)
    }

    /// Emits the first `n` values, then completes and unsubscribes from the
    /// source.
    fn take(self, n: usize) -> Observable<T> {
        filtering::take(self.into_observable(), n)
    }

    /// Drops values while `predicate` holds; once it fails every later value
    /// passes.
    fn skip_while<P>(self, predicate: P) -> Observable<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        filtering::skip_while(self.into_observable(), predicate)
    }

    /// Emits values while `predicate` holds and completes on the first value
    /// that fails it.
    fn take_while<P>(self, predicate: P) -> Observable<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        filtering::take_while(self.into_observable(), predicate)
    }

    /// Drops values until `trigger` emits its first value.
    fn skip_until<U: Send + 'static>(self, trigger: impl ObservableExt<U>) -> Observable<T> {
        filtering::skip_until(self.into_observable(), trigger.into_observable())
    }

    /// Emits values until `trigger` emits its first value, then completes.
    fn take_until<U: Send + 'static>(self, trigger: impl ObservableExt<U>) -> Observable<T> {
        filtering::take_until(self.into_observable(), trigger.into_observable())
    }

    /// Suppresses values equal to the one emitted right before them.
    fn distinct_until_changed(self) -> Observable<T>
    where
        T: PartialEq + Clone,
    {
        filtering::distinct_until_changed_by(self.into_observable(), |a: &T, b: &T| a == b)
    }

    /// Like [`distinct_until_changed`](Self::distinct_until_changed) with a
    /// custom comparator.
    fn distinct_until_changed_by<F>(self, equals: F) -> Observable<T>
    where
        T: Clone,
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        filtering::distinct_until_changed_by(self.into_observable(), equals)
    }

    /// Drops every value and keeps only the terminal signal.
    fn ignore_elements(self) -> Observable<T> {
        filtering::ignore_elements(self.into_observable())
    }

    /// Emits the value at `index` and completes. Errors with
    /// [`ObservableError::ArgumentOutOfRange`] if the source completes first.
    fn element_at(self, index: usize) -> Observable<T> {
        filtering::element_at(self.into_observable(), index)
    }

    /// Emits the last `n` values once the source completes.
    fn take_last(self, n: usize) -> Observable<T> {
        filtering::take_last(self.into_observable(), n)
    }

    // Transforming

    fn map<U, F>(self, f: F) -> Observable<U>
    where
        F: Fn(T) -> U + Send + Sync + 'static,
        U: Send + 'static,
    {
        transforming::map(self.into_observable(), f)
    }

    /// Maps with a fallible closure; an `Err` terminates the stream with that
    /// error.
    fn try_map<U, E, F>(self, f: F) -> Observable<U>
    where
        F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
        E: std::error::Error + Send + Sync + 'static,
        U: Send + 'static,
    {
        transforming::try_map(self.into_observable(), f)
    }

    /// Pairs every value with its zero-based position.
    fn enumerated(self) -> Observable<(usize, T)> {
        transforming::enumerated(self.into_observable())
    }

    /// Emits the running accumulation after every value.
    fn scan<A, F>(self, seed: A, accumulator: F) -> Observable<A>
    where
        A: Clone + Send + Sync + 'static,
        F: Fn(A, T) -> A + Send + Sync + 'static,
    {
        transforming::scan(self.into_observable(), seed, accumulator)
    }

    /// Emits `values` before the values of the source.
    fn start_with(self, values: Vec<T>) -> Observable<T>
    where
        T: Clone + Sync,
    {
        Observable::concat(vec![Observable::of(values), self.into_observable()])
    }

    /// Turns every signal, terminal ones included, into a value.
    fn materialize(self) -> Observable<Signal<T>> {
        transforming::materialize(self.into_observable())
    }

    /// Runs `f` for every value without changing the stream.
    fn tap<F>(self, f: F) -> Observable<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        transforming::tap(self.into_observable(), f)
    }

    /// Runs `f` every time the stream is subscribed to.
    fn do_on_subscribe<F>(self, f: F) -> Observable<T>
    where
        F: Fn() + Send + Sync + 'static,
    {
        transforming::do_on_subscribe(self.into_observable(), f)
    }

    /// Logs every signal and the subscription lifecycle at debug level.
    fn debug(self, label: &'static str) -> Observable<T>
    where
        T: Debug,
    {
        transforming::debug(self.into_observable(), label)
    }

    // Higher order

    /// Subscribes to the observable returned by `selector` for every value
    /// and merges all of them.
    fn flat_map<R, F, O>(self, selector: F) -> Observable<R>
    where
        R: Send + 'static,
        O: ObservableExt<R>,
        F: Fn(T) -> O + Send + Sync + 'static,
    {
        self.map(move |v| selector(v).into_observable()).merge_all()
    }

    /// Like [`flat_map`](Self::flat_map), but only the observable produced
    /// for the latest value is kept subscribed.
    fn flat_map_latest<R, F, O>(self, selector: F) -> Observable<R>
    where
        R: Send + 'static,
        O: ObservableExt<R>,
        F: Fn(T) -> O + Send + Sync + 'static,
    {
        self.map(move |v| selector(v).into_observable()).switch_latest()
    }

    /// Like [`flat_map`](Self::flat_map), but inner observables run one at a
    /// time, in order.
    fn concat_map<R, F, O>(self, selector: F) -> Observable<R>
    where
        R: Send + 'static,
        O: ObservableExt<R>,
        F: Fn(T) -> O + Send + Sync + 'static,
    {
        self.map(move |v| selector(v).into_observable()).concat_all()
    }

    /// Ignores values that arrive while the previous inner observable is still
    /// running.
    fn exhaust_map<R, F, O>(self, selector: F) -> Observable<R>
    where
        R: Send + 'static,
        O: ObservableExt<R>,
        F: Fn(T) -> O + Send + Sync + 'static,
    {
        self.map(move |v| selector(v).into_observable()).exhaust_all()
    }

    // Combining

    fn merge_with(self, other: impl ObservableExt<T>) -> Observable<T> {
        Observable::merge(vec![self.into_observable(), other.into_observable()])
    }

    fn concat_with(self, other: impl ObservableExt<T>) -> Observable<T> {
        Observable::concat(vec![self.into_observable(), other.into_observable()])
    }

    /// Pairs every value with the latest value of `other`. Values arriving
    /// before `other` has emitted are dropped.
    fn with_latest_from<U>(self, other: impl ObservableExt<U>) -> Observable<(T, U)>
    where
        U: Clone + Send + 'static,
    {
        combining::with_latest_from(self.into_observable(), other.into_observable())
    }

    /// Emits the latest value of the source whenever `trigger` emits, at most
    /// once per fresh value.
    fn sample<U: Send + 'static>(self, trigger: impl ObservableExt<U>) -> Observable<T> {
        combining::sample(self.into_observable(), trigger.into_observable())
    }

    /// Mirrors whichever of `self` and `other` signals first.
    fn amb(self, other: impl ObservableExt<T>) -> Observable<T> {
        combining::amb(self.into_observable(), other.into_observable())
    }

    // Aggregating

    /// Folds the whole sequence and emits the result on completion.
    fn reduce<A, F>(self, seed: A, accumulator: F) -> Observable<A>
    where
        A: Clone + Send + Sync + 'static,
        F: Fn(A, T) -> A + Send + Sync + 'static,
    {
        aggregating::reduce(self.into_observable(), seed, accumulator)
    }

    /// Collects every value into a `Vec` delivered on completion.
    fn to_vec(self) -> Single<Vec<T>> {
        aggregating::to_vec(self.into_observable())
    }

    /// Expects exactly one value.
    fn as_single(self) -> Single<T> {
        aggregating::as_single(self.into_observable())
    }

    // Time

    /// Shifts values and completion by `delay` on `scheduler`. Errors are
    /// forwarded immediately.
    fn delay<S: Scheduler + Clone>(self, delay: Duration, scheduler: S) -> Observable<T> {
        time::delay(self.into_observable(), delay, scheduler)
    }

    /// Subscribes to the source only after `delay` has elapsed on
    /// `scheduler`.
    fn delay_subscription<S: Scheduler + Clone>(
        self,
        delay: Duration,
        scheduler: S,
    ) -> Observable<T> {
        time::delay_subscription(self.into_observable(), delay, scheduler)
    }

    // Multicast

    /// Shares one subscription to the source between all subscribers of the
    /// returned [`Connectable`], starting it on `connect`.
    fn publish(self) -> Connectable<T>
    where
        T: Clone,
    {
        Connectable::publish(self.into_observable())
    }

    /// Like [`publish`](Self::publish), replaying the last `buffer_size`
    /// values to late subscribers.
    fn replay(self, buffer_size: usize) -> Connectable<T>
    where
        T: Clone + Sync,
    {
        Connectable::replay(self.into_observable(), Some(buffer_size))
    }

    /// Like [`replay`](Self::replay) with an unbounded buffer.
    fn replay_all(self) -> Connectable<T>
    where
        T: Clone + Sync,
    {
        Connectable::replay(self.into_observable(), None)
    }

    /// Multicasts the source while at least one subscriber is present.
    /// Nothing is replayed.
    fn share(self) -> Observable<T>
    where
        T: Clone,
    {
        self.publish().ref_count()
    }

    fn share_replay(self, buffer_size: usize) -> Observable<T>
    where
        T: Clone + Sync,
    {
        self.replay(buffer_size).ref_count()
    }
}

impl<O, T: Send + 'static> ObservableExt<T> for O where
    O: Subscribeable<ObsType = T> + Send + Sync + 'static
{
}

impl<R: Send + 'static> Observable<Observable<R>> {
    /// Subscribes to every inner observable as it arrives and merges their
    /// values.
    #[must_use]
    pub fn merge_all(self) -> Observable<R> {
        higher_order::merge_all(self, None)
    }

    /// Like [`merge_all`](Self::merge_all), keeping at most `max_concurrent`
    /// inner subscriptions alive and queueing the rest.
    #[must_use]
    pub fn merge_all_limited(self, max_concurrent: usize) -> Observable<R> {
        higher_order::merge_all(self, Some(max_concurrent.max(1)))
    }

    /// Subscribes to inner observables one after another.
    #[must_use]
    pub fn concat_all(self) -> Observable<R> {
        higher_order::merge_all(self, Some(1))
    }

    /// Forwards only the most recent inner observable.
    #[must_use]
    pub fn switch_latest(self) -> Observable<R> {
        higher_order::switch_latest(self)
    }

    /// Drops inner observables arriving while another one is running.
    #[must_use]
    pub fn exhaust_all(self) -> Observable<R> {
        higher_order::exhaust_all(self)
    }
}

impl<T: Send + 'static> Observable<Signal<T>> {
    /// Inverse of [`materialize`](ObservableExt::materialize).
    #[must_use]
    pub fn dematerialize(self) -> Observable<T> {
        transforming::dematerialize(self)
    }
}
