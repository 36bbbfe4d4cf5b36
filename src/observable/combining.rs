//! Operators combining several sources.
//!
//! Every combinator forwards the first error of any source and releases the
//! remaining sources when it terminates.

use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;

use super::sink::{into_subscription, Outlet, SharedSink};
use super::{Observable, ObservableExt};
use crate::observer::{Observer, Signal};
use crate::subscription::slot::SubscriptionSlot;
use crate::subscription::subscribe::{Subscribeable, Subscriber, Subscription};

#[derive(Clone)]
enum Side<A, B> {
    Left(A),
    Right(B),
}

fn pair<A, B>(values: Vec<Side<A, B>>) -> Option<(A, B)> {
    let mut values = values.into_iter();
    match (values.next(), values.next()) {
        (Some(Side::Left(a)), Some(Side::Right(b))) => Some((a, b)),
        _ => None,
    }
}

impl<T: Send + 'static> Observable<T> {
    /// Subscribes to every source at once and forwards all their values.
    ///
    /// Completes once every source has completed; the first error terminates
    /// the result and releases the other sources.
    #[must_use]
    pub fn merge(sources: Vec<Observable<T>>) -> Self {
        Observable::from_iter(sources).merge_all()
    }

    /// Subscribes to the sources one after another, each once the previous
    /// one has completed.
    #[must_use]
    pub fn concat(sources: Vec<Observable<T>>) -> Self {
        Observable::from_iter(sources).concat_all()
    }

    /// Emits `selector(a, b)` with the latest value of each source whenever
    /// either of them emits, once both have emitted at least once.
    ///
    /// Completes when both sources have completed, or as soon as one of them
    /// completes without ever emitting.
    pub fn combine_latest<A, B, F>(a: Observable<A>, b: Observable<B>, selector: F) -> Self
    where
        A: Clone + Send + 'static,
        B: Clone + Send + 'static,
        F: Fn(A, B) -> T + Send + Sync + 'static,
    {
        let sources = vec![a.map(Side::Left), b.map(Side::Right)];
        combine_latest_with(sources, move |values| {
            pair(values).map(|(a, b)| selector(a, b))
        })
    }

    /// Pairs the n-th values of both sources. Completes as soon as one
    /// source has completed and every value it emitted has been paired.
    pub fn zip<A, B, F>(a: Observable<A>, b: Observable<B>, selector: F) -> Self
    where
        A: Send + 'static,
        B: Send + 'static,
        F: Fn(A, B) -> T + Send + Sync + 'static,
    {
        let sources = vec![a.map(Side::Left), b.map(Side::Right)];
        zip_with(sources, move |values| pair(values).map(|(a, b)| selector(a, b)))
    }
}

impl<T: Send + 'static> Observable<Vec<T>> {
    /// [`combine_latest`](Observable::combine_latest) over any number of
    /// sources of the same type. Emits the latest values in source order.
    #[must_use]
    pub fn combine_latest_all(sources: Vec<Observable<T>>) -> Self
    where
        T: Clone,
    {
        combine_latest_with(sources, Some)
    }

    /// [`zip`](Observable::zip) over any number of sources of the same type.
    #[must_use]
    pub fn zip_all(sources: Vec<Observable<T>>) -> Self {
        zip_with(sources, Some)
    }
}

struct Latest<T> {
    values: Vec<Option<T>>,
    completed: Vec<bool>,
}

fn combine_latest_with<T, R, F>(sources: Vec<Observable<T>>, project: F) -> Observable<R>
where
    T: Clone + Send + 'static,
    R: Send + 'static,
    F: Fn(Vec<T>) -> Option<R> + Send + Sync + 'static,
{
    let project = Arc::new(project);
    Observable::new(move |mut o| {
        if sources.is_empty() {
            o.complete();
            return Subscription::nil();
        }
        let sink = SharedSink::new(
            o,
            Latest {
                values: sources.iter().map(|_| None).collect(),
                completed: vec![false; sources.len()],
            },
        );
        for (i, source) in sources.iter().enumerate() {
            if sink.is_closed() {
                break;
            }
            let (_, slot) = sink.inners.insert();
            let sink_c = Arc::clone(&sink);
            let project = Arc::clone(&project);
            let s = source.subscribe(Subscriber::from_fn(move |signal| match signal {
                Signal::Next(v) => {
                    let snapshot = {
                        let mut state = sink_c.state.lock();
                        state.values[i] = Some(v);
                        state.values.iter().cloned().collect::<Option<Vec<T>>>()
                    };
                    if let Some(r) = snapshot.and_then(|values| project(values)) {
                        sink_c.next(r);
                    }
                }
                Signal::Error(e) => sink_c.fail(e),
                Signal::Completed => {
                    let finished = {
                        let mut state = sink_c.state.lock();
                        state.completed[i] = true;
                        state.values[i].is_none() || state.completed.iter().all(|c| *c)
                    };
                    if finished {
                        sink_c.complete();
                    }
                }
            }));
            slot.set(s);
        }
        into_subscription(&sink)
    })
}

struct Zipped<T> {
    queues: Vec<VecDeque<T>>,
    completed: Vec<bool>,
}

impl<T> Zipped<T> {
    /// A completed source with nothing left to pair ends the zip.
    fn exhausted(&self) -> bool {
        self.completed
            .iter()
            .zip(&self.queues)
            .any(|(done, queue)| *done && queue.is_empty())
    }
}

fn zip_with<T, R, F>(sources: Vec<Observable<T>>, project: F) -> Observable<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(Vec<T>) -> Option<R> + Send + Sync + 'static,
{
    let project = Arc::new(project);
    Observable::new(move |mut o| {
        if sources.is_empty() {
            o.complete();
            return Subscription::nil();
        }
        let sink = SharedSink::new(
            o,
            Zipped {
                queues: sources.iter().map(|_| VecDeque::new()).collect(),
                completed: vec![false; sources.len()],
            },
        );
        for (i, source) in sources.iter().enumerate() {
            if sink.is_closed() {
                break;
            }
            let (_, slot) = sink.inners.insert();
            let sink_c = Arc::clone(&sink);
            let project = Arc::clone(&project);
            let s = source.subscribe(Subscriber::from_fn(move |signal| match signal {
                Signal::Next(v) => {
                    let (row, finished) = {
                        let mut state = sink_c.state.lock();
                        state.queues[i].push_back(v);
                        let row = if state.queues.iter().all(|q| !q.is_empty()) {
                            state
                                .queues
                                .iter_mut()
                                .map(VecDeque::pop_front)
                                .collect::<Option<Vec<T>>>()
                        } else {
                            None
                        };
                        (row, state.exhausted())
                    };
                    if let Some(r) = row.and_then(|values| project(values)) {
                        sink_c.next(r);
                    }
                    if finished {
                        sink_c.complete();
                    }
                }
                Signal::Error(e) => sink_c.fail(e),
                Signal::Completed => {
                    let finished = {
                        let mut state = sink_c.state.lock();
                        state.completed[i] = true;
                        state.exhausted()
                    };
                    if finished {
                        sink_c.complete();
                    }
                }
            }));
            slot.set(s);
        }
        into_subscription(&sink)
    })
}

pub(super) fn with_latest_from<T, U>(source: Observable<T>, other: Observable<U>) -> Observable<(T, U)>
where
    T: Send + 'static,
    U: Clone + Send + 'static,
{
    Observable::new(move |o: Subscriber<(T, U)>| {
        let out = Arc::new(Outlet::new(o));
        let latest: Arc<Mutex<Option<U>>> = Arc::new(Mutex::new(None));
        let source_slot = SubscriptionSlot::new();
        let other_slot = SubscriptionSlot::new();

        let latest_c = Arc::clone(&latest);
        let out_c = Arc::clone(&out);
        let source_c = source_slot.clone();
        let s = other.subscribe(Subscriber::from_fn(move |signal: Signal<U>| match signal {
            Signal::Next(u) => *latest_c.lock() = Some(u),
            Signal::Error(e) => {
                out_c.error(e);
                source_c.cancel();
            }
            Signal::Completed => (),
        }));
        other_slot.set(s);

        if out.is_closed() {
            return other_slot.into_subscription();
        }

        let other_c = other_slot.clone();
        let s = source.subscribe(Subscriber::from_fn(move |signal: Signal<T>| match signal {
            Signal::Next(v) => {
                let current = latest.lock().clone();
                if let Some(u) = current {
                    out.next((v, u));
                }
            }
            Signal::Error(e) => {
                out.error(e);
                other_c.cancel();
            }
            Signal::Completed => {
                out.complete();
                other_c.cancel();
            }
        }));
        source_slot.set(s);

        Subscription::multiple(vec![
            source_slot.into_subscription(),
            other_slot.into_subscription(),
        ])
    })
}

pub(super) fn sample<T, U>(source: Observable<T>, trigger: Observable<U>) -> Observable<T>
where
    T: Send + 'static,
    U: Send + 'static,
{
    Observable::new(move |o| {
        let sink = SharedSink::new(o, None::<T>);

        let sink_c = Arc::clone(&sink);
        let s = source.subscribe(Subscriber::from_fn(move |signal| match signal {
            Signal::Next(v) => *sink_c.state.lock() = Some(v),
            Signal::Error(e) => sink_c.fail(e),
            Signal::Completed => sink_c.complete(),
        }));
        sink.outer.set(s);

        let (_, slot) = sink.inners.insert();
        let sink_c = Arc::clone(&sink);
        let s = trigger.subscribe(Subscriber::from_fn(move |signal| {
            let terminal = signal.is_terminal();
            if let Signal::Error(e) = signal {
                sink_c.fail(e);
                return;
            }
            // Each fresh value is emitted at most once.
            let fresh = sink_c.state.lock().take();
            if let Some(v) = fresh {
                sink_c.next(v);
            }
            if terminal {
                sink_c.complete();
            }
        }));
        slot.set(s);

        into_subscription(&sink)
    })
}

pub(super) fn amb<T: Send + 'static>(first: Observable<T>, second: Observable<T>) -> Observable<T> {
    Observable::new(move |o| {
        let sink = SharedSink::new(o, None::<usize>);
        let slots = [SubscriptionSlot::new(), SubscriptionSlot::new()];

        for (i, source) in [&first, &second].into_iter().enumerate() {
            if sink.state.lock().is_some() {
                break;
            }
            let sink_c = Arc::clone(&sink);
            let loser = slots[1 - i].clone();
            let s = source.subscribe(Subscriber::from_fn(move |signal| {
                let (won, first) = {
                    let mut winner = sink_c.state.lock();
                    match *winner {
                        Some(w) => (w == i, false),
                        None => {
                            *winner = Some(i);
                            (true, true)
                        }
                    }
                };
                if first {
                    log::trace!("amb: source {i} won");
                    loser.cancel();
                }
                if won {
                    match signal {
                        Signal::Next(v) => sink_c.next(v),
                        Signal::Error(e) => sink_c.fail(e),
                        Signal::Completed => sink_c.complete(),
                    }
                }
            }));
            slots[i].set(s);
        }

        let [a, b] = slots;
        Subscription::multiple(vec![a.into_subscription(), b.into_subscription()])
    })
}
