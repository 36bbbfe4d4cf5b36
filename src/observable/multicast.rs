//! Module for handling observables with multicast capabilities.
//!
//! A [`Connectable`] shares a single subscription to its source between all
//! of its subscribers. Nothing flows until [`connect`](Connectable::connect)
//! is called, so subscribers registered beforehand all see the same values.

use std::sync::Arc;

use parking_lot::Mutex;

use super::Observable;
use crate::subjects::{BufSize, PublishSubject, ReplaySubject};
use crate::subscription::slot::SubscriptionSlot;
use crate::subscription::subscribe::{
    Subscribeable, Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic, Unsubscribeable,
};

/// Subject a `Connectable` routes the source through.
#[derive(Clone)]
enum Hub<T> {
    Publish(PublishSubject<T>),
    Replay(ReplaySubject<T>, BufSize),
}

impl<T: Clone + Send + 'static> Hub<T> {
    fn subscribe(&self, s: Subscriber<T>) -> Subscription {
        match self {
            Hub::Publish(subject) => subject.subscribe(s),
            Hub::Replay(subject, _) => subject.subscribe(s),
        }
    }

    fn as_subscriber(&self) -> Subscriber<T> {
        match self {
            Hub::Publish(subject) => subject.clone().into(),
            Hub::Replay(subject, _) => subject.clone().into(),
        }
    }

    fn is_stopped(&self) -> bool {
        match self {
            Hub::Publish(subject) => subject.is_stopped(),
            Hub::Replay(subject, _) => subject.is_stopped(),
        }
    }

    /// An empty subject of the same kind.
    fn fresh(&self) -> Self {
        match self {
            Hub::Publish(_) => Hub::Publish(PublishSubject::new()),
            Hub::Replay(_, buf_size) => Hub::Replay(ReplaySubject::new(*buf_size), *buf_size),
        }
    }
}

/// Subscribers counted by `ref_count`. `generation` changes whenever a
/// terminated hub is replaced, so leftovers from the previous run do not
/// disconnect the new one.
struct RefCount {
    count: usize,
    generation: u64,
}

struct Shared<T> {
    source: Observable<T>,
    hub: Mutex<Hub<T>>,
    connection: Mutex<Option<SubscriptionSlot>>,
    refs: Mutex<RefCount>,
}

/// Multicasting observable with a `connect()` method for creating the
/// subscription to the underlying source.
///
/// Clones share the same source subscription and subject.
///
/// ```
/// use rxcore::{Observable, ObservableExt, Subscribeable, Subscriber, Unsubscribeable};
///
/// let connectable = Observable::from_iter(vec![1, 2, 3])
///     .tap(|v| println!("produced {v}"))
///     .publish();
///
/// connectable.subscribe(Subscriber::on_next(|v| println!("first {v}")));
/// connectable.subscribe(Subscriber::on_next(|v| println!("second {v}")));
///
/// // Each value is produced once and delivered to both subscribers.
/// connectable.connect().unsubscribe();
/// ```
pub struct Connectable<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Connectable<T> {
    fn clone(&self) -> Self {
        Connectable {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone + Send + 'static> Connectable<T> {
    fn new(source: Observable<T>, hub: Hub<T>) -> Self {
        Connectable {
            shared: Arc::new(Shared {
                source,
                hub: Mutex::new(hub),
                connection: Mutex::new(None),
                refs: Mutex::new(RefCount {
                    count: 0,
                    generation: 0,
                }),
            }),
        }
    }

    pub(super) fn publish(source: Observable<T>) -> Self {
        Connectable::new(source, Hub::Publish(PublishSubject::new()))
    }

    pub(super) fn replay(source: Observable<T>, buffer_size: Option<usize>) -> Self {
        let buf_size = buffer_size.map_or(BufSize::Unbounded, BufSize::Bounded);
        Connectable::new(source, Hub::Replay(ReplaySubject::new(buf_size), buf_size))
    }

    /// Subscribes the shared subject to the source.
    ///
    /// Calling `connect` while already connected does not subscribe again.
    /// Unsubscribing the returned subscription disconnects the source; it
    /// also carries the source's join handle, so an asynchronous source can
    /// be awaited with
    /// [`join_concurrent`](crate::subscribe::Subscription::join_concurrent).
    #[must_use]
    pub fn connect(&self) -> Subscription {
        let slot = {
            let mut connection = self.shared.connection.lock();
            if connection.is_some() {
                return self.disconnect_subscription();
            }
            let slot = SubscriptionSlot::new();
            *connection = Some(slot.clone());
            slot
        };
        log::trace!("connectable connecting to its source");

        let hub = self.shared.hub.lock().clone();
        let mut s = self.shared.source.subscribe(hub.as_subscriber());
        let handle = s.take_handle();
        slot.set(s);

        self.disconnect_subscription().with_handle(handle)
    }

    fn disconnect_subscription(&self) -> Subscription {
        let shared = Arc::clone(&self.shared);
        Subscription::new(
            UnsubscribeLogic::Logic(Box::new(move || disconnect(&shared))),
            SubscriptionHandle::Nil,
        )
    }

    /// Connects when the first subscriber arrives and disconnects when the
    /// last one leaves.
    ///
    /// Once the source has terminated, the next subscriber starts a new run
    /// through a fresh subject instead of receiving the old terminal signal.
    #[must_use]
    pub fn ref_count(self) -> Observable<T> {
        Observable::new(move |s| {
            let (hub, generation, first, stale) = {
                let mut refs = self.shared.refs.lock();
                let stale = {
                    let mut hub = self.shared.hub.lock();
                    if hub.is_stopped() {
                        *hub = hub.fresh();
                        true
                    } else {
                        false
                    }
                };
                if stale {
                    refs.count = 0;
                    refs.generation += 1;
                }
                refs.count += 1;
                let hub = self.shared.hub.lock().clone();
                (hub, refs.generation, refs.count == 1, stale)
            };
            if stale {
                log::trace!("shared source terminated, starting a new run");
                disconnect(&self.shared);
            }

            let registration = hub.subscribe(s);
            if first {
                // Dropping the handle leaves the connection running.
                let _ = self.connect();
            }

            let shared = Arc::clone(&self.shared);
            Subscription::from_fn(move || {
                registration.unsubscribe();
                let last = {
                    let mut refs = shared.refs.lock();
                    if refs.generation != generation {
                        return;
                    }
                    refs.count = refs.count.saturating_sub(1);
                    refs.count == 0
                };
                if last {
                    disconnect(&shared);
                }
            })
        })
    }
}

fn disconnect<T>(shared: &Shared<T>) {
    let slot = shared.connection.lock().take();
    if let Some(slot) = slot {
        log::trace!("connectable disconnected from its source");
        slot.cancel();
    }
}

impl<T: Clone + Send + 'static> Subscribeable for Connectable<T> {
    type ObsType = T;

    fn subscribe(&self, s: Subscriber<Self::ObsType>) -> Subscription {
        let hub = self.shared.hub.lock().clone();
        hub.subscribe(s)
    }
}

impl<T: Clone + Send + 'static> From<Connectable<T>> for Observable<T> {
    fn from(value: Connectable<T>) -> Self {
        Observable::new(move |s| value.subscribe(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observable::ObservableExt;
    use crate::observer::{Observer, Signal};

    fn values_of<T: Clone>(log: &Mutex<Vec<Signal<T>>>) -> Vec<T> {
        log.lock().iter().filter_map(|s| s.value().cloned()).collect()
    }

    fn collect<T: Send + 'static>(
        o: &impl Subscribeable<ObsType = T>,
    ) -> (Arc<Mutex<Vec<Signal<T>>>>, Subscription) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_c = Arc::clone(&log);
        let s = o.subscribe(Subscriber::from_fn(move |s| log_c.lock().push(s)));
        (log, s)
    }

    #[test]
    fn publish_runs_the_source_once() {
        let runs = Arc::new(Mutex::new(0));
        let runs_c = Arc::clone(&runs);
        let connectable = Observable::from_iter(vec![1, 2])
            .do_on_subscribe(move || *runs_c.lock() += 1)
            .publish();

        let (first, _) = collect(&connectable);
        let (second, _) = collect(&connectable);
        assert!(first.lock().is_empty());

        let _connection = connectable.connect();
        assert_eq!(*runs.lock(), 1);
        assert_eq!(values_of(&first), vec![1, 2]);
        assert_eq!(*second.lock().last().unwrap(), Signal::Completed);
    }

    #[test]
    fn share_disconnects_with_the_last_subscriber() {
        let source = PublishSubject::new();
        let shared = source.clone().share();

        let (a, sa) = collect(&shared);
        let (b, sb) = collect(&shared);
        assert_eq!(source.observer_count(), 1);

        let mut emitter = source.clone();
        emitter.next(1);
        sa.unsubscribe();
        emitter.next(2);
        sb.unsubscribe();
        assert_eq!(source.observer_count(), 0);

        assert_eq!(values_of(&a), vec![1]);
        assert_eq!(values_of(&b), vec![1, 2]);
    }

    #[test]
    fn share_restarts_a_source_that_already_completed() {
        let runs = Arc::new(Mutex::new(0));
        let runs_c = Arc::clone(&runs);
        let shared = Observable::of(vec![1, 2])
            .do_on_subscribe(move || *runs_c.lock() += 1)
            .share();

        let (first, s1) = collect(&shared);
        let (second, _s2) = collect(&shared);
        s1.unsubscribe();

        let expected = vec![Signal::Next(1), Signal::Next(2), Signal::Completed];
        assert_eq!(*first.lock(), expected);
        assert_eq!(*second.lock(), expected);
        assert_eq!(*runs.lock(), 2);
    }

    #[test]
    fn replay_hands_buffer_to_late_subscribers() {
        let connectable = Observable::from_iter(vec![1, 2, 3]).replay(2);
        let _connection = connectable.connect();
        let (late, _) = collect(&connectable);
        assert_eq!(values_of(&late), vec![2, 3]);
    }
}
