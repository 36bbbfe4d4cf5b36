use std::sync::Arc;

use super::subject_core::{BufSize, Replay, SubjectCore};
use crate::errors::ErrorRef;
use crate::observer::{Observer, Signal};
use crate::subscription::subscribe::{Subscribeable, Subscriber, Subscription, Unsubscribeable};

/// A subject replaying its most recent values to every new subscriber.
///
/// The buffer survives termination: a subscriber arriving after `complete`
/// or `error` receives the buffered values followed by the terminal signal.
///
/// ```
/// use rxcore::{subjects::{BufSize, ReplaySubject}, Observer, Subscribeable, Subscriber};
///
/// let mut subject = ReplaySubject::new(BufSize::Bounded(2));
/// subject.next(1);
/// subject.next(2);
/// subject.next(3);
///
/// // Prints 2 and 3.
/// subject.subscribe(Subscriber::on_next(|v| println!("{v}")));
/// ```
pub struct ReplaySubject<T> {
    core: Arc<SubjectCore<T>>,
}

impl<T> Clone for ReplaySubject<T> {
    fn clone(&self) -> Self {
        ReplaySubject {
            core: Arc::clone(&self.core),
        }
    }
}

impl<T: Clone + Send + 'static> ReplaySubject<T> {
    #[must_use]
    pub fn new(buf_size: BufSize) -> Self {
        ReplaySubject {
            core: SubjectCore::new(Replay::Buffer(buf_size), None),
        }
    }
}

impl<T> ReplaySubject<T> {
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.core.observer_count()
    }

    pub fn dispose(&self) {
        self.core.dispose();
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.core.is_stopped()
    }
}

impl<T: Clone + Send + 'static> Observer for ReplaySubject<T> {
    type NextFnType = T;

    fn next(&mut self, v: Self::NextFnType) {
        self.core.emit(Signal::Next(v));
    }

    fn complete(&mut self) {
        self.core.emit(Signal::Completed);
    }

    fn error(&mut self, e: ErrorRef) {
        self.core.emit(Signal::Error(e));
    }
}

impl<T: Clone + Send + 'static> Subscribeable for ReplaySubject<T> {
    type ObsType = T;

    fn subscribe(&self, s: Subscriber<Self::ObsType>) -> Subscription {
        self.core.subscribe(s)
    }
}

impl<T> Unsubscribeable for ReplaySubject<T> {
    fn unsubscribe(self) {
        self.core.dispose();
    }
}

impl<T: Clone + Send + 'static> From<ReplaySubject<T>> for Subscriber<T> {
    fn from(value: ReplaySubject<T>) -> Self {
        Subscriber::from_fn(move |signal| value.core.emit(signal))
    }
}
