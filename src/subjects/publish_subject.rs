use std::sync::Arc;

use super::subject_core::{Replay, SubjectCore};
use crate::errors::ErrorRef;
use crate::observer::{Observer, Signal};
use crate::subscription::subscribe::{Subscribeable, Subscriber, Subscription, Unsubscribeable};

/// A subject that forwards live signals only.
///
/// ```
/// use rxcore::{subjects::PublishSubject, ObservableExt, Observer, Subscribeable, Subscriber};
///
/// let mut subject = PublishSubject::new();
/// subject.next(1); // nobody is listening yet
///
/// subject
///     .clone()
///     .map(|v| v * 10)
///     .subscribe(Subscriber::on_next(|v| println!("{v}")));
///
/// subject.next(2); // prints 20
/// subject.complete();
/// ```
pub struct PublishSubject<T> {
    core: Arc<SubjectCore<T>>,
}

impl<T> Clone for PublishSubject<T> {
    fn clone(&self) -> Self {
        PublishSubject {
            core: Arc::clone(&self.core),
        }
    }
}

impl<T: Clone + Send + 'static> PublishSubject<T> {
    #[must_use]
    pub fn new() -> Self {
        PublishSubject {
            core: SubjectCore::new(Replay::Nothing, None),
        }
    }
}

impl<T: Clone + Send + 'static> Default for PublishSubject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PublishSubject<T> {
    /// Returns the number of registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.core.observer_count()
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.core.is_disposed()
    }

    /// Drops every observer; the subject delivers nothing afterwards.
    pub fn dispose(&self) {
        self.core.dispose();
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.core.is_stopped()
    }
}

impl<T: Clone + Send + 'static> Observer for PublishSubject<T> {
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

impl<T: Clone + Send + 'static> Subscribeable for PublishSubject<T> {
    type ObsType = T;

    fn subscribe(&self, s: Subscriber<Self::ObsType>) -> Subscription {
        self.core.subscribe(s)
    }
}

impl<T> Unsubscribeable for PublishSubject<T> {
    fn unsubscribe(self) {
        self.core.dispose();
    }
}

/// Lets the subject be subscribed to another observable.
impl<T: Clone + Send + 'static> From<PublishSubject<T>> for Subscriber<T> {
    fn from(value: PublishSubject<T>) -> Self {
        Subscriber::from_fn(move |signal| value.core.emit(signal))
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    fn recording(log: &Arc<Mutex<Vec<Signal<i32>>>>, tag: i32) -> Subscriber<i32> {
        let log = Arc::clone(log);
        Subscriber::from_fn(move |s| log.lock().push(s.map(|v| v + tag)))
    }

    #[test]
    fn observers_are_notified_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut subject = PublishSubject::new();
        subject.subscribe(recording(&log, 100));
        subject.subscribe(recording(&log, 200));

        subject.next(1);
        subject.complete();
        subject.next(2);

        assert_eq!(
            *log.lock(),
            vec![
                Signal::Next(101),
                Signal::Next(201),
                Signal::Completed,
                Signal::Completed
            ]
        );
        assert_eq!(subject.observer_count(), 0);
    }

    #[test]
    fn emission_from_inside_a_callback_is_delivered_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let subject = PublishSubject::new();

        let mut feedback = subject.clone();
        subject.subscribe(Subscriber::on_next(move |v: i32| {
            if v == 1 {
                feedback.next(2);
            }
        }));
        subject.subscribe(recording(&log, 0));

        subject.clone().next(1);
        assert_eq!(*log.lock(), vec![Signal::Next(1), Signal::Next(2)]);
    }

    #[test]
    fn observer_may_unsubscribe_itself_while_being_notified() {
        let subject = PublishSubject::new();
        let own: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let own_c = Arc::clone(&own);
        let seen_c = Arc::clone(&seen);
        let s = subject.subscribe(Subscriber::on_next(move |v: i32| {
            seen_c.lock().push(v);
            if let Some(s) = own_c.lock().take() {
                s.unsubscribe();
            }
        }));
        *own.lock() = Some(s);

        let mut emitter = subject.clone();
        emitter.next(1);
        emitter.next(2);
        assert_eq!(*seen.lock(), vec![1]);
        assert_eq!(subject.observer_count(), 0);
    }

    #[test]
    fn disposed_subject_delivers_nothing() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut subject = PublishSubject::new();
        subject.subscribe(recording(&log, 0));
        subject.dispose();

        subject.next(1);
        subject.complete();
        subject.subscribe(recording(&log, 0));

        assert!(log.lock().is_empty());
        assert!(subject.is_disposed());
        assert_eq!(subject.observer_count(), 0);
    }
}
