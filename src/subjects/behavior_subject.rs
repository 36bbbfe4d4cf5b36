use std::sync::Arc;

use super::subject_core::{Replay, SubjectCore};
use crate::errors::{ErrorRef, ObservableError};
use crate::observer::{Observer, Signal};
use crate::subscription::subscribe::{Subscribeable, Subscriber, Subscription, Unsubscribeable};

/// A subject holding a current value.
///
/// Every new subscriber first receives the current value, starting with the
/// one given to [`new`](Self::new), then live values. Once the subject has
/// terminated, late subscribers only receive the terminal signal.
pub struct BehaviorSubject<T> {
    core: Arc<SubjectCore<T>>,
}

impl<T> Clone for BehaviorSubject<T> {
    fn clone(&self) -> Self {
        BehaviorSubject {
            core: Arc::clone(&self.core),
        }
    }
}

impl<T: Clone + Send + 'static> BehaviorSubject<T> {
    pub fn new(value: T) -> Self {
        BehaviorSubject {
            core: SubjectCore::new(Replay::Latest, Some(value)),
        }
    }

    /// The current value.
    ///
    /// # Errors
    ///
    /// Fails when the subject terminated with an error or has been disposed.
    pub fn value(&self) -> Result<T, ObservableError> {
        if let Some(e) = self.core.error() {
            return Err(ObservableError::Wrapped {
                name: "BehaviorSubject",
                source: Box::new(e),
            });
        }
        self.core
            .latest()
            .ok_or_else(|| ObservableError::Message("BehaviorSubject has been disposed".into()))
    }
}

impl<T> BehaviorSubject<T> {
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.core.observer_count()
    }

    pub fn dispose(&self) {
        self.core.dispose();
    }
}

impl<T: Clone + Send + 'static> Observer for BehaviorSubject<T> {
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

impl<T: Clone + Send + 'static> Subscribeable for BehaviorSubject<T> {
    type ObsType = T;

    fn subscribe(&self, s: Subscriber<Self::ObsType>) -> Subscription {
        self.core.subscribe(s)
    }
}

impl<T> Unsubscribeable for BehaviorSubject<T> {
    fn unsubscribe(self) {
        self.core.dispose();
    }
}

impl<T: Clone + Send + 'static> From<BehaviorSubject<T>> for Subscriber<T> {
    fn from(value: BehaviorSubject<T>) -> Self {
        Subscriber::from_fn(move |signal| value.core.emit(signal))
    }
}
