use std::sync::Arc;

use parking_lot::Mutex;

use super::subject_core::{Replay, SubjectCore};
use crate::observer::Signal;
use crate::subscription::subscribe::{Subscribeable, Subscriber, Subscription};

/// A [`BehaviorSubject`](super::BehaviorSubject) that can only receive
/// values. It never completes or errors, so its current value is always
/// available.
pub struct BehaviorRelay<T> {
    core: Arc<SubjectCore<T>>,
    current: Arc<Mutex<T>>,
}

impl<T> Clone for BehaviorRelay<T> {
    fn clone(&self) -> Self {
        BehaviorRelay {
            core: Arc::clone(&self.core),
            current: Arc::clone(&self.current),
        }
    }
}

impl<T: Clone + Send + 'static> BehaviorRelay<T> {
    pub fn new(value: T) -> Self {
        BehaviorRelay {
            core: SubjectCore::new(Replay::Latest, Some(value.clone())),
            current: Arc::new(Mutex::new(value)),
        }
    }

    /// Stores `value` and forwards it to every subscriber.
    pub fn accept(&self, value: T) {
        *self.current.lock() = value.clone();
        self.core.emit(Signal::Next(value));
    }

    #[must_use]
    pub fn value(&self) -> T {
        self.current.lock().clone()
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.core.observer_count()
    }
}

impl<T: Clone + Send + 'static> Subscribeable for BehaviorRelay<T> {
    type ObsType = T;

    fn subscribe(&self, s: Subscriber<Self::ObsType>) -> Subscription {
        self.core.subscribe(s)
    }
}
