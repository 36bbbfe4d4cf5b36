use parking_lot::Mutex;

use super::subscribe::{Subscription, Unsubscribeable};

struct BagState {
    subscriptions: Vec<Subscription>,
    disposed: bool,
}

/// Owns a set of subscriptions and disposes them together.
///
/// Disposing a bag twice is harmless, and a subscription added to a bag
/// that was already disposed is unsubscribed on the spot. Dropping the bag
/// disposes it.
pub struct DisposeBag {
    state: Mutex<BagState>,
}

impl DisposeBag {
    #[must_use]
    pub fn new() -> Self {
        DisposeBag {
            state: Mutex::new(BagState {
                subscriptions: Vec::new(),
                disposed: false,
            }),
        }
    }

    pub fn insert(&self, subscription: Subscription) {
        let mut state = self.state.lock();
        if state.disposed {
            drop(state);
            log::trace!("dispose bag already disposed, releasing new member immediately");
            subscription.unsubscribe();
            return;
        }
        state.subscriptions.push(subscription);
    }

    /// Unsubscribes every member exactly once.
    pub fn dispose(&self) {
        let subscriptions = {
            let mut state = self.state.lock();
            if state.disposed {
                return;
            }
            state.disposed = true;
            std::mem::take(&mut state.subscriptions)
        };
        log::debug!("disposing {} subscriptions", subscriptions.len());
        for s in subscriptions {
            s.unsubscribe();
        }
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().subscriptions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DisposeBag {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DisposeBag {
    fn drop(&mut self) {
        self.dispose();
    }
}
