//! Shared holders for upstream subscriptions.
//!
//! Synchronous producers emit, and may be cancelled by an operator such as
//! `take`, before `subscribe` has returned their `Subscription`. A slot
//! remembers the cancellation so the subscription is released the moment it
//! is stored.

use std::sync::Arc;

use parking_lot::Mutex;

use super::subscribe::{Subscription, Unsubscribeable};

enum SlotState {
    Empty,
    Filled(Subscription),
    Cancelled,
}

#[derive(Clone)]
pub(crate) struct SubscriptionSlot(Arc<Mutex<SlotState>>);

impl SubscriptionSlot {
    pub(crate) fn new() -> Self {
        SubscriptionSlot(Arc::new(Mutex::new(SlotState::Empty)))
    }

    /// Stores `s`, or unsubscribes it right away if the slot was cancelled.
    /// A previously stored subscription is unsubscribed.
    pub(crate) fn set(&self, s: Subscription) {
        let mut state = self.0.lock();
        if let SlotState::Cancelled = *state {
            drop(state);
            s.unsubscribe();
            return;
        }
        let previous = std::mem::replace(&mut *state, SlotState::Filled(s));
        drop(state);
        if let SlotState::Filled(previous) = previous {
            previous.unsubscribe();
        }
    }

    /// Unsubscribes the stored subscription; idempotent.
    pub(crate) fn cancel(&self) {
        let previous = std::mem::replace(&mut *self.0.lock(), SlotState::Cancelled);
        if let SlotState::Filled(s) = previous {
            s.unsubscribe();
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        matches!(*self.0.lock(), SlotState::Cancelled)
    }

    pub(crate) fn into_subscription(self) -> Subscription {
        Subscription::from_fn(move || self.cancel())
    }
}

struct CompositeState {
    slots: Vec<(u64, SubscriptionSlot)>,
    next_key: u64,
    disposed: bool,
}

/// A growable set of slots, used by operators that keep a dynamic number of
/// inner subscriptions alive (`flat_map`, `delay`, ...).
#[derive(Clone)]
pub(crate) struct CompositeSlots(Arc<Mutex<CompositeState>>);

impl CompositeSlots {
    pub(crate) fn new() -> Self {
        CompositeSlots(Arc::new(Mutex::new(CompositeState {
            slots: Vec::new(),
            next_key: 0,
            disposed: false,
        })))
    }

    /// Registers a fresh slot. After `dispose` the returned slot is already
    /// cancelled.
    pub(crate) fn insert(&self) -> (u64, SubscriptionSlot) {
        let slot = SubscriptionSlot::new();
        let mut state = self.0.lock();
        let key = state.next_key;
        state.next_key += 1;
        if state.disposed {
            drop(state);
            slot.cancel();
            return (key, slot);
        }
        state.slots.push((key, slot.clone()));
        (key, slot)
    }

    /// Removes and cancels the slot registered under `key`.
    pub(crate) fn remove(&self, key: u64) {
        let removed = {
            let mut state = self.0.lock();
            state
                .slots
                .iter()
                .position(|(k, _)| *k == key)
                .map(|i| state.slots.remove(i).1)
        };
        if let Some(slot) = removed {
            slot.cancel();
        }
    }

    pub(crate) fn dispose(&self) {
        let slots = {
            let mut state = self.0.lock();
            state.disposed = true;
            std::mem::take(&mut state.slots)
        };
        for (_, slot) in slots {
            slot.cancel();
        }
    }

    pub(crate) fn into_subscription(self) -> Subscription {
        Subscription::from_fn(move || self.dispose())
    }
}
