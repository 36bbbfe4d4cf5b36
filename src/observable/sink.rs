use std::{collections::VecDeque, sync::Arc};

use parking_lot::{Mutex, ReentrantMutex};

use crate::errors::ErrorRef;
use crate::observer::{Observer, Signal};
use crate::subscription::slot::{CompositeSlots, SubscriptionSlot};
use crate::subscription::subscribe::{Subscriber, Subscription};

struct Pending<R> {
    queue: VecDeque<Signal<R>>,
    emitting: bool,
    closed: bool,
}

/// Downstream subscriber fed by several upstream callbacks.
///
/// Deliveries from different threads are serialised by a re-entrant gate. A
/// signal raised on the delivering thread while the downstream runs (for
/// example one source emitting because the downstream pushed into it) is
/// queued and delivered by the outer call once the current signal returns.
/// No lock is held while the downstream runs except the gate.
pub(super) struct Outlet<R> {
    gate: ReentrantMutex<()>,
    pending: Mutex<Pending<R>>,
    out: Mutex<Subscriber<R>>,
}

impl<R> Outlet<R> {
    pub(super) fn new(out: Subscriber<R>) -> Self {
        Outlet {
            gate: ReentrantMutex::new(()),
            pending: Mutex::new(Pending {
                queue: VecDeque::new(),
                emitting: false,
                closed: false,
            }),
            out: Mutex::new(out),
        }
    }

    pub(super) fn deliver(&self, signal: Signal<R>) {
        let _gate = self.gate.lock();
        {
            let mut pending = self.pending.lock();
            if pending.closed {
                return;
            }
            pending.closed = signal.is_terminal();
            pending.queue.push_back(signal);
            if pending.emitting {
                return;
            }
            pending.emitting = true;
        }
        loop {
            let signal = {
                let mut pending = self.pending.lock();
                match pending.queue.pop_front() {
                    Some(signal) => signal,
                    None => {
                        pending.emitting = false;
                        return;
                    }
                }
            };
            self.out.lock().signal(signal);
        }
    }

    pub(super) fn next(&self, v: R) {
        self.deliver(Signal::Next(v));
    }

    pub(super) fn error(&self, e: ErrorRef) {
        self.deliver(Signal::Error(e));
    }

    pub(super) fn complete(&self) {
        self.deliver(Signal::Completed);
    }

    /// `true` once a terminal signal has been accepted, even if it is still
    /// queued behind the signal being delivered.
    pub(super) fn is_closed(&self) -> bool {
        self.pending.lock().closed
    }
}

/// Downstream, operator state and upstream subscriptions of one
/// subscription to a multi-source operator.
///
/// The state lock is never held while the downstream runs.
pub(super) struct SharedSink<R, S> {
    out: Outlet<R>,
    pub(super) state: Mutex<S>,
    pub(super) outer: SubscriptionSlot,
    pub(super) inners: CompositeSlots,
}

impl<R, S> SharedSink<R, S> {
    pub(super) fn new(out: Subscriber<R>, state: S) -> Arc<Self> {
        Arc::new(SharedSink {
            out: Outlet::new(out),
            state: Mutex::new(state),
            outer: SubscriptionSlot::new(),
            inners: CompositeSlots::new(),
        })
    }

    pub(super) fn next(&self, v: R) {
        self.out.next(v);
    }

    /// Forwards `e` and releases every upstream subscription.
    pub(super) fn fail(&self, e: ErrorRef) {
        self.out.error(e);
        self.dispose();
    }

    pub(super) fn complete(&self) {
        self.out.complete();
        self.dispose();
    }

    pub(super) fn dispose(&self) {
        self.outer.cancel();
        self.inners.dispose();
    }

    pub(super) fn is_closed(&self) -> bool {
        self.out.is_closed()
    }
}

pub(super) fn into_subscription<R, S>(sink: &Arc<SharedSink<R, S>>) -> Subscription
where
    R: Send + 'static,
    S: Send + 'static,
{
    let sink = Arc::clone(sink);
    Subscription::from_fn(move || sink.dispose())
}
