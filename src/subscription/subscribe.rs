use std::{any::Any, sync::Arc, thread::JoinHandle as ThreadJoinHandle};

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::errors::ErrorRef;
use crate::observer::{Observer, Signal};
use crate::subscription::DisposeBag;

/// Anything that can be subscribed to: observables, subjects and
/// connectables.
pub trait Subscribeable {
    type ObsType;

    /// Registers `s` and starts the producer. The returned [`Subscription`]
    /// cancels this registration only.
    fn subscribe(&self, s: Subscriber<Self::ObsType>) -> Subscription;
}

/// Implemented by resources that can be released.
pub trait Unsubscribeable {
    fn unsubscribe(self);
}

type SignalFn<T> = Box<dyn FnMut(Signal<T>) + Send>;

/// Concrete observer built from closures.
///
/// Every signal goes through one sink; the `Subscriber` tracks whether a
/// terminal signal has been delivered and drops anything that follows it.
pub struct Subscriber<NextFnType> {
    sink: SignalFn<NextFnType>,
    completed: bool,
    errored: bool,
}

impl<NextFnType> Subscriber<NextFnType> {
    /// Creates a `Subscriber` from separate `next`, `error` and `complete`
    /// handlers.
    pub fn new(
        mut next_fn: impl FnMut(NextFnType) + 'static + Send,
        mut error_fn: impl FnMut(ErrorRef) + 'static + Send,
        mut complete_fn: impl FnMut() + 'static + Send,
    ) -> Self {
        Self::from_fn(move |signal| match signal {
            Signal::Next(v) => next_fn(v),
            Signal::Error(e) => error_fn(e),
            Signal::Completed => complete_fn(),
        })
    }

    /// Creates a `Subscriber` that only cares about values.
    pub fn on_next(mut next_fn: impl FnMut(NextFnType) + 'static + Send) -> Self {
        Self::from_fn(move |signal| {
            if let Signal::Next(v) = signal {
                next_fn(v);
            }
        })
    }

    /// Creates a `Subscriber` receiving every event as a [`Signal`].
    pub fn from_fn(sink: impl FnMut(Signal<NextFnType>) + 'static + Send) -> Self {
        Subscriber {
            sink: Box::new(sink),
            completed: false,
            errored: false,
        }
    }

    /// `true` once `complete` or `error` has been delivered.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.completed || self.errored
    }
}

impl<T> Observer for Subscriber<T> {
    type NextFnType = T;

    fn next(&mut self, v: Self::NextFnType) {
        if self.is_closed() {
            return;
        }
        (self.sink)(Signal::Next(v));
    }

    fn complete(&mut self) {
        if self.is_closed() {
            return;
        }
        self.completed = true;
        (self.sink)(Signal::Completed);
    }

    fn error(&mut self, observable_error: ErrorRef) {
        if self.is_closed() {
            return;
        }
        self.errored = true;
        (self.sink)(Signal::Error(observable_error));
    }
}

/// A `Subscriber` forwarding every signal into a shared one.
///
/// Used wherever several upstream callbacks feed the same downstream.
pub(crate) fn wrap_subscriber<S: 'static>(s: Arc<Mutex<Subscriber<S>>>) -> Subscriber<S> {
    Subscriber::from_fn(move |signal| s.lock().signal(signal))
}

/// Handle of the work started by an asynchronous producer, if any.
pub enum SubscriptionHandle {
    Nil,

    /// The producer runs in a Tokio task.
    JoinTask(JoinHandle<()>),

    /// The producer runs in an OS thread.
    JoinThread(ThreadJoinHandle<()>),
}

/// Cancellation logic stored in a [`Subscription`].
pub enum UnsubscribeLogic {
    Nil,

    Wrapped(Box<Subscription>),

    Logic(Box<dyn FnOnce() + Send>),

    /// Unsubscribes every member in order.
    Multiple(Vec<Subscription>),
}

impl UnsubscribeLogic {
    fn unsubscribe(self) {
        match self {
            UnsubscribeLogic::Nil => (),
            UnsubscribeLogic::Logic(fnc) => fnc(),
            UnsubscribeLogic::Wrapped(subscription) => subscription.unsubscribe(),
            UnsubscribeLogic::Multiple(subscriptions) => {
                for s in subscriptions {
                    s.unsubscribe();
                }
            }
        }
    }
}

type AwaitResult<T> = Result<T, Box<dyn Any + Send>>;

/// The Disposable: cancels an active subscription, timer or connection.
///
/// `unsubscribe` consumes the handle, so one handle can never be disposed
/// twice. Disposing after the stream has terminated is a no-op.
pub struct Subscription {
    pub(crate) unsubscribe_logic: UnsubscribeLogic,
    pub(crate) subscription_future: SubscriptionHandle,
}

impl Subscription {
    #[must_use]
    pub fn new(
        unsubscribe_logic: UnsubscribeLogic,
        subscription_future: SubscriptionHandle,
    ) -> Self {
        Subscription {
            unsubscribe_logic,
            subscription_future,
        }
    }

    /// A subscription with nothing to cancel.
    #[must_use]
    pub fn nil() -> Self {
        Subscription::new(UnsubscribeLogic::Nil, SubscriptionHandle::Nil)
    }

    /// A subscription that runs `f` when unsubscribed.
    #[must_use]
    pub fn from_fn(f: impl FnOnce() + Send + 'static) -> Self {
        Subscription::new(UnsubscribeLogic::Logic(Box::new(f)), SubscriptionHandle::Nil)
    }

    /// Groups several subscriptions into one.
    #[must_use]
    pub fn multiple(subscriptions: Vec<Subscription>) -> Self {
        Subscription::new(
            UnsubscribeLogic::Multiple(subscriptions),
            SubscriptionHandle::Nil,
        )
    }

    /// Hands the subscription to `bag`, which disposes it together with the
    /// rest of its contents.
    pub fn disposed_by(self, bag: &DisposeBag) {
        bag.insert(self);
    }

    pub(crate) fn take_handle(&mut self) -> SubscriptionHandle {
        std::mem::replace(&mut self.subscription_future, SubscriptionHandle::Nil)
    }

    pub(crate) fn with_handle(mut self, handle: SubscriptionHandle) -> Self {
        self.subscription_future = handle;
        self
    }

    /// Waits for an asynchronous producer running in a Tokio task or an OS
    /// thread to finish. A task cancelled by `unsubscribe` counts as
    /// finished.
    pub async fn join_concurrent(self) -> AwaitResult<()> {
        match self.subscription_future {
            SubscriptionHandle::JoinTask(task_handle) => match task_handle.await {
                Ok(()) => Ok(()),
                Err(e) if e.is_cancelled() => Ok(()),
                Err(e) => Err(Box::new(e) as Box<dyn Any + Send>),
            },
            SubscriptionHandle::JoinThread(thread_handle) => thread_handle.join(),
            SubscriptionHandle::Nil => Ok(()),
        }
    }

    /// Blocks until a producer running in an OS thread finishes.
    ///
    /// Producers running in Tokio tasks have to be awaited with
    /// [`join_concurrent`](Self::join_concurrent) instead; calling `join` on
    /// them returns an error.
    pub fn join(self) -> AwaitResult<()> {
        match self.subscription_future {
            SubscriptionHandle::JoinThread(thread_handle) => thread_handle.join(),
            SubscriptionHandle::Nil => Ok(()),
            SubscriptionHandle::JoinTask(_) => Err(Box::new(
                "producer runs in a Tokio task, use `join_concurrent().await` instead",
            )),
        }
    }
}

impl Unsubscribeable for Subscription {
    fn unsubscribe(self) {
        self.unsubscribe_logic.unsubscribe();
    }
}
