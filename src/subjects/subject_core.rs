use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use parking_lot::{Mutex, ReentrantMutex};

use crate::errors::ErrorRef;
use crate::observer::{Observer, Signal};
use crate::subscription::subscribe::{Subscriber, Subscription};

/// Maximum number of values a [`ReplaySubject`](super::ReplaySubject)
/// keeps for late subscribers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufSize {
    /// Every value is kept.
    Unbounded,

    /// Only the last `n` values are kept.
    Bounded(usize),
}

/// What a subject hands to a new subscriber before live values.
#[derive(Clone, Copy)]
pub(crate) enum Replay {
    Nothing,
    Latest,
    Buffer(BufSize),
}

enum Status {
    Active,
    Completed,
    Errored(ErrorRef),
    Disposed,
}

struct Registration<T> {
    key: u64,
    subscriber: Mutex<Subscriber<T>>,
    removed: AtomicBool,
}

impl<T> Registration<T> {
    fn deliver(&self, signal: Signal<T>) {
        if self.removed.load(Ordering::SeqCst) {
            return;
        }
        self.subscriber.lock().signal(signal);
    }
}

struct State<T> {
    observers: Vec<Arc<Registration<T>>>,
    next_key: u64,
    status: Status,
    buffer: VecDeque<T>,
    queue: VecDeque<Signal<T>>,
    emitting: bool,
}

impl<T> State<T> {
    fn record(&mut self, v: &T, replay: Replay)
    where
        T: Clone,
    {
        match replay {
            Replay::Nothing => (),
            Replay::Latest => {
                self.buffer.clear();
                self.buffer.push_back(v.clone());
            }
            Replay::Buffer(BufSize::Unbounded) => self.buffer.push_back(v.clone()),
            Replay::Buffer(BufSize::Bounded(0)) => (),
            Replay::Buffer(BufSize::Bounded(k)) => {
                if self.buffer.len() == k {
                    self.buffer.pop_front();
                }
                self.buffer.push_back(v.clone());
            }
        }
    }
}

/// State machine and observer registry shared by every subject flavour.
///
/// `Active` moves to `Completed` or `Errored`, and any state moves to
/// `Disposed`; none of the three is ever left again.
///
/// Emissions and registrations are serialised by a re-entrant gate. Signals
/// raised from inside an observer callback are queued and delivered by the
/// outer emission once the current signal has reached every observer, so
/// observers always see signals in emission order. The state lock is never
/// held while observer callbacks run.
pub(crate) struct SubjectCore<T> {
    gate: ReentrantMutex<()>,
    state: Mutex<State<T>>,
    replay: Replay,
}

impl<T: Clone + Send + 'static> SubjectCore<T> {
    pub(crate) fn new(replay: Replay, initial: Option<T>) -> Arc<Self> {
        Arc::new(SubjectCore {
            gate: ReentrantMutex::new(()),
            state: Mutex::new(State {
                observers: Vec::with_capacity(4),
                next_key: 0,
                status: Status::Active,
                buffer: initial.into_iter().collect(),
                queue: VecDeque::new(),
                emitting: false,
            }),
            replay,
        })
    }

    pub(crate) fn emit(&self, signal: Signal<T>) {
        let _gate = self.gate.lock();
        {
            let mut state = self.state.lock();
            if !matches!(state.status, Status::Active) {
                return;
            }
            state.queue.push_back(signal);
            if state.emitting {
                return;
            }
            state.emitting = true;
        }
        self.drain();
    }

    fn drain(&self) {
        loop {
            let (signal, targets) = {
                let mut state = self.state.lock();
                let Some(signal) = state.queue.pop_front() else {
                    state.emitting = false;
                    return;
                };
                if !matches!(state.status, Status::Active) {
                    state.queue.clear();
                    state.emitting = false;
                    return;
                }
                match &signal {
                    Signal::Next(v) => state.record(v, self.replay),
                    Signal::Error(e) => state.status = Status::Errored(Arc::clone(e)),
                    Signal::Completed => state.status = Status::Completed,
                }
                let targets = if signal.is_terminal() {
                    std::mem::take(&mut state.observers)
                } else {
                    state.observers.clone()
                };
                (signal, targets)
            };
            for registration in targets {
                registration.deliver(signal.clone());
            }
        }
    }

    pub(crate) fn subscribe(self: &Arc<Self>, mut s: Subscriber<T>) -> Subscription {
        let _gate = self.gate.lock();
        let mut state = self.state.lock();

        let terminal = match &state.status {
            Status::Active => None,
            Status::Disposed => {
                log::trace!("subscribe on a disposed subject ignored");
                return Subscription::nil();
            }
            Status::Completed => Some(Signal::Completed),
            Status::Errored(e) => Some(Signal::Error(Arc::clone(e))),
        };
        if let Some(terminal) = terminal {
            let replayed: Vec<T> = match self.replay {
                Replay::Buffer(_) => state.buffer.iter().cloned().collect(),
                _ => Vec::new(),
            };
            drop(state);
            for v in replayed {
                s.next(v);
            }
            s.signal(terminal);
            return Subscription::nil();
        }

        let key = state.next_key;
        state.next_key += 1;
        let registration = Arc::new(Registration {
            key,
            subscriber: Mutex::new(s),
            removed: AtomicBool::new(false),
        });
        state.observers.push(Arc::clone(&registration));
        let replayed: Vec<T> = state.buffer.iter().cloned().collect();
        // Signals raised while replaying wait until the new observer is
        // caught up.
        let nested = std::mem::replace(&mut state.emitting, true);
        drop(state);
        log::trace!("subject observer {key} registered");

        for v in replayed {
            registration.deliver(Signal::Next(v));
        }
        if !nested {
            self.drain();
        }

        let core = Arc::clone(self);
        Subscription::from_fn(move || core.remove(key))
    }

    /// Latest buffered value, if any.
    pub(crate) fn latest(&self) -> Option<T> {
        self.state.lock().buffer.back().cloned()
    }
}

impl<T> SubjectCore<T> {
    fn remove(&self, key: u64) {
        let mut state = self.state.lock();
        if let Some(i) = state.observers.iter().position(|r| r.key == key) {
            let registration = state.observers.remove(i);
            registration.removed.store(true, Ordering::SeqCst);
            log::trace!("subject observer {key} removed");
        }
    }

    /// Moves the subject to the disposed state and drops every observer.
    pub(crate) fn dispose(&self) {
        let _gate = self.gate.lock();
        let observers = {
            let mut state = self.state.lock();
            state.status = Status::Disposed;
            state.buffer.clear();
            state.queue.clear();
            std::mem::take(&mut state.observers)
        };
        for registration in &observers {
            registration.removed.store(true, Ordering::SeqCst);
        }
        log::trace!("subject disposed, {} observers dropped", observers.len());
    }

    pub(crate) fn observer_count(&self) -> usize {
        self.state.lock().observers.len()
    }

    pub(crate) fn is_disposed(&self) -> bool {
        matches!(self.state.lock().status, Status::Disposed)
    }

    /// `true` once the subject has completed or errored.
    pub(crate) fn is_stopped(&self) -> bool {
        matches!(
            self.state.lock().status,
            Status::Completed | Status::Errored(_)
        )
    }

    /// Error the subject terminated with, if any.
    pub(crate) fn error(&self) -> Option<ErrorRef> {
        match &self.state.lock().status {
            Status::Errored(e) => Some(Arc::clone(e)),
            _ => None,
        }
    }
}
