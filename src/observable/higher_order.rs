//! Flattening of observables that emit observables.

use std::{collections::VecDeque, sync::Arc};

use super::sink::{into_subscription, SharedSink};
use super::Observable;
use crate::observer::Signal;
use crate::subscription::subscribe::{Subscribeable, Subscriber};

struct MergeState<R> {
    active: usize,
    queued: VecDeque<Observable<R>>,
    starting: VecDeque<Observable<R>>,
    draining: bool,
    outer_done: bool,
    max_concurrent: Option<usize>,
}

type MergeCtx<R> = Arc<SharedSink<R, MergeState<R>>>;

type OuterSignal<R> = Signal<Observable<R>>;

/// Subscribes `inner`, or hands it to the call already subscribing on the
/// stack. Inner observables that complete synchronously then start their
/// successors from a loop instead of nesting one frame per inner.
fn start_inner<R: Send + 'static>(ctx: &MergeCtx<R>, inner: Observable<R>) {
    {
        let mut state = ctx.state.lock();
        state.starting.push_back(inner);
        if state.draining {
            return;
        }
        state.draining = true;
    }
    loop {
        let next = {
            let mut state = ctx.state.lock();
            match state.starting.pop_front() {
                Some(next) => next,
                None => {
                    state.draining = false;
                    return;
                }
            }
        };
        if !ctx.is_closed() {
            subscribe_inner(ctx, next);
        }
    }
}

fn subscribe_inner<R: Send + 'static>(ctx: &MergeCtx<R>, inner: Observable<R>) {
    let (key, slot) = ctx.inners.insert();
    let ctx_c = Arc::clone(ctx);
    let s = inner.subscribe(Subscriber::from_fn(move |signal: Signal<R>| match signal {
        Signal::Next(v) => ctx_c.next(v),
        Signal::Error(e) => ctx_c.fail(e),
        Signal::Completed => {
            ctx_c.inners.remove(key);
            let (next, finished) = {
                let mut state = ctx_c.state.lock();
                state.active -= 1;
                match state.queued.pop_front() {
                    Some(next) => {
                        state.active += 1;
                        (Some(next), false)
                    }
                    None => (None, state.outer_done && state.active == 0),
                }
            };
            if let Some(next) = next {
                start_inner(&ctx_c, next);
            } else if finished {
                ctx_c.complete();
            }
        }
    }));
    slot.set(s);
}

pub(super) fn merge_all<R: Send + 'static>(
    source: Observable<Observable<R>>,
    max_concurrent: Option<usize>,
) -> Observable<R> {
    Observable::new(move |o| {
        let ctx = SharedSink::new(
            o,
            MergeState {
                active: 0,
                queued: VecDeque::new(),
                starting: VecDeque::new(),
                draining: false,
                outer_done: false,
                max_concurrent,
            },
        );
        let ctx_c = Arc::clone(&ctx);
        let s = source.subscribe(Subscriber::from_fn(move |signal: OuterSignal<R>| match signal {
            Signal::Next(inner) => {
                if ctx_c.is_closed() {
                    return;
                }
                let start = {
                    let mut state = ctx_c.state.lock();
                    if state.max_concurrent.map_or(true, |m| state.active < m) {
                        state.active += 1;
                        Some(inner)
                    } else {
                        state.queued.push_back(inner);
                        None
                    }
                };
                if let Some(inner) = start {
                    start_inner(&ctx_c, inner);
                }
            }
            Signal::Error(e) => ctx_c.fail(e),
            Signal::Completed => {
                let finished = {
                    let mut state = ctx_c.state.lock();
                    state.outer_done = true;
                    state.active == 0
                };
                if finished {
                    ctx_c.complete();
                }
            }
        }));
        ctx.outer.set(s);
        into_subscription(&ctx)
    })
}

struct SwitchState {
    generation: u64,
    current: Option<u64>,
    inner_active: bool,
    outer_done: bool,
}

pub(super) fn switch_latest<R: Send + 'static>(source: Observable<Observable<R>>) -> Observable<R> {
    Observable::new(move |o| {
        let ctx = SharedSink::new(
            o,
            SwitchState {
                generation: 0,
                current: None,
                inner_active: false,
                outer_done: false,
            },
        );
        let ctx_c = Arc::clone(&ctx);
        let s = source.subscribe(Subscriber::from_fn(move |signal: OuterSignal<R>| match signal {
            Signal::Next(inner) => {
                if ctx_c.is_closed() {
                    return;
                }
                let (generation, previous) = {
                    let mut state = ctx_c.state.lock();
                    state.generation += 1;
                    state.inner_active = true;
                    (state.generation, state.current.take())
                };
                if let Some(previous) = previous {
                    ctx_c.inners.remove(previous);
                }
                let (key, slot) = ctx_c.inners.insert();
                ctx_c.state.lock().current = Some(key);

                let ctx_i = Arc::clone(&ctx_c);
                let s = inner.subscribe(Subscriber::from_fn(move |signal: Signal<R>| {
                    // Signals of a replaced inner are dropped.
                    if ctx_i.state.lock().generation != generation {
                        return;
                    }
                    match signal {
                        Signal::Next(v) => ctx_i.next(v),
                        Signal::Error(e) => ctx_i.fail(e),
                        Signal::Completed => {
                            let finished = {
                                let mut state = ctx_i.state.lock();
                                state.inner_active = false;
                                state.outer_done
                            };
                            if finished {
                                ctx_i.complete();
                            }
                        }
                    }
                }));
                slot.set(s);
            }
            Signal::Error(e) => ctx_c.fail(e),
            Signal::Completed => {
                let finished = {
                    let mut state = ctx_c.state.lock();
                    state.outer_done = true;
                    !state.inner_active
                };
                if finished {
                    ctx_c.complete();
                }
            }
        }));
        ctx.outer.set(s);
        into_subscription(&ctx)
    })
}

struct ExhaustState {
    busy: bool,
    outer_done: bool,
}

pub(super) fn exhaust_all<R: Send + 'static>(source: Observable<Observable<R>>) -> Observable<R> {
    Observable::new(move |o| {
        let ctx = SharedSink::new(
            o,
            ExhaustState {
                busy: false,
                outer_done: false,
            },
        );
        let ctx_c = Arc::clone(&ctx);
        let s = source.subscribe(Subscriber::from_fn(move |signal: OuterSignal<R>| match signal {
            Signal::Next(inner) => {
                {
                    let mut state = ctx_c.state.lock();
                    if state.busy {
                        return;
                    }
                    state.busy = true;
                }
                let (key, slot) = ctx_c.inners.insert();
                let ctx_i = Arc::clone(&ctx_c);
                let s = inner.subscribe(Subscriber::from_fn(move |signal: Signal<R>| match signal {
                    Signal::Next(v) => ctx_i.next(v),
                    Signal::Error(e) => ctx_i.fail(e),
                    Signal::Completed => {
                        ctx_i.inners.remove(key);
                        let finished = {
                            let mut state = ctx_i.state.lock();
                            state.busy = false;
                            state.outer_done
                        };
                        if finished {
                            ctx_i.complete();
                        }
                    }
                }));
                slot.set(s);
            }
            Signal::Error(e) => ctx_c.fail(e),
            Signal::Completed => {
                let finished = {
                    let mut state = ctx_c.state.lock();
                    state.outer_done = true;
                    !state.busy
                };
                if finished {
                    ctx_c.complete();
                }
            }
        }));
        ctx.outer.set(s);
        into_subscription(&ctx)
    })
}
