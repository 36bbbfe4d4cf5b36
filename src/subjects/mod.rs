//! The `subjects` module provides observables that are also observers.
//!
//! A subject multicasts every signal it receives through its [`Observer`]
//! methods to all currently registered subscribers, in registration order.
//! Handles are cheap to clone; clones share the same subject.
//!
//! The flavours differ only in what a new subscriber receives first:
//!
//! - [`PublishSubject`]: nothing, only live values.
//! - [`BehaviorSubject`]: the current value.
//! - [`ReplaySubject`]: the last values, up to its [`BufSize`].
//! - [`BehaviorRelay`]: like `BehaviorSubject`, but it can never terminate.
//!
//! After `error` or `complete`, late subscribers get the terminal signal
//! right away (a `ReplaySubject` replays its buffer first). After `dispose`
//! nothing is delivered at all and no subscriber is retained.
//!
//! [`Observer`]: crate::Observer

mod behavior_relay;
mod behavior_subject;
mod publish_subject;
mod replay_subject;
mod subject_core;

pub use behavior_relay::BehaviorRelay;
pub use behavior_subject::BehaviorSubject;
pub use publish_subject::PublishSubject;
pub use replay_subject::ReplaySubject;
pub use subject_core::BufSize;
