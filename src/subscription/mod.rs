//! Subscription management.
//!
//! `Subscriber` receives values, errors and completion, `Subscription` cancels
//! what a subscription started, and `DisposeBag` releases many subscriptions
//! at once.
mod dispose_bag;
pub(crate) mod slot;
pub mod subscribe;

pub use dispose_bag::DisposeBag;
