//! Reactive streams for Rust: observables, operators, subjects and
//! schedulers.
//!
//! An [`Observable`] describes a push-based sequence of values terminated by
//! at most one `complete` or `error`. Subscribing with a [`Subscriber`]
//! starts the producer and returns a [`Subscription`] that cancels it.
//! Operators from [`ObservableExt`] compose new observables; [`subjects`]
//! bridge imperative code into the reactive world; [`scheduler`] supplies
//! the notion of time used by `interval`, `timer` and `delay`.
//!
//! ```
//! use rxcore::{Observable, ObservableExt, Subscribeable, Subscriber};
//!
//! Observable::from_iter(1..=10)
//!     .filter(|v| v % 2 == 0)
//!     .map(|v| v * v)
//!     .subscribe(Subscriber::on_next(|v| println!("{v}")));
//! ```

mod errors;
mod observable;
mod observer;
mod subscription;

pub mod authorization;
pub mod scheduler;
pub mod single;
pub mod subjects;

pub use errors::*;
pub use observable::{Connectable, Observable, ObservableExt};
pub use observer::{Observer, Signal};
pub use subscription::*;
pub use subscription::subscribe::{Subscribeable, Subscriber, Subscription, Unsubscribeable};
