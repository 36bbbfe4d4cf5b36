//! Signals and the `Observer` trait.

use std::fmt;

use crate::errors::ErrorRef;

/// Consumer side of a stream.
///
/// `error` and `complete` are terminal: implementations must ignore every
/// signal that arrives after either of them.
pub trait Observer {
    type NextFnType;

    fn next(&mut self, _: Self::NextFnType);
    fn complete(&mut self);
    fn error(&mut self, _: ErrorRef);

    /// Dispatches a materialized signal to the matching method.
    fn signal(&mut self, signal: Signal<Self::NextFnType>) {
        match signal {
            Signal::Next(v) => self.next(v),
            Signal::Error(e) => self.error(e),
            Signal::Completed => self.complete(),
        }
    }
}

/// A single event of a stream.
///
/// Observers receive their input as `Signal`s, and `materialize` turns every
/// event, terminal ones included, into a plain value of this type.
#[derive(Clone)]
pub enum Signal<T> {
    Next(T),
    Error(ErrorRef),
    Completed,
}

impl<T> Signal<T> {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Signal::Next(_))
    }

    /// Transforms the value of a `Next`, passing terminal signals through.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Signal<U> {
        match self {
            Signal::Next(v) => Signal::Next(f(v)),
            Signal::Error(e) => Signal::Error(e),
            Signal::Completed => Signal::Completed,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Signal::Next(v) => Some(v),
            _ => None,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Next(v) => f.debug_tuple("Next").field(v).finish(),
            Signal::Error(e) => write!(f, "Error({e})"),
            Signal::Completed => f.write_str("Completed"),
        }
    }
}

// Errors compare by message; `dyn Error` has no equality of its own.
impl<T: PartialEq> PartialEq for Signal<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Signal::Next(a), Signal::Next(b)) => a == b,
            (Signal::Error(a), Signal::Error(b)) => a.to_string() == b.to_string(),
            (Signal::Completed, Signal::Completed) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ObservableError;

    #[test]
    fn terminal_signals() {
        assert!(!Signal::Next(1).is_terminal());
        assert!(Signal::<i32>::Completed.is_terminal());
        assert!(Signal::<i32>::Error(ObservableError::NoElements.into_ref()).is_terminal());
    }

    #[test]
    fn map_keeps_terminal_signals() {
        assert_eq!(Signal::Next(2).map(|v| v * 10), Signal::Next(20));
        assert_eq!(Signal::<i32>::Completed.map(|v| v * 10), Signal::Completed);
        let err = Signal::<i32>::Error(ObservableError::NoElements.into_ref());
        assert_eq!(
            err.map(|v| v.to_string()),
            Signal::Error(ObservableError::NoElements.into_ref())
        );
    }
}
