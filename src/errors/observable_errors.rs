use std::any::Any;
use std::error::Error;
use std::sync::Arc;

use thiserror::Error;

/// Type-erased error carried by [`Signal::Error`](crate::Signal::Error).
///
/// Errors are reference counted so that subjects can hand the same error to
/// every registered observer and to every late subscriber.
pub type ErrorRef = Arc<dyn Error + Send + Sync>;

/// Errors produced by the crate itself.
#[derive(Debug, Error)]
pub enum ObservableError {
    /// A producer passed to `Observable::create` or `Observable::deferred` panicked.
    #[error("producer panicked: {0}")]
    ProducerPanicked(String),

    /// `element_at` was asked for an index past the end of the sequence.
    #[error("element index {index} is out of range for a sequence of {len} elements")]
    ArgumentOutOfRange { index: usize, len: usize },

    #[error("sequence contains no elements")]
    NoElements,

    #[error("sequence contains more than one element")]
    MoreThanOneElement,

    /// A Tokio scheduler was requested outside of a Tokio runtime.
    #[error("no Tokio runtime is available")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    #[error("{0}")]
    Message(String),

    #[error("{name} observable emitted an error")]
    Wrapped {
        name: &'static str,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl ObservableError {
    /// Erases the error so it can travel through a signal.
    #[must_use]
    pub fn into_ref(self) -> ErrorRef {
        Arc::new(self)
    }

    pub(crate) fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        ObservableError::ProducerPanicked(message)
    }
}
