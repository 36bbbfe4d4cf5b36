//! Permission checks exposed as an observable.
//!
//! The permission system itself belongs to the application, which plugs it
//! in by implementing [`AuthorizationProvider`].

use std::sync::Arc;

use parking_lot::Mutex;

use crate::observable::Observable;
use crate::observer::Observer;
use crate::subscription::subscribe::{Subscriber, Subscription};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthorizationStatus {
    Authorized,
    Denied,
    NotDetermined,
}

/// Source of authorization decisions.
pub trait AuthorizationProvider: Send + Sync + 'static {
    fn current_status(&self) -> AuthorizationStatus;

    /// Asks for authorization and calls `callback` with the outcome, possibly
    /// later and from another thread.
    fn request_authorization(&self, callback: Box<dyn FnOnce(AuthorizationStatus) + Send>);
}

/// Emits whether access is granted.
///
/// If the provider already reports [`AuthorizationStatus::Authorized`] this
/// emits `true` and completes without asking. Otherwise it emits `false`,
/// requests authorization, then emits the outcome and completes. A
/// subscription disposed before the request answers receives nothing more.
pub fn authorized<P: AuthorizationProvider>(provider: Arc<P>) -> Observable<bool> {
    Observable::new(move |mut o: Subscriber<bool>| {
        if provider.current_status() == AuthorizationStatus::Authorized {
            o.next(true);
            o.complete();
            return Subscription::nil();
        }
        o.next(false);

        let pending = Arc::new(Mutex::new(Some(o)));
        let pending_c = Arc::clone(&pending);
        provider.request_authorization(Box::new(move |status| {
            let subscriber = pending_c.lock().take();
            if let Some(mut o) = subscriber {
                log::trace!("authorization answered: {status:?}");
                o.next(status == AuthorizationStatus::Authorized);
                o.complete();
            }
        }));

        Subscription::from_fn(move || {
            pending.lock().take();
        })
    })
}
