use std::sync::Arc;

use parking_lot::Mutex;
use rxcore::subscribe::Subscriber;

/// What a registered subscriber has received so far.
pub struct Emissions<T> {
    pub nexts: Arc<Mutex<Vec<T>>>,
    pub completes: Arc<Mutex<usize>>,
    pub errors: Arc<Mutex<Vec<String>>>,
}

impl<T: Clone> Emissions<T> {
    pub fn nexts(&self) -> Vec<T> {
        self.nexts.lock().clone()
    }

    pub fn completes(&self) -> usize {
        *self.completes.lock()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }
}

/// Returns a subscriber recording into the returned [`Emissions`].
pub fn register_emissions_subscriber<T: Send + 'static>() -> (Subscriber<T>, Emissions<T>) {
    let nexts = Arc::new(Mutex::new(Vec::with_capacity(5)));
    let nexts_c = Arc::clone(&nexts);

    let completes = Arc::new(Mutex::new(0));
    let completes_c = Arc::clone(&completes);

    let errors = Arc::new(Mutex::new(Vec::new()));
    let errors_c = Arc::clone(&errors);

    let subscriber = Subscriber::new(
        move |n| {
            // Track next() calls.
            nexts_c.lock().push(n);
        },
        move |e| {
            // Track error() calls.
            errors_c.lock().push(e.to_string());
        },
        move || {
            // Track complete() calls.
            *completes_c.lock() += 1;
        },
    );
    (
        subscriber,
        Emissions {
            nexts,
            completes,
            errors,
        },
    )
}
