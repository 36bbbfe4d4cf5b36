use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use rxcore::{
    subjects::PublishSubject, subscribe::Subscription, DisposeBag, Observer, Subscribeable,
    Subscriber,
};

fn counted(counter: &Arc<AtomicUsize>) -> Subscription {
    let counter = Arc::clone(counter);
    Subscription::from_fn(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn dispose_releases_every_member_exactly_once() {
    let counters: Vec<_> = (0..3).map(|_| Arc::new(AtomicUsize::new(0))).collect();
    let bag = DisposeBag::new();
    for counter in &counters {
        counted(counter).disposed_by(&bag);
    }
    assert_eq!(bag.len(), 3);

    bag.dispose();
    bag.dispose();
    drop(bag);

    for counter in &counters {
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}

#[test]
fn member_added_after_dispose_is_released_immediately() {
    let counter = Arc::new(AtomicUsize::new(0));
    let bag = DisposeBag::new();
    bag.dispose();

    counted(&counter).disposed_by(&bag);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert!(bag.is_empty());
}

#[test]
fn dropping_the_bag_detaches_subscribers() {
    let mut subject = PublishSubject::new();
    let seen = Arc::new(AtomicUsize::new(0));
    {
        let bag = DisposeBag::new();
        let seen_c = Arc::clone(&seen);
        subject
            .subscribe(Subscriber::on_next(move |_: i32| {
                seen_c.fetch_add(1, Ordering::SeqCst);
            }))
            .disposed_by(&bag);
        subject.next(1);
    }
    subject.next(2);

    assert_eq!(seen.load(Ordering::SeqCst), 1);
    assert_eq!(subject.observer_count(), 0);
}
