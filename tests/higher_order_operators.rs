mod custom_error;
mod register_emissions;

use custom_error::custom_error;
use register_emissions::register_emissions_subscriber;
use rxcore::{subjects::PublishSubject, Observable, ObservableExt, Observer, Subscribeable};

#[test]
fn switch_latest_follows_the_newest_inner() {
    let mut outer = PublishSubject::new();
    let mut a = PublishSubject::new();
    let mut b = PublishSubject::new();

    let (o, emissions) = register_emissions_subscriber();
    outer.clone().into_observable().switch_latest().subscribe(o);

    outer.next(a.clone().into_observable());
    a.next(1);
    outer.next(b.clone().into_observable());
    a.next(2);
    b.next(3);

    assert_eq!(emissions.nexts(), vec![1, 3]);
    assert_eq!(a.observer_count(), 0);

    outer.complete();
    assert_eq!(emissions.completes(), 0);
    b.complete();
    assert_eq!(emissions.completes(), 1);
}

#[test]
fn merge_all_completes_after_outer_and_every_inner() {
    let mut outer = PublishSubject::new();
    let mut inner = PublishSubject::new();

    let (o, emissions) = register_emissions_subscriber();
    outer.clone().into_observable().merge_all().subscribe(o);

    outer.next(inner.clone().into_observable());
    outer.next(Observable::of(vec![10, 20]));
    outer.complete();
    inner.next(1);
    assert_eq!(emissions.completes(), 0);

    inner.complete();
    assert_eq!(emissions.nexts(), vec![10, 20, 1]);
    assert_eq!(emissions.completes(), 1);
}

#[test]
fn inner_error_terminates_flat_map() {
    let mut outer = PublishSubject::new();
    let sibling = PublishSubject::<i32>::new();
    let sibling_c = sibling.clone();

    let (o, emissions) = register_emissions_subscriber();
    outer
        .clone()
        .flat_map(move |n: i32| {
            if n == 0 {
                sibling_c.clone().into_observable()
            } else {
                Observable::throw(custom_error("inner failed"))
            }
        })
        .subscribe(o);

    outer.next(0);
    assert_eq!(sibling.observer_count(), 1);
    outer.next(1);

    assert_eq!(emissions.errors(), vec!["custom error: inner failed"]);
    assert_eq!(sibling.observer_count(), 0);
    assert_eq!(outer.observer_count(), 0);
}

#[test]
fn concat_all_subscribes_one_inner_at_a_time() {
    let first = PublishSubject::new();
    let second = PublishSubject::new();

    let (o, emissions) = register_emissions_subscriber();
    Observable::of(vec![
        first.clone().into_observable(),
        second.clone().into_observable(),
    ])
    .concat_all()
    .subscribe(o);

    assert_eq!(second.observer_count(), 0);
    first.clone().next('a');
    first.clone().complete();
    assert_eq!(second.observer_count(), 1);
    second.clone().next('b');
    second.clone().complete();

    assert_eq!(emissions.nexts(), vec!['a', 'b']);
    assert_eq!(emissions.completes(), 1);
}
