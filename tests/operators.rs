mod custom_error;
mod register_emissions;

use custom_error::{custom_error, CustomError};
use register_emissions::register_emissions_subscriber;
use rxcore::{
    subjects::PublishSubject, Observable, ObservableError, ObservableExt, Observer,
    Subscribeable,
};

#[test]
fn zip_pairs_values_with_their_running_sum() {
    let odds = Observable::of(vec![1, 3, 5, 7, 9]);
    let sums = odds.clone().scan(0, |acc, v| acc + v);

    let (o, emissions) = register_emissions_subscriber();
    Observable::zip(odds, sums, |a, b| (a, b)).subscribe(o);

    assert_eq!(
        emissions.nexts(),
        vec![(1, 1), (3, 4), (5, 9), (7, 16), (9, 25)]
    );
    assert_eq!(emissions.completes(), 1);
}

#[test]
fn combine_latest_joins_the_latest_strings() {
    let mut left = PublishSubject::new();
    let mut right = PublishSubject::new();

    let (o, emissions) = register_emissions_subscriber();
    Observable::combine_latest(
        left.clone().into_observable(),
        right.clone().into_observable(),
        |l: String, r: String| format!("{l} {r}"),
    )
    .subscribe(o);

    left.next("Hello,".to_string());
    right.next("world".to_string());
    right.next("RxSwift".to_string());
    left.next("Have a good day".to_string());
    left.complete();
    right.complete();

    assert_eq!(
        emissions.nexts(),
        vec!["Hello, world", "Hello, RxSwift", "Have a good day RxSwift"]
    );
    assert_eq!(emissions.completes(), 1);
}

#[test]
fn combine_latest_all_emits_in_source_order() {
    let mut a = PublishSubject::new();
    let mut b = PublishSubject::new();

    let (o, emissions) = register_emissions_subscriber();
    Observable::combine_latest_all(vec![a.clone().into_observable(), b.clone().into_observable()])
        .subscribe(o);

    a.next(1);
    b.next(10);
    a.next(2);

    assert_eq!(emissions.nexts(), vec![vec![1, 10], vec![2, 10]]);
}

#[test]
fn concat_waits_for_each_source() {
    let mut first = PublishSubject::new();
    let (o, emissions) = register_emissions_subscriber();
    Observable::concat(vec![first.clone().into_observable(), Observable::of(vec![3, 4])])
        .subscribe(o);

    first.next(1);
    first.next(2);
    assert_eq!(emissions.nexts(), vec![1, 2]);

    first.complete();
    assert_eq!(emissions.nexts(), vec![1, 2, 3, 4]);
    assert_eq!(emissions.completes(), 1);
}

#[test]
fn merge_interleaves_in_call_order() {
    let mut a = PublishSubject::new();
    let mut b = PublishSubject::new();
    let (o, emissions) = register_emissions_subscriber();
    a.clone().merge_with(b.clone()).subscribe(o);

    a.next("a1");
    b.next("b1");
    a.next("a2");
    a.complete();
    assert_eq!(emissions.completes(), 0);
    b.complete();

    assert_eq!(emissions.nexts(), vec!["a1", "b1", "a2"]);
    assert_eq!(emissions.completes(), 1);
}

#[test]
fn flat_map_runs_inner_observables_concurrently() {
    let mut outer = PublishSubject::new();
    let (o, emissions) = register_emissions_subscriber();
    outer
        .clone()
        .flat_map(|n: i32| Observable::of(vec![n, n * 10]))
        .subscribe(o);

    outer.next(1);
    outer.next(2);
    outer.complete();

    assert_eq!(emissions.nexts(), vec![1, 10, 2, 20]);
    assert_eq!(emissions.completes(), 1);
}

#[test]
fn concat_map_keeps_inner_order() {
    let (o, emissions) = register_emissions_subscriber();
    Observable::of(vec!['a', 'b'])
        .concat_map(|c| Observable::of(vec![c; 2]))
        .subscribe(o);
    assert_eq!(emissions.nexts(), vec!['a', 'a', 'b', 'b']);
}

#[test]
fn enumerated_counts_from_zero() {
    let (o, emissions) = register_emissions_subscriber();
    Observable::of(vec!["x", "y"]).enumerated().subscribe(o);
    assert_eq!(emissions.nexts(), vec![(0, "x"), (1, "y")]);
}

#[test]
fn try_map_turns_err_into_error_signal() {
    let (o, emissions) = register_emissions_subscriber();
    Observable::of(vec![1, 2, 3])
        .try_map(|v| {
            if v < 3 {
                Ok(v * 2)
            } else {
                Err(CustomError("three is too many"))
            }
        })
        .subscribe(o);

    assert_eq!(emissions.nexts(), vec![2, 4]);
    assert_eq!(emissions.errors(), vec!["custom error: three is too many"]);
}

#[test]
fn reduce_and_to_vec_emit_on_completion() {
    let (o, emissions) = register_emissions_subscriber();
    Observable::from_iter(1..=4).reduce(0, |acc, v| acc + v).subscribe(o);
    assert_eq!(emissions.nexts(), vec![10]);

    let (o, emissions) = register_emissions_subscriber();
    Observable::from_iter(1..=3).to_vec().subscribe(o);
    assert_eq!(emissions.nexts(), vec![vec![1, 2, 3]]);
    assert_eq!(emissions.completes(), 1);
}

#[test]
fn as_single_rejects_more_than_one_value() {
    let (o, emissions) = register_emissions_subscriber();
    Observable::of(vec![1, 2]).as_single().subscribe(o);
    assert!(emissions.nexts().is_empty());
    assert_eq!(
        emissions.errors(),
        vec![ObservableError::MoreThanOneElement.to_string()]
    );

    let (o, emissions) = register_emissions_subscriber();
    Observable::<i32>::empty().as_single().subscribe(o);
    assert_eq!(emissions.errors(), vec![ObservableError::NoElements.to_string()]);
}

#[test]
fn materialize_round_trips_an_error() {
    let (o, emissions) = register_emissions_subscriber();
    Observable::just(1)
        .concat_with(Observable::throw(custom_error("late")))
        .materialize()
        .dematerialize()
        .subscribe(o);

    assert_eq!(emissions.nexts(), vec![1]);
    assert_eq!(emissions.errors(), vec!["custom error: late"]);
}

#[test]
fn amb_follows_the_first_source_to_signal() {
    let mut slow = PublishSubject::new();
    let mut fast = PublishSubject::new();
    let (o, emissions) = register_emissions_subscriber();
    slow.clone().amb(fast.clone()).subscribe(o);

    fast.next("fast");
    slow.next("slow");
    assert_eq!(emissions.nexts(), vec!["fast"]);
    assert_eq!(slow.observer_count(), 0);
    fast.complete();
    assert_eq!(emissions.completes(), 1);
}

#[test]
fn sample_never_repeats_a_value() {
    let mut source = PublishSubject::new();
    let mut ticks = PublishSubject::new();
    let (o, emissions) = register_emissions_subscriber();
    source.clone().sample(ticks.clone()).subscribe(o);

    source.next(1);
    ticks.next(());
    ticks.next(());
    source.next(2);
    source.next(3);
    ticks.next(());

    assert_eq!(emissions.nexts(), vec![1, 3]);
}
