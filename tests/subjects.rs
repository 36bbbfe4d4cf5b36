mod custom_error;
mod register_emissions;

use custom_error::custom_error;
use register_emissions::register_emissions_subscriber;
use rxcore::{
    subjects::{BehaviorRelay, BehaviorSubject, BufSize, PublishSubject, ReplaySubject},
    Observer, Subscribeable, Unsubscribeable,
};

#[test]
fn publish_subject_only_forwards_live_values() {
    let mut subject = PublishSubject::new();
    subject.next(1);

    let (x, x_emissions) = register_emissions_subscriber();
    subject.subscribe(x);
    subject.next(2);

    let (y, y_emissions) = register_emissions_subscriber();
    subject.subscribe(y);
    subject.next(3);
    subject.complete();
    subject.next(4);

    assert_eq!(x_emissions.nexts(), vec![2, 3]);
    assert_eq!(y_emissions.nexts(), vec![3]);
    assert_eq!((x_emissions.completes(), y_emissions.completes()), (1, 1));
    assert_eq!(subject.observer_count(), 0);
}

#[test]
fn publish_subject_late_subscriber_gets_the_terminal_only() {
    let mut subject = PublishSubject::<i32>::new();
    subject.next(1);
    subject.error(custom_error("subject failed"));

    let (x, emissions) = register_emissions_subscriber();
    subject.subscribe(x);
    assert!(emissions.nexts().is_empty());
    assert_eq!(emissions.errors(), vec!["custom error: subject failed"]);
}

#[test]
fn disposed_subject_delivers_nothing() {
    let mut subject = PublishSubject::new();
    subject.clone().unsubscribe();
    assert!(subject.is_disposed());

    let (x, emissions) = register_emissions_subscriber();
    subject.subscribe(x);
    subject.next(1);
    subject.complete();

    assert!(emissions.nexts().is_empty());
    assert_eq!(emissions.completes(), 0);
    assert!(emissions.errors().is_empty());
}

#[test]
fn behavior_subject_replays_initial_value_to_each_subscriber() {
    let subject = BehaviorSubject::new("V");

    let (x, x_emissions) = register_emissions_subscriber();
    let (y, y_emissions) = register_emissions_subscriber();
    subject.subscribe(x);
    subject.subscribe(y);

    assert_eq!(x_emissions.nexts(), vec!["V"]);
    assert_eq!(y_emissions.nexts(), vec!["V"]);
}

#[test]
fn behavior_subject_tracks_the_latest_value() {
    let mut subject = BehaviorSubject::new(0);
    subject.next(1);
    subject.next(2);

    let (x, emissions) = register_emissions_subscriber();
    subject.subscribe(x);
    assert_eq!(emissions.nexts(), vec![2]);
    assert_eq!(subject.value().ok(), Some(2));

    subject.error(custom_error("stopped"));
    assert!(subject.value().is_err());
    assert_eq!(emissions.errors(), vec!["custom error: stopped"]);
}

#[test]
fn replay_subject_buffers_the_last_two_values() {
    let mut subject = ReplaySubject::new(BufSize::Bounded(2));
    for v in ["1", "2", "3"] {
        subject.next(v.to_string());
    }

    let (x, emissions) = register_emissions_subscriber();
    subject.subscribe(x);
    assert_eq!(emissions.nexts(), vec!["2", "3"]);

    subject.next("4".to_string());
    assert_eq!(emissions.nexts(), vec!["2", "3", "4"]);
}

#[test]
fn replay_subject_unbounded_keeps_everything() {
    let mut subject = ReplaySubject::new(BufSize::Unbounded);
    for v in 0..100 {
        subject.next(v);
    }
    subject.complete();

    let (x, emissions) = register_emissions_subscriber();
    subject.subscribe(x);
    assert_eq!(emissions.nexts(), (0..100).collect::<Vec<_>>());
    assert_eq!(emissions.completes(), 1);
}

#[test]
fn behavior_relay_never_terminates() {
    let relay = BehaviorRelay::new(vec![1]);
    let (x, emissions) = register_emissions_subscriber();
    let s = relay.subscribe(x);

    let mut next = relay.value();
    next.push(2);
    relay.accept(next);

    assert_eq!(emissions.nexts(), vec![vec![1], vec![1, 2]]);
    assert_eq!(relay.value(), vec![1, 2]);

    s.unsubscribe();
    assert_eq!(relay.observer_count(), 0);
    assert_eq!(emissions.completes(), 0);
}

#[test]
fn subject_unsubscribe_detaches_one_observer() {
    let mut subject = PublishSubject::new();
    let (x, x_emissions) = register_emissions_subscriber();
    let (y, y_emissions) = register_emissions_subscriber();
    let sx = subject.subscribe(x);
    subject.subscribe(y);

    subject.next(1);
    sx.unsubscribe();
    subject.next(2);

    assert_eq!(x_emissions.nexts(), vec![1]);
    assert_eq!(y_emissions.nexts(), vec![1, 2]);
    assert_eq!(subject.observer_count(), 1);
}
