//! Subjects demo
//!
//! Walks through the subject flavours: `PublishSubject` forwards live values
//! only, `BehaviorSubject` hands its current value to every new subscriber,
//! `ReplaySubject` replays a bounded buffer and `BehaviorRelay` holds a value
//! that never terminates. A disposed subject ignores everything afterwards.
//!
//! To run this demo, execute `cargo run --example subjects`.

use std::fmt::Display;

use rxcore::subjects::{BehaviorRelay, BehaviorSubject, BufSize, PublishSubject, ReplaySubject};
use rxcore::{DisposeBag, ObservableExt, Observer, Subscribeable, Subscriber};

pub fn create_subscriber<T: Display>(label: &'static str) -> Subscriber<T> {
    Subscriber::new(
        move |v| println!("{label} emitted: {v}"),
        move |e| eprintln!("{label} failed: {e}"),
        move || println!("{label} completed"),
    )
}

fn publish_subject(bag: &DisposeBag) {
    println!("--- PublishSubject ---");
    let mut subject = PublishSubject::new();
    subject.next("Is anyone listening?");

    subject.subscribe(create_subscriber("1)")).disposed_by(bag);
    subject.next("1");

    subject
        .clone()
        .map(|v| format!("mapped {v}"))
        .subscribe(create_subscriber("2)"))
        .disposed_by(bag);
    subject.next("2");

    subject.complete();
    subject.next("3"); // ignored after completion

    subject.subscribe(create_subscriber("3)")).disposed_by(bag);
}

fn behavior_subject(bag: &DisposeBag) {
    println!("--- BehaviorSubject ---");
    let mut subject = BehaviorSubject::new("Initial value");
    subject.subscribe(create_subscriber("1)")).disposed_by(bag);

    subject.next("X");
    subject.subscribe(create_subscriber("2)")).disposed_by(bag);

    match subject.value() {
        Ok(v) => println!("current value: {v}"),
        Err(e) => eprintln!("{e}"),
    }
}

fn replay_subject(bag: &DisposeBag) {
    println!("--- ReplaySubject ---");
    let mut subject = ReplaySubject::new(BufSize::Bounded(2));
    for v in ["1", "2", "3"] {
        subject.next(v);
    }
    subject.subscribe(create_subscriber("1)")).disposed_by(bag);

    subject.next("4");
    subject.dispose();

    // Nothing is delivered by a disposed subject.
    subject.subscribe(create_subscriber("2)")).disposed_by(bag);
}

fn behavior_relay(bag: &DisposeBag) {
    println!("--- BehaviorRelay ---");
    let relay = BehaviorRelay::new(String::from("Initial value"));
    relay.subscribe(create_subscriber("1)")).disposed_by(bag);

    relay.accept(String::from("New initial value"));
    println!("relay holds: {}", relay.value());
}

pub fn main() {
    env_logger::init();

    let bag = DisposeBag::new();
    publish_subject(&bag);
    behavior_subject(&bag);
    replay_subject(&bag);
    behavior_relay(&bag);

    println!("disposing {} subscriptions", bag.len());
    bag.dispose();
}
