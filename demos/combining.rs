//! Combining demo
//!
//! Shows the operators that join several sources: `start_with` and `concat`
//! for sequencing, `merge` for interleaving, `combine_latest` and `zip` for
//! pairing, and a replayed interval reaching a late subscriber on a Tokio
//! runtime.
//!
//! To run this demo, execute `cargo run --example combining`.

use std::time::Duration;

use rxcore::scheduler::TokioScheduler;
use rxcore::subjects::PublishSubject;
use rxcore::{
    Observable, ObservableError, ObservableExt, Observer, Subscribeable, Subscriber, Unsubscribeable,
};

fn print_all<T: std::fmt::Debug>(label: &'static str) -> Subscriber<T> {
    Subscriber::new(
        move |v| println!("{label}: {v:?}"),
        move |e| eprintln!("{label} failed: {e}"),
        move || println!("{label} completed"),
    )
}

fn sequencing() {
    Observable::of(vec![2, 3, 4])
        .start_with(vec![1])
        .concat_with(Observable::of(vec![5, 6]))
        .subscribe(print_all("start_with + concat"));
}

fn interleaving() {
    let mut left = PublishSubject::new();
    let mut right = PublishSubject::new();

    Observable::merge(vec![left.clone().into_observable(), right.clone().into_observable()])
        .subscribe(print_all("merge"));
    left.next("Left 1");
    right.next("Right 1");
    left.next("Left 2");
    left.complete();
    right.complete();
}

fn pairing() {
    let mut left = PublishSubject::new();
    let mut right = PublishSubject::new();

    Observable::combine_latest(
        left.clone().into_observable(),
        right.clone().into_observable(),
        |l: String, r: String| format!("{l} {r}"),
    )
    .subscribe(print_all("combine_latest"));

    left.next("Hello,".to_string());
    right.next("world".to_string());
    right.next("RxSwift".to_string());
    left.next("Have a good day".to_string());

    let odds = Observable::of(vec![1, 3, 5, 7, 9]);
    Observable::zip(odds.clone(), odds.scan(0, |acc, v| acc + v), |v, sum| (v, sum))
        .subscribe(print_all("zip"));
}

#[tokio::main]
async fn main() -> Result<(), ObservableError> {
    env_logger::init();

    sequencing();
    interleaving();
    pairing();

    let scheduler = TokioScheduler::try_current()?;
    let ticks = Observable::interval(Duration::from_millis(100), scheduler.clone()).replay(2);
    let connection = ticks.connect();

    tokio::time::sleep(Duration::from_millis(350)).await;
    let late = ticks
        .clone()
        .delay_subscription(Duration::from_millis(200), scheduler)
        .take(4)
        .subscribe(print_all("replayed interval"));

    // `take` completes after the buffered pair and two live ticks.
    tokio::time::sleep(Duration::from_millis(800)).await;
    late.unsubscribe();
    connection.unsubscribe();
    Ok(())
}
