// tests/ticker_cadence.rs

mod common;
use crate::common::{init_tracing, logical, utc, utc_at};

use std::sync::Arc;

use chrono::{Datelike, FixedOffset, Timelike, Utc, Weekday};
use proptest::prelude::*;
use tokio::sync::mpsc;

use lastfriday::engine::{Cadence, Clock, RunTrigger, RuntimeEvent, next_fire, spawn_ticker};
use lastfriday_test_utils::clock::PausedClock;

fn friday_23() -> Cadence {
    Cadence::parse("0 0 23 * * Fri", utc()).unwrap()
}

async fn next_trigger(rx: &mut mpsc::Receiver<RuntimeEvent>) -> RunTrigger {
    match rx.recv().await {
        Some(RuntimeEvent::TriggerFired(t)) => t,
        other => panic!("expected TriggerFired, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn fires_every_friday_at_23_00() {
    init_tracing();
    let clock = Arc::new(PausedClock::starting_at(utc_at(2024, 3, 20, 12, 0)));
    let (tx, mut rx) = mpsc::channel(8);
    let handle = spawn_ticker(friday_23(), clock.clone(), tx);

    let first = next_trigger(&mut rx).await;
    assert_eq!(first.logical_time, logical(2024, 3, 22, 23, 0));
    assert!(clock.now() >= first.logical_time);

    let second = next_trigger(&mut rx).await;
    assert_eq!(second.logical_time, logical(2024, 3, 29, 23, 0));
    assert_ne!(first.run_id, second.run_id);

    handle.abort();
}

#[tokio::test(start_paused = true)]
async fn missed_boundary_is_not_replayed() {
    init_tracing();
    // Started half an hour after the 2024-03-22 boundary.
    let clock = Arc::new(PausedClock::starting_at(utc_at(2024, 3, 22, 23, 30)));
    let (tx, mut rx) = mpsc::channel(8);
    let handle = spawn_ticker(friday_23(), clock, tx);

    let first = next_trigger(&mut rx).await;
    assert_eq!(first.logical_time, logical(2024, 3, 29, 23, 0));

    handle.abort();
}

#[tokio::test(start_paused = true)]
async fn ticker_stops_when_runtime_goes_away() {
    init_tracing();
    let clock = Arc::new(PausedClock::starting_at(utc_at(2024, 3, 20, 12, 0)));
    let (tx, rx) = mpsc::channel(8);
    let handle = spawn_ticker(friday_23(), clock, tx);
    drop(rx);

    handle.await.unwrap();
}

#[test]
fn boundary_itself_is_not_the_next_fire() {
    let cadence = friday_23();
    let at_boundary = utc_at(2024, 3, 22, 23, 0);
    assert_eq!(
        next_fire(&cadence, at_boundary, None),
        Some(logical(2024, 3, 29, 23, 0))
    );
}

#[test]
fn lagging_clock_does_not_refire_the_same_boundary() {
    let cadence = friday_23();
    let fired = utc_at(2024, 3, 22, 23, 0);
    let lagging_now = fired - chrono::Duration::milliseconds(3);
    assert_eq!(
        next_fire(&cadence, lagging_now, Some(fired)),
        Some(logical(2024, 3, 29, 23, 0))
    );
}

#[test]
fn offset_moves_the_boundary() {
    let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
    let cadence = Cadence::parse("0 0 23 * * Fri", plus_two).unwrap();
    let next = next_fire(&cadence, utc_at(2024, 3, 20, 12, 0), None).unwrap();

    assert_eq!(next.offset(), &plus_two);
    assert_eq!((next.day(), next.hour()), (22, 23));
    assert_eq!(next.with_timezone(&Utc), utc_at(2024, 3, 22, 21, 0));
}

proptest! {
    #[test]
    fn next_fire_is_the_first_friday_23_strictly_after_now(secs in 0i64..4_000_000_000) {
        let now = chrono::DateTime::<Utc>::from_timestamp(secs, 0).unwrap();
        let next = next_fire(&friday_23(), now, None).unwrap();

        prop_assert!(next.with_timezone(&Utc) > now);
        prop_assert_eq!(next.weekday(), Weekday::Fri);
        prop_assert_eq!((next.hour(), next.minute(), next.second()), (23, 0, 0));
        prop_assert!(next.with_timezone(&Utc) - now <= chrono::Duration::days(7));
    }
}
