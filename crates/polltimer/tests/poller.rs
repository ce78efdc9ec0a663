use std::cell::Cell;
use std::time::Duration;

use polltimer::{
    poll_async, poll_blocking, poll_blocking_with, ManualClock, PollError, PollFailure, PollStatus,
    PollTimer, TokioClock,
};

fn manual_timer(clock: &ManualClock, timeout_ms: u64, interval_ms: u64) -> PollTimer<ManualClock> {
    PollTimer::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .interval(Duration::from_millis(interval_ms))
        .jitter_factor(0.0)
        .clock(clock.clone())
        .seed(0)
        .start()
}

#[test]
fn blocking_poll_returns_first_ready_value() {
    let clock = ManualClock::new();
    let mut timer = manual_timer(&clock, 1_000, 100);
    let calls = Cell::new(0_u32);
    let mut pauses = Vec::new();

    let polled = poll_blocking_with(
        &mut timer,
        |pause| {
            pauses.push(pause);
            clock.advance(pause);
        },
        || {
            calls.set(calls.get() + 1);
            if calls.get() == 4 {
                Ok::<_, std::io::Error>(PollStatus::Ready("done"))
            } else {
                Ok(PollStatus::Pending)
            }
        },
    )
    .unwrap();

    assert_eq!(polled.value, "done");
    assert_eq!(polled.attempts, 4);
    assert_eq!(polled.elapsed, Duration::from_millis(300));
    assert_eq!(pauses, vec![Duration::from_millis(100); 3]);
}

#[test]
fn blocking_poll_times_out() {
    let clock = ManualClock::new();
    let mut timer = manual_timer(&clock, 250, 100);
    let mut attempts = 0_u32;

    let failure = poll_blocking_with(
        &mut timer,
        |pause| clock.advance(pause + Duration::from_millis(1)),
        || {
            attempts += 1;
            Ok::<PollStatus<()>, std::io::Error>(PollStatus::Pending)
        },
    )
    .unwrap_err();

    assert!(failure.is_timeout(), "{failure}");
    match failure {
        PollFailure::Timer(PollError::Timeout { elapsed }) => {
            assert!(elapsed > Duration::from_millis(250));
        }
        other => panic!("unexpected failure: {other}"),
    }
    // Sleeps of 100, 100 and a clipped 48ms, each plus a millisecond of probe time.
    assert_eq!(attempts, 4);
}

#[test]
fn blocking_poll_propagates_probe_errors_without_retrying() {
    let clock = ManualClock::new();
    let mut timer = manual_timer(&clock, 1_000, 100);
    let mut attempts = 0_u32;

    let failure = poll_blocking_with(
        &mut timer,
        |pause| clock.advance(pause),
        || -> Result<PollStatus<()>, String> {
            attempts += 1;
            Err("server said no".to_string())
        },
    )
    .unwrap_err();

    assert!(!failure.is_timeout());
    assert_eq!(failure.to_string(), "poll probe failed: server said no");
    assert_eq!(attempts, 1);
}

#[test]
fn blocking_poll_sleeps_for_real() {
    let mut timer = PollTimer::new(
        Some(Duration::from_secs(5)),
        Some(Duration::from_millis(5)),
        0.0,
    );
    let mut remaining = 2;

    let polled = poll_blocking(&mut timer, || {
        if remaining == 0 {
            return Ok::<_, std::io::Error>(PollStatus::Ready(()));
        }
        remaining -= 1;
        Ok(PollStatus::Pending)
    })
    .unwrap();

    assert_eq!(polled.attempts, 3);
    assert!(polled.elapsed >= Duration::from_millis(10));
}

#[tokio::test(start_paused = true)]
async fn async_poll_follows_paused_tokio_time() {
    let mut timer = PollTimer::builder()
        .timeout(Duration::from_secs(2))
        .interval(Duration::from_millis(500))
        .jitter_factor(0.0)
        .clock(TokioClock)
        .start();
    let mut attempts = 0_u32;

    let polled = poll_async(&mut timer, || {
        attempts += 1;
        let ready = attempts == 3;
        async move {
            if ready {
                Ok::<_, std::io::Error>(PollStatus::Ready(attempts))
            } else {
                Ok(PollStatus::Pending)
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(polled.value, 3);
    assert_eq!(polled.attempts, 3);
    assert!(polled.elapsed >= Duration::from_secs(1));
    assert!(polled.elapsed < Duration::from_millis(1_100));
}

#[tokio::test(start_paused = true)]
async fn async_poll_times_out_on_budget() {
    let mut timer = PollTimer::builder()
        .timeout(Duration::from_secs(1))
        .interval(Duration::from_millis(300))
        .clock(TokioClock)
        .seed(8)
        .start();

    let failure = poll_async(&mut timer, || async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok::<PollStatus<()>, std::io::Error>(PollStatus::Pending)
    })
    .await
    .unwrap_err();

    assert!(failure.is_timeout(), "{failure}");
}
